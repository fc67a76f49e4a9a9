use crate::config::TrustConfig;
use reqwest::{Certificate, Client};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::CertificateDer;
use rustls::{ClientConfig, RootCertStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum TrustError {
    #[error("failed to read certs file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse certs file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: reqwest::Error,
    },

    #[error("failed to parse certs file {}: {source}", path.display())]
    Pem {
        path: PathBuf,
        source: rustls::pki_types::pem::Error,
    },

    #[error("rejected certificate from {}: {source}", path.display())]
    Certificate {
        path: PathBuf,
        source: rustls::Error,
    },

    #[error("failed to configure tls: {0}")]
    Tls(#[from] rustls::Error),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Extra CA certificates on top of the system roots, shared by the registry
/// client and the GitHub client.
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    bundle: Option<CertBundle>,
}

#[derive(Debug, Clone)]
struct CertBundle {
    path: PathBuf,
    pem: Arc<Vec<u8>>,
}

impl TrustStore {
    pub fn load(trust: &TrustConfig) -> Result<Self, TrustError> {
        let Some(path) = &trust.certs_file else {
            debug!("using system cert pool only");
            return Ok(Self::default());
        };
        let pem = std::fs::read(path).map_err(|source| TrustError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            bundle: Some(CertBundle {
                path: path.clone(),
                pem: Arc::new(pem),
            }),
        })
    }

    pub fn has_extra_certs(&self) -> bool {
        self.bundle.is_some()
    }

    /// Builds the shared HTTP client used for registry calls.
    pub fn http_client(&self) -> Result<Client, TrustError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT);

        if let Some(bundle) = &self.bundle {
            for cert in reqwest_certs(bundle)? {
                builder = builder.add_root_certificate(cert);
            }
        }

        Ok(builder.build()?)
    }

    /// TLS settings for the GitHub client: native roots plus the bundle.
    /// `None` when there is no bundle and octocrab's defaults apply.
    pub fn rustls_config(&self) -> Result<Option<Arc<ClientConfig>>, TrustError> {
        let Some(bundle) = &self.bundle else {
            return Ok(None);
        };

        let mut roots = RootCertStore::empty();
        let native = rustls_native_certs::load_native_certs();
        for e in &native.errors {
            debug!(error = %e, "skipped unreadable native cert");
        }
        let (added, ignored) = roots.add_parsable_certificates(native.certs);
        debug!(added, ignored, "loaded native certs");

        for cert in pem_certs(bundle)? {
            roots.add(cert).map_err(|source| TrustError::Certificate {
                path: bundle.path.clone(),
                source,
            })?;
        }

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(Some(Arc::new(config)))
    }
}

fn reqwest_certs(bundle: &CertBundle) -> Result<Vec<Certificate>, TrustError> {
    let certs = Certificate::from_pem_bundle(&bundle.pem).map_err(|source| TrustError::Parse {
        path: bundle.path.clone(),
        source,
    })?;
    log_loaded(&bundle.path, certs.len());
    Ok(certs)
}

fn pem_certs(bundle: &CertBundle) -> Result<Vec<CertificateDer<'static>>, TrustError> {
    CertificateDer::pem_slice_iter(&bundle.pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TrustError::Pem {
            path: bundle.path.clone(),
            source,
        })
}

fn log_loaded(path: &Path, count: usize) {
    if count == 0 {
        debug!(file = %path.display(), "no certs appended, using system certs only");
    } else {
        debug!(file = %path.display(), count, "loaded extra certs");
    }
}
