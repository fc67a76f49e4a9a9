use crate::provider::{
    ProviderClient, ProviderError, ProviderResult, RemoteRepository, SourceProvider,
};
use crate::registry::types::{Provider, Token};
use crate::trust::{TrustError, TrustStore};
use async_trait::async_trait;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderValue, Uri};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::TokioExecutor;
use octocrab::models::Repository;
use octocrab::service::middleware::auth_header::AuthHeaderLayer;
use octocrab::service::middleware::base_uri::BaseUriLayer;
use octocrab::service::middleware::extra_headers::ExtraHeadersLayer;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::{AuthState, Octocrab, OctocrabBuilder};
use rustls::ClientConfig;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

const PER_PAGE: u8 = 100;
const PUBLIC_API: &str = "https://api.github.com";
const PUBLIC_UPLOADS: &str = "https://uploads.github.com";

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

/// GitHub and GitHub Enterprise, through octocrab.
#[derive(Debug, Clone, Default)]
pub struct GitHubSource {
    tls: Option<Arc<ClientConfig>>,
}

impl GitHubSource {
    /// Clients trust the store's extra certificates as well as the system
    /// roots.
    pub fn new(trust: &TrustStore) -> Result<Self, TrustError> {
        Ok(Self {
            tls: trust.rustls_config()?,
        })
    }
}

impl SourceProvider for GitHubSource {
    fn name(&self) -> &'static str {
        "github"
    }

    fn connect(&self, token: &Token, provider: &Provider) -> ProviderResult<Box<dyn ProviderClient>> {
        let client = GitHubClient::new(
            &token.token,
            &provider.url,
            &provider.upload_url,
            self.tls.as_deref(),
        )?;
        Ok(Box::new(client))
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    octo: Octocrab,
}

impl GitHubClient {
    /// An empty `base_url` targets the public GitHub API. The upload URL is
    /// only validated; nothing in an import uploads. With `tls` set, requests
    /// go through a connector using that root store instead of octocrab's.
    pub fn new(
        token: &str,
        base_url: &str,
        upload_url: &str,
        tls: Option<&ClientConfig>,
    ) -> ProviderResult<Self> {
        if !base_url.is_empty() {
            parse_url(base_url)?;
        }
        if !upload_url.is_empty() {
            parse_url(upload_url)?;
        }

        let octo = match tls {
            Some(tls) => with_tls(token, base_url, upload_url, tls)?,
            None => {
                let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None);
                if !base_url.is_empty() {
                    builder = builder
                        .base_uri(base_url)
                        .map_err(|e| ProviderError::InvalidUrl(format!("{base_url}: {e}")))?;
                }
                builder
                    .personal_token(token.to_string())
                    .build()
                    .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?
            }
        };

        Ok(Self { octo })
    }
}

fn with_tls(token: &str, base_url: &str, upload_url: &str, tls: &ClientConfig) -> ProviderResult<Octocrab> {
    let base_uri = to_uri(base_url, PUBLIC_API)?;
    let upload_uri = to_uri(upload_url, PUBLIC_UPLOADS)?;
    let auth = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| ProviderError::Api(format!("token is not a valid header value: {e}")))?;

    let connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls.clone())
        .https_or_http()
        .enable_http1()
        .build();
    let client = HyperClient::builder(TokioExecutor::new()).build(connector);

    let headers = vec![(USER_AGENT, HeaderValue::from_static("octocrab"))];
    let octo = OctocrabBuilder::new_empty()
        .with_service(client)
        .with_layer(&ExtraHeadersLayer::new(Arc::new(headers)))
        .with_layer(&BaseUriLayer::new(base_uri.clone()))
        .with_layer(&AuthHeaderLayer::new(Some(auth), base_uri, upload_uri))
        .with_auth(AuthState::None)
        .build()
        .unwrap_or_else(|never| match never {});
    Ok(octo)
}

fn to_uri(raw: &str, default: &str) -> ProviderResult<Uri> {
    let raw = if raw.is_empty() { default } else { raw };
    raw.parse::<Uri>()
        .map_err(|e| ProviderError::InvalidUrl(format!("{raw}: {e}")))
}

fn parse_url(raw: &str) -> ProviderResult<Url> {
    Url::parse(raw).map_err(|e| ProviderError::InvalidUrl(format!("{raw}: {e}")))
}

fn map_err(context: String, e: octocrab::Error) -> ProviderError {
    match &e {
        octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404 => {
            ProviderError::NotFound(context)
        }
        _ => ProviderError::Api(format!("{context}: {e}")),
    }
}

fn to_remote(repo: Repository) -> RemoteRepository {
    let (owner_login, avatar_url) = repo
        .owner
        .map(|o| (o.login, o.avatar_url.to_string()))
        .unwrap_or_default();

    RemoteRepository {
        remote_id: repo.id.0,
        name: repo.name,
        owner_login,
        description: repo.description.unwrap_or_default(),
        avatar_url,
        default_branch: repo.default_branch.unwrap_or_default(),
        ssh_url: repo.ssh_url.unwrap_or_default(),
    }
}

pub fn decode_content(encoded: &str) -> ProviderResult<String> {
    let bytes = STANDARD
        .decode(encoded.replace('\n', ""))
        .map_err(|e| ProviderError::Decode(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ProviderError::Decode(format!("invalid UTF-8: {e}")))
}

#[async_trait]
impl ProviderClient for GitHubClient {
    async fn get_repository(&self, owner: &str, name: &str) -> ProviderResult<RemoteRepository> {
        self.octo
            .repos(owner, name)
            .get()
            .await
            .map(to_remote)
            .map_err(|e| map_err(format!("repository {owner}/{name}"), e))
    }

    async fn get_repository_by_remote_id(&self, id: u64) -> ProviderResult<RemoteRepository> {
        self.octo
            .get::<Repository, _, _>(format!("/repositories/{id}"), None::<&()>)
            .await
            .map(to_remote)
            .map_err(|e| map_err(format!("repository with id {id}"), e))
    }

    async fn list_repositories(&self, owner: &str) -> ProviderResult<Vec<RemoteRepository>> {
        let route = if owner.is_empty() {
            "/user/repos".to_string()
        } else {
            format!("/users/{owner}/repos")
        };

        let mut repos = Vec::new();
        let mut page = 1u32;

        loop {
            let items: Vec<Repository> = self
                .octo
                .get(&route, Some(&PageParams { per_page: PER_PAGE, page }))
                .await
                .map_err(|e| map_err(format!("repositories of {owner:?}"), e))?;

            let last = items.len() < PER_PAGE as usize;
            repos.extend(items.into_iter().map(to_remote));

            if last {
                break;
            }
            page += 1;
        }

        Ok(repos)
    }

    async fn get_file_contents(
        &self,
        owner: &str,
        name: &str,
        path: &str,
    ) -> ProviderResult<String> {
        let context = format!("{path} in {owner}/{name}");
        let content = self
            .octo
            .repos(owner, name)
            .get_content()
            .path(path)
            .send()
            .await
            .map_err(|e| map_err(context.clone(), e))?;

        let encoded = content
            .items
            .first()
            .and_then(|file| file.content.as_deref())
            .ok_or_else(|| ProviderError::NotFound(context))?;

        decode_content(encoded)
    }

    async fn list_branches(&self, owner: &str, name: &str) -> ProviderResult<Vec<String>> {
        let mut branches = Vec::new();
        let mut page = 1u32;

        loop {
            let result = self
                .octo
                .repos(owner, name)
                .list_branches()
                .per_page(PER_PAGE)
                .page(page)
                .send()
                .await
                .map_err(|e| map_err(format!("branches of {owner}/{name}"), e))?;

            if result.items.is_empty() {
                break;
            }

            branches.extend(result.items.into_iter().map(|b| b.name));

            if result.next.is_none() {
                break;
            }
            page += 1;
        }

        Ok(branches)
    }
}
