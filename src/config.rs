use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SYSTEM_CONFIG_FILE: &str = "/etc/wharf-github-import/config.toml";
const LOCAL_CONFIG_FILE: &str = "wharf-github-import.toml";
const ENV_PREFIX: &str = "WHARF_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ca: CertConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Connection to the registry API. The URL normally ends in `/api`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_all_origins: bool,
}

/// Extra PEM certificates trusted in addition to the system roots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertConfig {
    #[serde(default)]
    pub certs_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEndpoint {
    pub base_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustConfig {
    pub certs_file: Option<PathBuf>,
}

impl Config {
    pub fn load(cli_path: Option<PathBuf>) -> figment::Result<Self> {
        let mut config: Config = Self::figment(cli_path.as_deref()).extract()?;
        config.apply_legacy_env();
        Ok(config)
    }

    fn figment(cli_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(SYSTEM_CONFIG_FILE))
            .merge(Toml::file(LOCAL_CONFIG_FILE));

        if let Ok(path) = std::env::var("WHARF_CONFIG") {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = cli_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
    }

    // Environment variables from before the WHARF_ prefix existed.
    fn apply_legacy_env(&mut self) {
        if std::env::var("ALLOW_CORS").is_ok_and(|v| v == "YES") {
            self.http.cors.allow_all_origins = true;
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            if !addr.is_empty() {
                self.http.bind_address = addr;
            }
        }
    }

    pub fn registry_endpoint(&self) -> RegistryEndpoint {
        RegistryEndpoint {
            base_url: self.api.url.clone(),
        }
    }

    pub fn trust(&self) -> TrustConfig {
        TrustConfig {
            certs_file: self.ca.certs_file.clone(),
        }
    }
}
