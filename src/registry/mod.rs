pub mod client;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;
use types::{Branch, NewProvider, NewToken, Project, Provider, Token};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid registry url: {0}")]
    Url(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// The registry's record operations. A record the registry reports with a
/// zero ID comes back as `None`.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn get_token(&self, id: u64) -> RegistryResult<Option<Token>>;
    async fn create_token(&self, token: &NewToken) -> RegistryResult<Option<Token>>;
    async fn get_provider(&self, id: u64) -> RegistryResult<Option<Provider>>;
    async fn create_provider(&self, provider: &NewProvider) -> RegistryResult<Option<Provider>>;
    async fn get_project(&self, id: u64) -> RegistryResult<Option<Project>>;
    async fn upsert_project(&self, project: &Project) -> RegistryResult<Option<Project>>;
    async fn upsert_branch(&self, branch: &Branch) -> RegistryResult<Option<Branch>>;
}
