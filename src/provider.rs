//! Source-control provider capability.
//!
//! The importer only talks to a remote host through these traits, so a new
//! host is added by implementing [`SourceProvider`] and [`ProviderClient`]
//! rather than by branching on a provider kind string.

use crate::registry::types::{Provider, Token};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("provider api error: {0}")]
    Api(String),

    #[error("undecodable content: {0}")]
    Decode(String),

    #[error("invalid provider url: {0}")]
    InvalidUrl(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRepository {
    pub remote_id: u64,
    pub name: String,
    pub owner_login: String,
    pub description: String,
    pub avatar_url: String,
    pub default_branch: String,
    pub ssh_url: String,
}

impl RemoteRepository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner_login, self.name)
    }
}

/// An authenticated handle to one provider endpoint.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn get_repository(&self, owner: &str, name: &str) -> ProviderResult<RemoteRepository>;

    async fn get_repository_by_remote_id(&self, id: u64) -> ProviderResult<RemoteRepository>;

    /// Repositories owned by `owner`, or every repository visible to the
    /// authenticated identity when `owner` is empty.
    async fn list_repositories(&self, owner: &str) -> ProviderResult<Vec<RemoteRepository>>;

    /// Decoded contents of `path` at the repository's default branch.
    async fn get_file_contents(&self, owner: &str, name: &str, path: &str)
        -> ProviderResult<String>;

    async fn list_branches(&self, owner: &str, name: &str) -> ProviderResult<Vec<String>>;
}

pub trait SourceProvider: Send + Sync {
    /// Provider kind, also used as the name of provider rows it creates.
    fn name(&self) -> &'static str;

    fn connect(&self, token: &Token, provider: &Provider) -> ProviderResult<Box<dyn ProviderClient>>;
}
