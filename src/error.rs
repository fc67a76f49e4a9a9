use crate::provider::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("empty result: {0}")]
    EmptyResult(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl ImportError {
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::NotFound(_) => "not_found",
            ImportError::Validation(_) => "validation",
            ImportError::Read(_) => "read",
            ImportError::Write(_) => "write",
            ImportError::EmptyResult(_) => "empty_result",
            ImportError::Connection(_) => "connection",
        }
    }
}

impl From<ProviderError> for ImportError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotFound(what) => ImportError::NotFound(what),
            ProviderError::InvalidUrl(msg) => ImportError::Connection(msg),
            other => ImportError::Read(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
