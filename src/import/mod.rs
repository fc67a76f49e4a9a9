pub mod credentials;
pub mod orchestrator;
pub mod repository;
pub mod upsert;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use orchestrator::Importer;

/// An import or refresh request. Zero IDs and empty strings mean "not
/// supplied".
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportRequest {
    pub token_id: u64,
    pub token: String,
    pub user: String,
    pub url: String,
    pub upload_url: String,
    pub provider_id: u64,
    pub provider: String,
    pub project_id: u64,
    pub project: String,
    pub group: String,
}

impl fmt::Debug for ImportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportRequest")
            .field("token_id", &self.token_id)
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .field("url", &self.url)
            .field("upload_url", &self.upload_url)
            .field("provider_id", &self.provider_id)
            .field("provider", &self.provider)
            .field("project_id", &self.project_id)
            .field("project", &self.project)
            .field("group", &self.group)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportMode {
    Refresh { project_id: u64 },
    Project { group: String, name: String },
    Group { group: String },
}

impl ImportRequest {
    /// Project ID wins over project name, which wins over group. A request
    /// with none of them imports every visible repository.
    pub fn mode(&self) -> ImportMode {
        if self.project_id != 0 {
            ImportMode::Refresh {
                project_id: self.project_id,
            }
        } else if !self.project.is_empty() {
            ImportMode::Project {
                group: self.group.clone(),
                name: self.project.clone(),
            }
        } else {
            ImportMode::Group {
                group: self.group.clone(),
            }
        }
    }
}

impl ImportMode {
    pub fn label(&self) -> &'static str {
        match self {
            ImportMode::Refresh { .. } => "refresh",
            ImportMode::Project { .. } => "project",
            ImportMode::Group { .. } => "group",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub projects: usize,
    pub branches: usize,
}
