use serde::{Deserialize, Serialize};
use std::fmt;

/// Records the registry reports with an ID of zero do not exist.
pub trait RegistryRecord {
    fn id(&self) -> u64;
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Token {
    #[serde(rename = "tokenId")]
    pub id: u64,
    pub token: String,
    pub user_name: String,
    pub provider_id: u64,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("token", &"[REDACTED]")
            .field("user_name", &self.user_name)
            .field("provider_id", &self.provider_id)
            .finish()
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewToken {
    pub token: String,
    pub user_name: String,
}

impl fmt::Debug for NewToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewToken")
            .field("token", &"[REDACTED]")
            .field("user_name", &self.user_name)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Provider {
    #[serde(rename = "providerId")]
    pub id: u64,
    pub name: String,
    pub url: String,
    pub upload_url: String,
    pub token_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProvider {
    pub name: String,
    pub url: String,
    pub upload_url: String,
    pub token_id: u64,
}

/// A project as stored in the registry. Sent as-is for upserts, where an
/// `id` of zero lets the registry match by remote ID or create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "projectId")]
    pub id: u64,
    pub name: String,
    pub group_name: String,
    pub description: String,
    pub avatar_url: String,
    pub git_url: String,
    pub build_definition: String,
    pub provider_id: u64,
    pub token_id: u64,
    pub remote_project_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Branch {
    #[serde(rename = "branchId")]
    pub id: u64,
    pub name: String,
    pub project_id: u64,
    #[serde(rename = "default")]
    pub is_default: bool,
    pub token_id: u64,
}

impl RegistryRecord for Token {
    fn id(&self) -> u64 {
        self.id
    }
}

impl RegistryRecord for Provider {
    fn id(&self) -> u64 {
        self.id
    }
}

impl RegistryRecord for Project {
    fn id(&self) -> u64 {
        self.id
    }
}

impl RegistryRecord for Branch {
    fn id(&self) -> u64 {
        self.id
    }
}
