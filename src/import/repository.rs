use crate::error::{ImportError, Result};
use crate::provider::{ProviderClient, RemoteRepository};

pub async fn by_remote_id(client: &dyn ProviderClient, id: u64) -> Result<RemoteRepository> {
    Ok(client.get_repository_by_remote_id(id).await?)
}

/// Providers may resolve names case-insensitively or follow renames, so the
/// returned repository must match `group` and `name` exactly.
pub async fn by_name(client: &dyn ProviderClient, group: &str, name: &str) -> Result<RemoteRepository> {
    let repo = client.get_repository(group, name).await?;

    if repo.name != name {
        return Err(ImportError::Validation(format!(
            "project with name {name:?} not found, provider returned {:?}",
            repo.name
        )));
    }
    if repo.owner_login != group {
        return Err(ImportError::Validation(format!(
            "unable to find project {name:?} in organization or user {group:?}, it belongs to {:?}",
            repo.owner_login
        )));
    }
    Ok(repo)
}

/// First visible repository named exactly `name`, whatever its owner.
pub async fn by_name_only(client: &dyn ProviderClient, name: &str) -> Result<RemoteRepository> {
    client
        .list_repositories("")
        .await?
        .into_iter()
        .find(|repo| repo.name == name)
        .ok_or_else(|| ImportError::NotFound(format!("no visible repository named {name:?}")))
}

/// Repositories owned by `group`, or all visible ones when `group` is empty.
pub async fn list_group(client: &dyn ProviderClient, group: &str) -> Result<Vec<RemoteRepository>> {
    let repos = client.list_repositories(group).await?;
    Ok(repos
        .into_iter()
        .filter(|repo| group.is_empty() || repo.owner_login == group)
        .collect())
}
