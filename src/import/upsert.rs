use crate::build_definition;
use crate::error::{ImportError, Result};
use crate::provider::{ProviderClient, RemoteRepository};
use crate::registry::types::{Branch, Project, Provider, Token};
use crate::registry::RegistryClient;
use tracing::{debug, info};

/// Writes repositories into the registry on behalf of one resolved token and
/// provider.
pub struct ProjectSync<'a> {
    pub registry: &'a dyn RegistryClient,
    pub client: &'a dyn ProviderClient,
    pub token: &'a Token,
    pub provider: &'a Provider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted {
    pub project_id: u64,
    pub branches: usize,
}

impl ProjectSync<'_> {
    /// Upserts `repo` and all its branches. A `project_id` of zero lets the
    /// registry match by remote ID or create. Branches are never removed.
    pub async fn upsert(&self, project_id: u64, repo: &RemoteRepository) -> Result<Upserted> {
        let full_name = repo.full_name();
        let build_definition =
            build_definition::fetch(self.client, &repo.owner_login, &repo.name).await;

        let project = Project {
            id: project_id,
            name: repo.name.clone(),
            group_name: repo.owner_login.clone(),
            description: repo.description.clone(),
            avatar_url: repo.avatar_url.clone(),
            git_url: repo.ssh_url.clone(),
            build_definition,
            provider_id: self.provider.id,
            token_id: self.token.id,
            remote_project_id: repo.remote_id.to_string(),
        };

        let stored = self
            .registry
            .upsert_project(&project)
            .await
            .map_err(|e| ImportError::Write(format!("upsert project {full_name}: {e}")))?
            .ok_or_else(|| {
                ImportError::EmptyResult(format!("unable to create project {full_name}"))
            })?;

        let branches = self
            .client
            .list_branches(&repo.owner_login, &repo.name)
            .await
            .map_err(|e| ImportError::Read(format!("list branches of {full_name}: {e}")))?;

        for name in &branches {
            let branch = Branch {
                id: 0,
                name: name.clone(),
                project_id: stored.id,
                is_default: *name == repo.default_branch,
                token_id: self.token.id,
            };
            let written = self.registry.upsert_branch(&branch).await.map_err(|e| {
                ImportError::Write(format!("upsert branch {name:?} of {full_name}: {e}"))
            })?;
            match written {
                Some(b) => {
                    debug!(project_id = stored.id, branch_id = b.id, branch = %name, default = b.is_default, "upserted branch")
                }
                None => {
                    debug!(project_id = stored.id, branch = %name, "registry returned no branch")
                }
            }
        }

        info!(
            project = %full_name,
            project_id = stored.id,
            remote_id = repo.remote_id,
            branches = branches.len(),
            "upserted project"
        );

        Ok(Upserted {
            project_id: stored.id,
            branches: branches.len(),
        })
    }
}
