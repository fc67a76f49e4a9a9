use super::credentials::{resolve_provider, resolve_token};
use super::repository;
use super::upsert::ProjectSync;
use super::{ImportMode, ImportRequest, ImportSummary};
use crate::error::{ImportError, Result};
use crate::provider::SourceProvider;
use crate::registry::RegistryClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs one import or refresh request against a registry and a provider.
/// Every call is awaited in turn; nothing is retried or rolled back.
#[derive(Clone)]
pub struct Importer {
    registry: Arc<dyn RegistryClient>,
    source: Arc<dyn SourceProvider>,
}

impl Importer {
    pub fn new(registry: Arc<dyn RegistryClient>, source: Arc<dyn SourceProvider>) -> Self {
        Self { registry, source }
    }

    pub async fn run(&self, req: &ImportRequest) -> Result<ImportSummary> {
        let mode = req.mode();
        info!(mode = mode.label(), source = self.source.name(), "starting import");

        let registry = self.registry.as_ref();
        let token = resolve_token(registry, req).await?;
        let provider = resolve_provider(registry, req, &token, self.source.name()).await?;

        let client = self
            .source
            .connect(&token, &provider)
            .map_err(|e| ImportError::Connection(format!("provider url {:?}: {e}", provider.url)))?;

        let sync = ProjectSync {
            registry,
            client: client.as_ref(),
            token: &token,
            provider: &provider,
        };

        match mode {
            ImportMode::Refresh { project_id } => self.refresh(&sync, project_id).await,
            ImportMode::Project { group, name } => {
                let repo = if group.is_empty() {
                    repository::by_name_only(sync.client, &name).await?
                } else {
                    repository::by_name(sync.client, &group, &name).await?
                };
                let upserted = sync.upsert(0, &repo).await?;
                Ok(ImportSummary {
                    projects: 1,
                    branches: upserted.branches,
                })
            }
            ImportMode::Group { group } => import_group(&sync, &group).await,
        }
    }

    async fn refresh(&self, sync: &ProjectSync<'_>, project_id: u64) -> Result<ImportSummary> {
        let project = self
            .registry
            .get_project(project_id)
            .await
            .map_err(|e| ImportError::Read(format!("get project {project_id}: {e}")))?
            .ok_or_else(|| ImportError::NotFound(format!("project with ID {project_id}")))?;

        let repo = match project.remote_project_id.parse::<u64>() {
            Ok(remote_id) if remote_id != 0 => repository::by_remote_id(sync.client, remote_id).await?,
            _ => {
                warn!(
                    project_id,
                    remote_project_id = %project.remote_project_id,
                    "project has no remote ID, resolving by group and name"
                );
                repository::by_name(sync.client, &project.group_name, &project.name).await?
            }
        };

        let upserted = sync.upsert(project.id, &repo).await?;
        Ok(ImportSummary {
            projects: 1,
            branches: upserted.branches,
        })
    }
}

/// Upserts the group's repositories in listing order. The first failure ends
/// the batch; repositories already written stay written.
async fn import_group(sync: &ProjectSync<'_>, group: &str) -> Result<ImportSummary> {
    let repos = repository::list_group(sync.client, group).await?;
    let mut summary = ImportSummary::default();

    for (idx, repo) in repos.iter().enumerate() {
        match sync.upsert(0, repo).await {
            Ok(upserted) => {
                summary.projects += 1;
                summary.branches += upserted.branches;
            }
            Err(e) => {
                warn!(
                    group,
                    project = %repo.full_name(),
                    imported = idx,
                    skipped = repos.len() - idx - 1,
                    error = %e,
                    "group import aborted"
                );
                return Err(e);
            }
        }
    }

    info!(group, projects = summary.projects, "group import finished");
    Ok(summary)
}
