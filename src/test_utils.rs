#![cfg(test)]

use crate::provider::{
    ProviderClient, ProviderError, ProviderResult, RemoteRepository, SourceProvider,
};
use crate::registry::types::{Branch, NewProvider, NewToken, Project, Provider, Token};
use crate::registry::{RegistryClient, RegistryError, RegistryResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub struct FakeRepo {
    pub repo: RemoteRepository,
    pub branches: Vec<String>,
}

pub fn make_repo(id: u64, owner: &str, name: &str, default_branch: &str, branches: &[&str]) -> FakeRepo {
    FakeRepo {
        repo: RemoteRepository {
            remote_id: id,
            name: name.to_string(),
            owner_login: owner.to_string(),
            description: format!("{name} description"),
            avatar_url: format!("https://avatars.example.org/{owner}"),
            default_branch: default_branch.to_string(),
            ssh_url: format!("git@github.com:{owner}/{name}.git"),
        },
        branches: branches.iter().map(|b| b.to_string()).collect(),
    }
}

pub fn make_token(id: u64) -> Token {
    Token {
        id,
        token: "ghp_test".to_string(),
        user_name: "alice".to_string(),
        provider_id: 0,
    }
}

pub fn make_provider(id: u64, url: &str) -> Provider {
    Provider {
        id,
        name: "github".to_string(),
        url: url.to_string(),
        upload_url: String::new(),
        token_id: 1,
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ProviderState {
    repos: Vec<FakeRepo>,
    files: HashMap<(String, String), ProviderResult<String>>,
    connects: usize,
    calls: Vec<String>,
    fail_listing: bool,
}

/// In-memory provider. Name lookups are case-insensitive and return the
/// canonical repository, the way GitHub does.
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<ProviderState>>,
}

#[derive(Clone)]
pub struct FakeClient {
    state: Arc<Mutex<ProviderState>>,
}

impl FakeProvider {
    pub fn new(repos: Vec<FakeRepo>) -> Self {
        let provider = Self::default();
        provider.state.lock().unwrap().repos = repos;
        provider
    }

    pub fn client(&self) -> FakeClient {
        FakeClient {
            state: Arc::clone(&self.state),
        }
    }

    pub fn set_file(&self, owner: &str, name: &str, contents: ProviderResult<String>) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert((owner.to_string(), name.to_string()), contents);
    }

    pub fn set_branches(&self, owner: &str, name: &str, branches: &[&str]) {
        let mut state = self.state.lock().unwrap();
        if let Some(r) = state
            .repos
            .iter_mut()
            .find(|r| r.repo.owner_login == owner && r.repo.name == name)
        {
            r.branches = branches.iter().map(|b| b.to_string()).collect();
        }
    }

    pub fn rename(&self, remote_id: u64, new_name: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(r) = state.repos.iter_mut().find(|r| r.repo.remote_id == remote_id) {
            r.repo.name = new_name.to_string();
        }
    }

    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_listing = true;
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl SourceProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn connect(&self, _token: &Token, provider: &Provider) -> ProviderResult<Box<dyn ProviderClient>> {
        if url::Url::parse(&provider.url).is_err() {
            return Err(ProviderError::InvalidUrl(provider.url.clone()));
        }
        self.state.lock().unwrap().connects += 1;
        Ok(Box::new(self.client()))
    }
}

#[async_trait]
impl ProviderClient for FakeClient {
    async fn get_repository(&self, owner: &str, name: &str) -> ProviderResult<RemoteRepository> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get {owner}/{name}"));
        state
            .repos
            .iter()
            .find(|r| {
                r.repo.owner_login.eq_ignore_ascii_case(owner) && r.repo.name.eq_ignore_ascii_case(name)
            })
            .map(|r| r.repo.clone())
            .ok_or_else(|| ProviderError::NotFound(format!("{owner}/{name}")))
    }

    async fn get_repository_by_remote_id(&self, id: u64) -> ProviderResult<RemoteRepository> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_by_id {id}"));
        state
            .repos
            .iter()
            .find(|r| r.repo.remote_id == id)
            .map(|r| r.repo.clone())
            .ok_or_else(|| ProviderError::NotFound(format!("repository {id}")))
    }

    async fn list_repositories(&self, owner: &str) -> ProviderResult<Vec<RemoteRepository>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list {owner}"));
        if state.fail_listing {
            return Err(ProviderError::Api("503 Service Unavailable".to_string()));
        }
        Ok(state
            .repos
            .iter()
            .filter(|r| owner.is_empty() || r.repo.owner_login.eq_ignore_ascii_case(owner))
            .map(|r| r.repo.clone())
            .collect())
    }

    async fn get_file_contents(&self, owner: &str, name: &str, path: &str) -> ProviderResult<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(&(owner.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::NotFound(path.to_string())))
    }

    async fn list_branches(&self, owner: &str, name: &str) -> ProviderResult<Vec<String>> {
        let state = self.state.lock().unwrap();
        state
            .repos
            .iter()
            .find(|r| r.repo.owner_login == owner && r.repo.name == name)
            .map(|r| r.branches.clone())
            .ok_or_else(|| ProviderError::NotFound(format!("{owner}/{name}")))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    tokens: Vec<Token>,
    providers: Vec<Provider>,
    projects: Vec<Project>,
    branches: Vec<Branch>,
    project_upserts: Vec<String>,
    branch_upserts: Vec<String>,
    fail_project_upsert: HashSet<String>,
    fail_branch_upsert: HashSet<String>,
    empty_project_upsert: bool,
    empty_branch_upsert: bool,
    unreachable: bool,
}

impl RegistryState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory registry keyed the way the real one is: projects by
/// `(provider, remote id)` when a remote ID is given, else by group and name.
#[derive(Clone, Default)]
pub struct FakeRegistry {
    state: Arc<Mutex<RegistryState>>,
}

fn unavailable() -> RegistryError {
    RegistryError::Status {
        status: 503,
        body: "registry unavailable".to_string(),
    }
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(&self, secret: &str, user: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.tokens.push(Token {
            id,
            token: secret.to_string(),
            user_name: user.to_string(),
            provider_id: 0,
        });
        id
    }

    pub fn with_provider(&self, url: &str, upload_url: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.providers.push(Provider {
            id,
            name: "github".to_string(),
            url: url.to_string(),
            upload_url: upload_url.to_string(),
            token_id: 0,
        });
        id
    }

    pub fn with_project(&self, mut project: Project) -> u64 {
        let mut state = self.state.lock().unwrap();
        project.id = state.next_id();
        let id = project.id;
        state.projects.push(project);
        id
    }

    pub fn with_branch(&self, project_id: u64, name: &str) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.branches.push(Branch {
            id,
            name: name.to_string(),
            project_id,
            is_default: false,
            token_id: 0,
        });
    }

    pub fn fail_project_upsert(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_project_upsert
            .insert(name.to_string());
    }

    pub fn fail_branch_upsert(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_branch_upsert
            .insert(name.to_string());
    }

    pub fn return_empty_projects(&self) {
        self.state.lock().unwrap().empty_project_upsert = true;
    }

    pub fn return_empty_branches(&self) {
        self.state.lock().unwrap().empty_branch_upsert = true;
    }

    pub fn go_offline(&self) {
        self.state.lock().unwrap().unreachable = true;
    }

    pub fn projects(&self) -> Vec<Project> {
        self.state.lock().unwrap().projects.clone()
    }

    pub fn project_named(&self, name: &str) -> Option<Project> {
        self.projects().into_iter().find(|p| p.name == name)
    }

    pub fn branches(&self) -> Vec<Branch> {
        self.state.lock().unwrap().branches.clone()
    }

    pub fn branches_of(&self, project_id: u64) -> Vec<Branch> {
        self.branches()
            .into_iter()
            .filter(|b| b.project_id == project_id)
            .collect()
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.state.lock().unwrap().tokens.clone()
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.state.lock().unwrap().providers.clone()
    }

    /// Names of every project upsert attempted, in order, failed ones included.
    pub fn project_upserts(&self) -> Vec<String> {
        self.state.lock().unwrap().project_upserts.clone()
    }

    pub fn branch_upserts(&self) -> Vec<String> {
        self.state.lock().unwrap().branch_upserts.clone()
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn get_token(&self, id: u64) -> RegistryResult<Option<Token>> {
        let state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(unavailable());
        }
        Ok(state.tokens.iter().find(|t| t.id == id).cloned())
    }

    async fn create_token(&self, token: &NewToken) -> RegistryResult<Option<Token>> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(unavailable());
        }
        let created = Token {
            id: state.next_id(),
            token: token.token.clone(),
            user_name: token.user_name.clone(),
            provider_id: 0,
        };
        state.tokens.push(created.clone());
        Ok(Some(created))
    }

    async fn get_provider(&self, id: u64) -> RegistryResult<Option<Provider>> {
        let state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(unavailable());
        }
        Ok(state.providers.iter().find(|p| p.id == id).cloned())
    }

    async fn create_provider(&self, provider: &NewProvider) -> RegistryResult<Option<Provider>> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(unavailable());
        }
        let created = Provider {
            id: state.next_id(),
            name: provider.name.clone(),
            url: provider.url.clone(),
            upload_url: provider.upload_url.clone(),
            token_id: provider.token_id,
        };
        state.providers.push(created.clone());
        Ok(Some(created))
    }

    async fn get_project(&self, id: u64) -> RegistryResult<Option<Project>> {
        let state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(unavailable());
        }
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn upsert_project(&self, project: &Project) -> RegistryResult<Option<Project>> {
        let mut state = self.state.lock().unwrap();
        state.project_upserts.push(project.name.clone());
        if state.unreachable || state.fail_project_upsert.contains(&project.name) {
            return Err(unavailable());
        }
        if state.empty_project_upsert {
            return Ok(None);
        }

        let existing = state.projects.iter_mut().find(|p| {
            if project.id != 0 {
                p.id == project.id
            } else if !project.remote_project_id.is_empty() {
                p.provider_id == project.provider_id && p.remote_project_id == project.remote_project_id
            } else {
                p.group_name == project.group_name && p.name == project.name
            }
        });

        let stored = match existing {
            Some(p) => {
                let id = p.id;
                *p = Project {
                    id,
                    ..project.clone()
                };
                p.clone()
            }
            None => {
                let stored = Project {
                    id: state.next_id(),
                    ..project.clone()
                };
                state.projects.push(stored.clone());
                stored
            }
        };
        Ok(Some(stored))
    }

    async fn upsert_branch(&self, branch: &Branch) -> RegistryResult<Option<Branch>> {
        let mut state = self.state.lock().unwrap();
        state.branch_upserts.push(branch.name.clone());
        if state.unreachable || state.fail_branch_upsert.contains(&branch.name) {
            return Err(unavailable());
        }
        if state.empty_branch_upsert {
            return Ok(None);
        }

        let existing = state
            .branches
            .iter_mut()
            .find(|b| b.project_id == branch.project_id && b.name == branch.name);

        let stored = match existing {
            Some(b) => {
                b.is_default = branch.is_default;
                b.token_id = branch.token_id;
                b.clone()
            }
            None => {
                let stored = Branch {
                    id: state.next_id(),
                    ..branch.clone()
                };
                state.branches.push(stored.clone());
                stored
            }
        };
        Ok(Some(stored))
    }
}
