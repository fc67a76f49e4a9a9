use super::types::{Branch, NewProvider, NewToken, Project, Provider, RegistryRecord, Token};
use super::{RegistryClient, RegistryError, RegistryResult};
use crate::config::RegistryEndpoint;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Registry client over the registry's JSON HTTP API. Built per request so
/// the caller's `Authorization` header is forwarded.
#[derive(Clone)]
pub struct HttpRegistryClient {
    http: Client,
    base_url: Url,
    auth_header: Option<String>,
}

impl HttpRegistryClient {
    pub fn new(
        http: Client,
        endpoint: &RegistryEndpoint,
        auth_header: Option<String>,
    ) -> RegistryResult<Self> {
        let mut raw = endpoint.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url =
            Url::parse(&raw).map_err(|e| RegistryError::Url(format!("{}: {e}", endpoint.base_url)))?;

        Ok(Self {
            http,
            base_url,
            auth_header,
        })
    }

    /// Same endpoint and connection pool, forwarding `auth_header` instead.
    pub fn with_auth_header(&self, auth_header: Option<String>) -> Self {
        Self {
            auth_header,
            ..self.clone()
        }
    }

    fn request(&self, method: Method, path: &str) -> RegistryResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| RegistryError::Url(format!("{path}: {e}")))?;
        debug!(%method, %url, "registry request");

        let builder = self.http.request(method, url);
        Ok(match &self.auth_header {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        })
    }

    async fn fetch<T>(&self, path: &str) -> RegistryResult<Option<T>>
    where
        T: DeserializeOwned + RegistryRecord,
    {
        let response = self.request(Method::GET, path)?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record: T = read_json(response).await?;
        Ok(existing(record))
    }

    async fn submit<B, T>(&self, method: Method, path: &str, body: &B) -> RegistryResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + RegistryRecord,
    {
        let response = self.request(method, path)?.json(body).send().await?;
        let record: T = read_json(response).await?;
        Ok(existing(record))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> RegistryResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RegistryError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

fn existing<T: RegistryRecord>(record: T) -> Option<T> {
    (record.id() != 0).then_some(record)
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn get_token(&self, id: u64) -> RegistryResult<Option<Token>> {
        self.fetch(&format!("token/{id}")).await
    }

    async fn create_token(&self, token: &NewToken) -> RegistryResult<Option<Token>> {
        self.submit(Method::POST, "token", token).await
    }

    async fn get_provider(&self, id: u64) -> RegistryResult<Option<Provider>> {
        self.fetch(&format!("provider/{id}")).await
    }

    async fn create_provider(&self, provider: &NewProvider) -> RegistryResult<Option<Provider>> {
        self.submit(Method::POST, "provider", provider).await
    }

    async fn get_project(&self, id: u64) -> RegistryResult<Option<Project>> {
        self.fetch(&format!("project/{id}")).await
    }

    async fn upsert_project(&self, project: &Project) -> RegistryResult<Option<Project>> {
        self.submit(Method::PUT, "project", project).await
    }

    async fn upsert_branch(&self, branch: &Branch) -> RegistryResult<Option<Branch>> {
        self.submit(Method::PUT, "branch", branch).await
    }
}
