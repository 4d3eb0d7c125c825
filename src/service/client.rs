//! HTTP client for the mesh management service.
//!
//! # Responsibilities
//! - Authenticate every call (bearer token, API key) and tag it with the
//!   invocation's request id
//! - Retry safe calls on transport errors, 5xx and 429
//! - Map non-success statuses to [`ServiceError::Status`]
//! - Stream presigned log URLs to a writer

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::config::{RetryConfig, ServiceConfig, WorkspaceConfig};
use crate::resilience::{calculate_backoff, is_retryable, max_attempts};
use crate::service::error::ServiceError;
use crate::service::types::{MeshDeployment, MeshDetails, MeshIdResponse, PresignedUrls, TenantFeatures};

const X_API_KEY: &str = "x-api-key";
const X_REQUEST_ID: &str = "x-request-id";

/// Client for one CLI invocation.
#[derive(Debug, Clone)]
pub struct MeshServiceClient {
    http: reqwest::Client,
    base_url: Url,
    headers: HeaderMap,
    retries: RetryConfig,
}

impl MeshServiceClient {
    pub fn new(config: &ServiceConfig, retries: RetryConfig, request_id: &str) -> Result<Self, ServiceError> {
        let base_url = Url::parse(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(X_API_KEY, header_value(&config.api_key, X_API_KEY)?);
        headers.insert(X_REQUEST_ID, header_value(request_id, X_REQUEST_ID)?);
        if !config.access_token.is_empty() {
            let bearer = format!("Bearer {}", config.access_token);
            headers.insert(AUTHORIZATION, header_value(&bearer, "authorization")?);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            headers,
            retries,
        })
    }

    /// Id of the workspace's mesh, `None` when the workspace has none.
    pub async fn get_mesh_id(&self, workspace: &WorkspaceConfig) -> Result<Option<String>, ServiceError> {
        let url = self.workspace_url(workspace, &["meshes"])?;
        match self.send_json::<MeshIdResponse>(Method::GET, url, None).await {
            Ok(response) => Ok(response.mesh_id.filter(|id| !id.is_empty())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_mesh(&self, workspace: &WorkspaceConfig, mesh_id: &str) -> Result<MeshDetails, ServiceError> {
        let url = self.workspace_url(workspace, &["meshes", mesh_id])?;
        self.send_json(Method::GET, url, None).await
    }

    /// Create the workspace's mesh from a finalized mesh document.
    pub async fn create_mesh(&self, workspace: &WorkspaceConfig, document: &Value) -> Result<MeshDetails, ServiceError> {
        let url = self.workspace_url(workspace, &["meshes"])?;
        self.send_json(Method::POST, url, Some(document)).await
    }

    pub async fn update_mesh(
        &self,
        workspace: &WorkspaceConfig,
        mesh_id: &str,
        document: &Value,
    ) -> Result<MeshDetails, ServiceError> {
        let url = self.workspace_url(workspace, &["meshes", mesh_id])?;
        self.send_json(Method::PUT, url, Some(document)).await
    }

    pub async fn delete_mesh(&self, workspace: &WorkspaceConfig, mesh_id: &str) -> Result<(), ServiceError> {
        let url = self.workspace_url(workspace, &["meshes", mesh_id])?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    pub async fn get_tenant_features(&self, org_code: &str) -> Result<TenantFeatures, ServiceError> {
        let url = self.url(&["organizations", org_code, "features"])?;
        self.send_json(Method::GET, url, None).await
    }

    /// Latest edge deployment of `mesh_id`. Addressed by org code, like the
    /// features and tenant endpoints.
    pub async fn get_mesh_deployments(
        &self,
        workspace: &WorkspaceConfig,
        mesh_id: &str,
    ) -> Result<MeshDeployment, ServiceError> {
        let url = self.url(&[
            "organizations",
            workspace.org_code.as_str(),
            "projects",
            workspace.project_id.as_str(),
            "workspaces",
            workspace.workspace_id.as_str(),
            "meshes",
            mesh_id,
            "deployments",
            "latest",
        ])?;
        self.send_json(Method::GET, url, None).await
    }

    /// Presigned URLs of the logs between `start` and `end` (both `YYYY-MM-DDTHH:MM:SSZ`).
    pub async fn get_presigned_urls(
        &self,
        workspace: &WorkspaceConfig,
        mesh_id: &str,
        start: &str,
        end: &str,
    ) -> Result<PresignedUrls, ServiceError> {
        let mut url = self.workspace_url(workspace, &["meshes", mesh_id, "logs", "bulk"])?;
        url.query_pairs_mut()
            .append_pair("startDateTime", start)
            .append_pair("endDateTime", end);
        self.send_json(Method::GET, url, None).await
    }

    pub async fn create_tenant(&self, tenant: &Value) -> Result<Value, ServiceError> {
        let url = self.url(&["tenants"])?;
        self.send_json(Method::POST, url, Some(tenant)).await
    }

    pub async fn update_tenant(&self, tenant_id: &str, tenant: &Value) -> Result<Value, ServiceError> {
        let url = self.url(&["tenants", tenant_id])?;
        self.send_json(Method::PUT, url, Some(tenant)).await
    }

    /// Tenant configuration of `mesh_id`, `None` when unknown.
    pub async fn get_tenant(
        &self,
        org_code: &str,
        project_id: &str,
        workspace_id: &str,
        mesh_id: &str,
    ) -> Result<Option<Value>, ServiceError> {
        let url = self.url(&[
            "organizations",
            org_code,
            "projects",
            project_id,
            "workspaces",
            workspace_id,
            "tenants",
            mesh_id,
        ])?;
        match self.send_json(Method::GET, url, None).await {
            Ok(tenant) => Ok(Some(tenant)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Stream the body of a presigned `url` into `writer`. Returns the bytes written.
    ///
    /// Presigned URLs carry their own credentials, so no service headers are sent.
    pub async fn download<W>(&self, url: &str, writer: &mut W) -> Result<u64, ServiceError>
    where
        W: AsyncWrite + Unpin,
    {
        let response = self.http.get(url).send().await?;
        let mut response = check_status(response).await?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(endpoint)
    }

    fn workspace_url(&self, workspace: &WorkspaceConfig, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut path = vec![
            "organizations",
            workspace.org_id.as_str(),
            "projects",
            workspace.project_id.as_str(),
            "workspaces",
            workspace.workspace_id.as_str(),
        ];
        path.extend_from_slice(segments);
        self.url(&path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T, ServiceError> {
        let response = self.send(method, url, body).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ServiceError::Decode)
    }

    /// Send a request, retrying safe methods, and fail on non-success statuses.
    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Response, ServiceError> {
        let attempts = max_attempts(&self.retries, &method);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .headers(self.headers.clone());
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if attempt >= attempts || !is_retryable(&method, Some(status), false) {
                        tracing::debug!(method = %method, url = %url, status = status.as_u16(), "Mesh service responded");
                        return check_status(response).await;
                    }
                    tracing::warn!(method = %method, url = %url, status = status.as_u16(), attempt, "Retrying mesh service call");
                }
                Err(e) => {
                    if attempt >= attempts || !is_retryable(&method, None, true) {
                        return Err(e.into());
                    }
                    tracing::warn!(method = %method, url = %url, error = %e, attempt, "Retrying mesh service call");
                }
            }

            let delay = calculate_backoff(attempt, self.retries.base_delay_ms, self.retries.max_delay_ms);
            tokio::time::sleep(delay).await;
        }
    }
}

async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        body,
    })
}

fn header_value(value: &str, name: &'static str) -> Result<HeaderValue, ServiceError> {
    HeaderValue::from_str(value).map_err(|_| ServiceError::InvalidHeader(name))
}
