//! GraphQL gateway abstraction and the built-in upstream relay.
//!
//! # Responsibilities
//! - Define the [`GraphqlGateway`] capability the server dispatches to
//! - Relay GraphQL requests to a mesh source's `graphql.endpoint`
//! - Report each source exchange under `extensions.httpDetails`
//!
//! # Design Decisions
//! - A gateway never fails: transport errors become GraphQL error bodies
//! - The gateway only sets its own `content-type`; source response headers
//!   travel through `httpDetails` so the server decides what to forward
//! - Non-JSON source bodies (GraphiQL pages, plain errors) pass through untouched

use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, HOST};
use axum::http::{Method, StatusCode, Uri};
use serde_json::{json, Map, Value};

use crate::artifact::ArtifactError;
use crate::http::headers::is_hop_by_hop;
use crate::mesh::schema::Source;

const APPLICATION_JSON: &str = "application/json";

/// A GraphQL request as received by the server.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The gateway's answer, before response header processing.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl GatewayResponse {
    /// A JSON response with only `content-type` set.
    pub fn json(status: StatusCode, body: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        Self {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }
    }

    /// A GraphQL error response.
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, &json!({ "errors": [{ "message": message }] }))
    }
}

/// Executes GraphQL requests for one mesh.
#[async_trait]
pub trait GraphqlGateway: Send + Sync {
    async fn handle(&self, request: GatewayRequest) -> GatewayResponse;
}

/// Relays every request to a single GraphQL source.
pub struct UpstreamGateway {
    source_name: String,
    endpoint: String,
    operation_headers: HeaderMap,
    client: reqwest::Client,
}

impl UpstreamGateway {
    /// Build a relay for `source`, which must use the `graphql` handler.
    pub fn new(source: &Source, timeout: Duration) -> Result<Self, ArtifactError> {
        let graphql = source
            .handler
            .graphql
            .as_ref()
            .ok_or_else(|| ArtifactError::NotGraphqlSource(source.name.clone()))?;

        let mut operation_headers = HeaderMap::new();
        for (name, value) in &graphql.operation_headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    operation_headers.insert(name, value);
                }
                _ => tracing::warn!(source = %source.name, header = %name, "Ignoring invalid operation header"),
            }
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ArtifactError::Client)?;

        Ok(Self {
            source_name: source.name.clone(),
            endpoint: graphql.endpoint.clone(),
            operation_headers,
            client,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    fn upstream_url(&self, uri: &Uri) -> String {
        match uri.query() {
            Some(query) if self.endpoint.contains('?') => format!("{}&{}", self.endpoint, query),
            Some(query) => format!("{}?{}", self.endpoint, query),
            None => self.endpoint.clone(),
        }
    }

    fn upstream_headers(&self, incoming: &HeaderMap) -> HeaderMap {
        let mut headers: HeaderMap = incoming
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name) && *name != HOST)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        for (name, value) in &self.operation_headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    fn http_details(
        &self,
        url: &str,
        method: &Method,
        request_headers: &HeaderMap,
        status: StatusCode,
        response_headers: &HeaderMap,
        elapsed: Duration,
    ) -> Value {
        json!({
            "sourceName": self.source_name,
            "request": {
                "url": url,
                "method": method.as_str(),
                "headers": headers_to_json(request_headers),
            },
            "response": {
                "status": status.as_u16(),
                "statusText": status.canonical_reason().unwrap_or(""),
                "headers": headers_to_json(response_headers),
            },
            "responseTime": elapsed.as_millis() as u64,
        })
    }
}

#[async_trait]
impl GraphqlGateway for UpstreamGateway {
    async fn handle(&self, request: GatewayRequest) -> GatewayResponse {
        let url = self.upstream_url(&request.uri);
        let headers = self.upstream_headers(&request.headers);
        let started = Instant::now();

        tracing::debug!(source = %self.source_name, url = %url, method = %request.method, "Relaying request to source");

        let result = self
            .client
            .request(request.method.clone(), &url)
            .headers(headers.clone())
            .body(request.body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(source = %self.source_name, error = %e, "Source request failed");
                return GatewayResponse::error(
                    StatusCode::BAD_GATEWAY,
                    &format!("Failed to reach source {}: {}", self.source_name, e),
                );
            }
        };

        let status = response.status();
        let response_headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(source = %self.source_name, error = %e, "Failed to read source response");
                return GatewayResponse::error(
                    StatusCode::BAD_GATEWAY,
                    &format!("Failed to read response from source {}: {}", self.source_name, e),
                );
            }
        };

        let mut passthrough_headers = HeaderMap::new();
        if let Some(content_type) = response_headers.get(CONTENT_TYPE) {
            passthrough_headers.insert(CONTENT_TYPE, content_type.clone());
        }

        let Ok(Value::Object(mut payload)) = serde_json::from_slice::<Value>(&body) else {
            return GatewayResponse {
                status,
                headers: passthrough_headers,
                body,
            };
        };

        let detail = self.http_details(
            &url,
            &request.method,
            &headers,
            status,
            &response_headers,
            started.elapsed(),
        );
        append_http_details(&mut payload, detail);

        GatewayResponse::json(status, &Value::Object(payload))
    }
}

/// Push `detail` onto `extensions.httpDetails`, creating both as needed.
fn append_http_details(payload: &mut Map<String, Value>, detail: Value) {
    let extensions = payload
        .entry("extensions")
        .or_insert_with(|| Value::Object(Map::new()));
    if !extensions.is_object() {
        *extensions = Value::Object(Map::new());
    }

    if let Value::Object(extensions) = extensions {
        match extensions.entry("httpDetails").or_insert_with(|| Value::Array(Vec::new())) {
            Value::Array(details) => details.push(detail),
            other => *other = Value::Array(vec![detail]),
        }
    }
}

/// Headers as a JSON object. Repeated headers become arrays.
fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut object = Map::new();
    for name in headers.keys() {
        let values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| Value::String(v.to_string()))
            .collect();

        let value = match values.len() {
            0 => continue,
            1 => values.into_iter().next().unwrap_or(Value::Null),
            _ => Value::Array(values),
        };
        object.insert(name.as_str().to_string(), value);
    }
    Value::Object(object)
}
