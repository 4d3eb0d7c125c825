//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the GraphQL and health handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS)
//! - Hand GraphQL requests to the mesh gateway
//! - Apply the response header lifecycle (cache, process, evict)
//! - Observability (metrics, request IDs on every log line)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::artifact::{ArtifactError, GatewayRequest, GatewayResponse, GraphqlGateway, MeshArtifact};
use crate::config::ServerConfig;
use crate::http::cors::cors_layer;
use crate::http::headers::{strip_hop_by_hop, HeaderCache};
use crate::http::request::{include_metadata, propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::mesh::schema::ResponseConfig;
use crate::observability::metrics;

/// Largest GraphQL request body accepted.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Selects the tier of a locally served mesh; only `TI` is recognised.
pub const MESH_TIER_ENV: &str = "API_MESH_TIER";

/// Tenant a locally served mesh belongs to.
pub const TENANT_UUID_ENV: &str = "tenantUUID";

/// Tier and tenant of the served mesh, taken from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantContext {
    pub is_ti: bool,
    pub tenant_uuid: Option<String>,
}

impl TenantContext {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            is_ti: lookup(MESH_TIER_ENV).as_deref() == Some("TI"),
            tenant_uuid: lookup(TENANT_UUID_ENV).filter(|uuid| !uuid.is_empty()),
        }
    }
}

/// Everything the handlers need, built once at startup.
pub struct ServerContext {
    pub mesh_id: String,
    pub gateway: Arc<dyn GraphqlGateway>,
    pub response_config: ResponseConfig,
    pub header_cache: HeaderCache,
    pub cors: Option<CorsLayer>,
    pub tenant: TenantContext,
}

impl ServerContext {
    pub fn new(mesh_id: impl Into<String>, gateway: Arc<dyn GraphqlGateway>, response_config: ResponseConfig) -> Self {
        let cors = cors_layer(response_config.cors.as_ref());
        Self {
            mesh_id: mesh_id.into(),
            gateway,
            response_config,
            header_cache: HeaderCache::new(),
            cors,
            tenant: TenantContext::default(),
        }
    }

    pub fn with_tenant(mut self, tenant: TenantContext) -> Self {
        self.tenant = tenant;
        self
    }

    /// Build the context of a loaded artifact.
    pub fn from_artifact(artifact: &MeshArtifact, source_timeout: Duration) -> Result<Self, ArtifactError> {
        tracing::info!(
            mesh_id = %artifact.mesh_id,
            plugins = artifact.plugins().len(),
            "Creating GraphQL server"
        );
        let gateway = artifact.build(source_timeout)?;
        Ok(Self::new(artifact.mesh_id.clone(), gateway, artifact.response_config()))
    }
}

/// HTTP server for one mesh.
pub struct HttpServer {
    router: Router,
    context: Arc<ServerContext>,
}

impl HttpServer {
    /// Create a new HTTP server serving `context`.
    pub fn new(context: ServerContext, config: &ServerConfig) -> Self {
        let context = Arc::new(context);
        let router = Self::build_router(
            Arc::clone(&context),
            Duration::from_secs(config.request_timeout_secs),
        );
        Self { router, context }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(context: Arc<ServerContext>, request_timeout: Duration) -> Router {
        let cors = context.cors.clone();

        let mut router = Router::new()
            .route("/graphql", get(graphql_handler).post(graphql_handler))
            .route("/health", get(health_handler))
            .with_state(context);

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mesh_id = %self.context.mesh_id,
            is_ti = self.context.tenant.is_ti,
            tenant_uuid = ?self.context.tenant.tenant_uuid,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }
}

/// GraphQL handler.
/// Runs the request through the gateway and rebuilds the response headers.
async fn graphql_handler(State(context): State<Arc<ServerContext>>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());
    let include_metadata = include_metadata(request.headers());
    let method = request.method().clone();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            metrics::record_request(method.as_str(), 413, start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    tracing::info!(
        request_id = %request_id,
        method = %method,
        include_metadata,
        tenant_uuid = ?context.tenant.tenant_uuid,
        "Request received"
    );

    let gateway_response = context
        .gateway
        .handle(GatewayRequest {
            method: method.clone(),
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
        .await;

    // Clients may reuse x-request-id; the cache key must be unique per request.
    let cache_key = Uuid::new_v4().to_string();
    let response = respond(&context, &request_id, &cache_key, include_metadata, &method, gateway_response);
    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

/// Turn the gateway's answer into the client response.
fn respond(
    context: &ServerContext,
    request_id: &str,
    cache_key: &str,
    include_metadata: bool,
    method: &Method,
    gateway_response: GatewayResponse,
) -> Response {
    let mut body: Value = match serde_json::from_slice(&gateway_response.body) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Gateway response is not JSON, relaying as is");
            return relay(gateway_response);
        }
    };

    let http_details = body.pointer("/extensions/httpDetails");
    tracing::debug!(request_id = %request_id, http_details = ?http_details, "Mesh HTTP details");

    let cache = &context.header_cache;
    cache.prep_source_response_headers(http_details, cache_key);
    let headers = cache.process_response_headers(&context.response_config, cache_key, include_metadata, method);

    if !context.response_config.include_http_details {
        if let Some(extensions) = body.get_mut("extensions").and_then(Value::as_object_mut) {
            extensions.remove("httpDetails");
        }
    }

    cache.remove_request_headers(cache_key);

    let mut response = (gateway_response.status, body.to_string()).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response_headers.extend(strip_hop_by_hop(&gateway_response.headers));
    response_headers.extend(headers);
    response
}

/// Relay a non-JSON gateway response unchanged.
fn relay(gateway_response: GatewayResponse) -> Response {
    let mut response = (gateway_response.status, gateway_response.body).into_response();
    response
        .headers_mut()
        .extend(strip_hop_by_hop(&gateway_response.headers));
    response
}

async fn health_handler(State(context): State<Arc<ServerContext>>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "meshId": context.mesh_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use axum::http::HeaderMap;
    use tower::ServiceExt;

    /// Gateway answering every request with a fixed response.
    struct FixedGateway(GatewayResponse);

    #[async_trait]
    impl GraphqlGateway for FixedGateway {
        async fn handle(&self, _request: GatewayRequest) -> GatewayResponse {
            self.0.clone()
        }
    }

    fn graphql_body() -> Value {
        json!({
            "data": { "ping": "pong" },
            "extensions": {
                "httpDetails": [{
                    "sourceName": "commerce",
                    "response": { "status": 200, "headers": { "x-source": "commerce", "etag": "\"1\"" } }
                }]
            }
        })
    }

    fn server(response: GatewayResponse, response_config: serde_json::Value) -> HttpServer {
        let context = ServerContext::new(
            "mesh-1",
            Arc::new(FixedGateway(response)),
            serde_json::from_value(response_config).unwrap(),
        );
        HttpServer::new(context, &ServerConfig::default())
    }

    async fn call(server: &HttpServer, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = server.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    fn post(metadata: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/graphql")
            .header("content-type", "application/json");
        if metadata {
            builder = builder.header("x-include-metadata", "True");
        }
        builder.body(Body::from(r#"{"query":"{ ping }"}"#)).unwrap()
    }

    #[tokio::test]
    async fn test_http_details_removed_by_default() {
        let server = server(
            GatewayResponse::json(StatusCode::OK, &graphql_body()),
            json!({ "headers": { "x-powered-by": "mesh" } }),
        );

        let (status, headers, body) = call(&server, post(false)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-powered-by"], "mesh");
        assert_eq!(headers["content-type"], "application/json");
        assert!(headers.get("x-source").is_none());
        assert!(headers.get("x-request-id").is_some());

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "data": { "ping": "pong" }, "extensions": {} }));
        assert!(server.context().header_cache.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_and_http_details_included() {
        let server = server(
            GatewayResponse::json(StatusCode::OK, &graphql_body()),
            json!({ "includeHTTPDetails": true }),
        );

        let (_, headers, body) = call(&server, post(true)).await;
        assert_eq!(headers["x-source"], "commerce");
        assert!(headers.get("etag").is_none());

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, graphql_body());
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let server = server(GatewayResponse::json(StatusCode::OK, &json!({ "data": null })), json!({}));

        let mut request = post(false);
        request
            .headers_mut()
            .insert("x-request-id", HeaderValue::from_static("client-id"));
        let (_, headers, _) = call(&server, request).await;
        assert_eq!(headers["x-request-id"], "client-id");
    }

    #[tokio::test]
    async fn test_reused_request_id_does_not_touch_other_entries() {
        let server = server(GatewayResponse::json(StatusCode::OK, &graphql_body()), json!({}));
        let in_flight = json!([{ "response": { "headers": { "x-other": "in-flight" } } }]);
        server
            .context()
            .header_cache
            .prep_source_response_headers(Some(&in_flight), "client-id");

        let mut request = post(true);
        request
            .headers_mut()
            .insert("x-request-id", HeaderValue::from_static("client-id"));
        let (_, headers, _) = call(&server, request).await;

        assert_eq!(headers["x-request-id"], "client-id");
        assert_eq!(headers["x-source"], "commerce");
        assert!(headers.get("x-other").is_none());
        assert_eq!(server.context().header_cache.len(), 1);
    }

    #[tokio::test]
    async fn test_non_json_response_is_relayed() {
        let mut html_headers = HeaderMap::new();
        html_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        let html = GatewayResponse {
            status: StatusCode::OK,
            headers: html_headers,
            body: Bytes::from_static(b"<html>GraphiQL</html>"),
        };
        let server = server(html, json!({ "headers": { "x-powered-by": "mesh" } }));

        let request = Request::builder().uri("/graphql").body(Body::empty()).unwrap();
        let (status, headers, body) = call(&server, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/html");
        assert!(headers.get("x-powered-by").is_none());
        assert_eq!(&body[..], b"<html>GraphiQL</html>");
    }

    #[test]
    fn test_tenant_context_from_env() {
        let env = |tier: Option<&'static str>, uuid: Option<&'static str>| {
            move |key: &str| match key {
                MESH_TIER_ENV => tier.map(str::to_string),
                TENANT_UUID_ENV => uuid.map(str::to_string),
                _ => None,
            }
        };

        assert_eq!(
            TenantContext::from_lookup(env(Some("TI"), Some("tenant-1"))),
            TenantContext {
                is_ti: true,
                tenant_uuid: Some("tenant-1".into())
            }
        );
        assert!(!TenantContext::from_lookup(env(Some("NON-TI"), None)).is_ti);
        assert!(!TenantContext::from_lookup(env(Some("true"), None)).is_ti);
        assert_eq!(TenantContext::from_lookup(env(None, Some(""))), TenantContext::default());
    }

    #[tokio::test]
    async fn test_health() {
        let server = server(GatewayResponse::json(StatusCode::OK, &json!({})), json!({}));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, _, body) = call(&server, request).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "status": "ok", "meshId": "mesh-1" }));
    }
}
