//! Startup orchestration for the gateway server.
//!
//! # Responsibilities
//! - Load the mesh artifact and build the server context
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when the gateway is ready)

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::artifact::{ArtifactError, ArtifactLoader};
use crate::config::{ObservabilityConfig, ServerConfig};
use crate::http::{HttpServer, ServerContext, TenantContext};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Errors that prevent the gateway server from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Load `mesh_id`, then serve it for `tenant` on `port` until `shutdown` is triggered.
pub async fn start_server(
    loader: &dyn ArtifactLoader,
    mesh_id: &str,
    port: u16,
    server: &ServerConfig,
    observability: &ObservabilityConfig,
    tenant: TenantContext,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    let artifact = loader.load(mesh_id).await?;
    let context =
        ServerContext::from_artifact(&artifact, Duration::from_secs(server.request_timeout_secs))?.with_tenant(tenant);

    if observability.metrics_enabled {
        match observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = format!("{}:{}", server.host, port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    println!("Server is running on http://localhost:{port}/graphql");

    HttpServer::new(context, server)
        .run(listener, shutdown)
        .await
        .map_err(StartupError::Server)
}
