//! Mesh artifacts served by the gateway server.
//!
//! # Data Flow
//! ```text
//! mesh id
//!     → loader.rs (ArtifactLoader::load → MeshArtifact)
//!     → MeshArtifact::build (GraphqlGateway)
//!     → http::server (ServerContext)
//! ```
//!
//! # Design Decisions
//! - Artifacts are loaded through a trait so the server never resolves
//!   artifact paths itself
//! - An artifact is loaded and built once at startup

pub mod gateway;
pub mod loader;

use std::sync::Arc;
use std::time::Duration;

use crate::mesh::schema::{MeshConfig, Plugin, ResponseConfig};

pub use gateway::{GatewayRequest, GatewayResponse, GraphqlGateway, UpstreamGateway};
pub use loader::{write_artifact, ArtifactLoader, FsArtifactLoader, MESHRC_FILE};

/// Errors raised while loading or building an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Unable to read mesh artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mesh artifact {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No GraphQL source found in mesh {0}")]
    NoGraphqlSource(String),

    #[error("Source {0} does not use the graphql handler")]
    NotGraphqlSource(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A loaded mesh artifact.
#[derive(Debug, Clone)]
pub struct MeshArtifact {
    pub mesh_id: String,
    pub config: MeshConfig,
}

impl MeshArtifact {
    pub fn plugins(&self) -> &[Plugin] {
        &self.config.plugins
    }

    /// The mesh's response configuration, defaulted when absent.
    pub fn response_config(&self) -> ResponseConfig {
        self.config.response_config.clone().unwrap_or_default()
    }

    /// Build the gateway relaying to the first source with a `graphql` handler.
    pub fn build(&self, timeout: Duration) -> Result<Arc<dyn GraphqlGateway>, ArtifactError> {
        let source = self
            .config
            .sources
            .iter()
            .find(|source| source.handler.graphql.is_some())
            .ok_or_else(|| ArtifactError::NoGraphqlSource(self.mesh_id.clone()))?;

        let gateway = UpstreamGateway::new(source, timeout)?;
        tracing::info!(
            mesh_id = %self.mesh_id,
            source = %gateway.source_name(),
            "Built GraphQL gateway"
        );
        Ok(Arc::new(gateway))
    }
}
