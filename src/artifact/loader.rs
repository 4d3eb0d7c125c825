//! Artifact loading from the local artifact directory.
//!
//! Layout: `<root>/<meshId>/.meshrc.json`, holding the finalized
//! `meshConfig` object written by `api-mesh run`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::artifact::{ArtifactError, MeshArtifact};

/// Artifact file name inside a mesh directory.
pub const MESHRC_FILE: &str = ".meshrc.json";

/// Loads the artifact of a mesh by id.
#[async_trait]
pub trait ArtifactLoader: Send + Sync {
    async fn load(&self, mesh_id: &str) -> Result<MeshArtifact, ArtifactError>;
}

/// Reads artifacts from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsArtifactLoader {
    root: PathBuf,
}

impl FsArtifactLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn artifact_path(&self, mesh_id: &str) -> PathBuf {
        self.root.join(mesh_id).join(MESHRC_FILE)
    }
}

#[async_trait]
impl ArtifactLoader for FsArtifactLoader {
    async fn load(&self, mesh_id: &str) -> Result<MeshArtifact, ArtifactError> {
        let path = self.artifact_path(mesh_id);
        let display = path.display().to_string();

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ArtifactError::Io {
                path: display.clone(),
                source,
            })?;

        let config = serde_json::from_str(&content).map_err(|source| ArtifactError::Invalid {
            path: display,
            source,
        })?;

        tracing::debug!(mesh_id = %mesh_id, path = %path.display(), "Loaded mesh artifact");

        Ok(MeshArtifact {
            mesh_id: mesh_id.to_string(),
            config,
        })
    }
}

/// Write `mesh_config` as the artifact of `mesh_id` under `root`.
pub async fn write_artifact(root: &Path, mesh_id: &str, mesh_config: &Value) -> Result<PathBuf, ArtifactError> {
    let dir = root.join(mesh_id);
    let path = dir.join(MESHRC_FILE);
    let io_error = |source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    };

    tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;

    let content = serde_json::to_string_pretty(mesh_config).map_err(|source| ArtifactError::Invalid {
        path: path.display().to_string(),
        source,
    })?;
    tokio::fs::write(&path, content).await.map_err(io_error)?;

    Ok(path)
}
