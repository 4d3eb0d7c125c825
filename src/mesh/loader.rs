//! Mesh file loading.
//!
//! # Responsibilities
//! - Read the mesh file and, when it contains env placeholders, validate the
//!   environment file and interpolate it into the mesh text
//! - Parse the result into a typed [`MeshDocument`]
//! - Validate the referenced local files and import their content into
//!   `meshConfig.files`
//!
//! Every stage fails with a single [`MeshConfigError`]; nothing after the
//! failing stage runs.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::mesh::env_file::validate_env_file_format;
use crate::mesh::error::{MeshConfigError, MeshResult};
use crate::mesh::interpolation::{check_placeholders, env_data, interpolate_mesh, InterpolationResult};
use crate::mesh::references::get_files_in_mesh_config;
use crate::mesh::schema::{MeshConfig, MeshDocument};

/// Default environment file used for interpolation.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// A fully validated mesh, ready to be sent to the service or served.
#[derive(Debug, Clone)]
pub struct LoadedMesh {
    /// The complete document, `{ "meshConfig": { ... } }`, with imported files.
    pub document: Value,

    /// Typed view of `document.meshConfig`.
    pub config: MeshConfig,

    /// Local files imported into `meshConfig.files`.
    pub files: Vec<String>,
}

impl LoadedMesh {
    /// The `meshConfig` object of the document.
    pub fn mesh_config(&self) -> &Value {
        &self.document["meshConfig"]
    }
}

/// Read the mesh configuration file as text.
pub fn read_mesh_file(mesh_path: &Path) -> MeshResult<String> {
    fs::read_to_string(mesh_path).map_err(MeshConfigError::MeshFileUnreadable)
}

/// Validate the environment file at `env_path`, interpolate it into
/// `mesh_text` and parse the result as JSON.
pub fn validate_and_interpolate_mesh(mesh_text: &str, env_path: &Path) -> MeshResult<Value> {
    let display_path = env_path.display().to_string();

    let env_content = fs::read_to_string(env_path).map_err(|source| MeshConfigError::EnvFileUnreadable {
        path: display_path.clone(),
        source,
    })?;

    let report = validate_env_file_format(&env_content);
    if let Some(message) = report.error() {
        let err = MeshConfigError::EnvFileFormat {
            path: display_path,
            message,
        };
        tracing::error!("{}", err);
        return Err(err);
    }

    match interpolate_mesh(mesh_text, &env_data(&report.values())) {
        InterpolationResult::Success { interpolated } => assemble(&interpolated),
        InterpolationResult::Failed { missing_keys } => {
            let err = MeshConfigError::InterpolationMissingKeys(missing_keys);
            tracing::error!("{}", err);
            Err(err)
        }
    }
}

/// Load the mesh at `mesh_path`, interpolating `env_path` when needed.
pub fn load_mesh(mesh_path: &Path, env_path: &Path) -> MeshResult<LoadedMesh> {
    let text = read_mesh_file(mesh_path)?;

    let mut document = if check_placeholders(&text) {
        tracing::debug!(env_file = %env_path.display(), "Interpolating mesh file");
        validate_and_interpolate_mesh(&text, env_path)?
    } else {
        serde_json::from_str(&text).map_err(MeshConfigError::InvalidMeshJson)?
    };

    let config = parse_document(&document)?.mesh_config;
    let files = get_files_in_mesh_config(&config, mesh_path)?;

    if !files.is_empty() {
        let mesh_dir = mesh_path.parent().unwrap_or(Path::new(""));
        import_files(&mut document, &files, mesh_dir)?;
    }

    Ok(LoadedMesh {
        document,
        config,
        files,
    })
}

/// Parse interpolated mesh text.
fn assemble(interpolated: &str) -> MeshResult<Value> {
    serde_json::from_str(interpolated).map_err(|e| {
        tracing::error!("{}", e);
        tracing::error!("{}", interpolated);
        MeshConfigError::InterpolatedJsonInvalid(e)
    })
}

/// Append `{ path, content }` for each file to `meshConfig.files`, replacing
/// entries that already carry the same path.
fn import_files(document: &mut Value, files: &[String], mesh_dir: &Path) -> MeshResult<()> {
    let mut imported = Vec::with_capacity(files.len());

    for file in files {
        let content = fs::read_to_string(mesh_dir.join(file)).map_err(|source| {
            MeshConfigError::ImportedFileUnreadable {
                file: file.clone(),
                source,
            }
        })?;

        if file.ends_with(".json") && serde_json::from_str::<Value>(&content).is_err() {
            return Err(MeshConfigError::ImportedFileInvalidJson(file.clone()));
        }

        imported.push(json!({ "path": file, "content": content }));
    }

    let Some(mesh_config) = document.get_mut("meshConfig").and_then(Value::as_object_mut) else {
        return Ok(());
    };

    let mut entries: Vec<Value> = match mesh_config.remove("files") {
        Some(Value::Array(existing)) => existing
            .into_iter()
            .filter(|entry| !files.iter().any(|f| entry["path"] == f.as_str()))
            .collect(),
        _ => Vec::new(),
    };
    entries.extend(imported);
    mesh_config.insert("files".to_string(), Value::Array(entries));

    Ok(())
}

fn parse_document(document: &Value) -> MeshResult<MeshDocument> {
    MeshDocument::deserialize(document).map_err(MeshConfigError::MeshFileSchema)
}
