//! Errors raised by the mesh validation and interpolation pipeline.
//!
//! Each validator aggregates every violation of its own kind and raises once,
//! so the `Display` text of a variant is the complete user-facing message.

/// Errors that terminate mesh loading.
#[derive(Debug, thiserror::Error)]
pub enum MeshConfigError {
    /// Referenced files resolve outside the mesh directory (or use `~`).
    #[error("File(s): {} is outside the mesh directory.", .0.join(", "))]
    PathOutsideMeshDirectory(Vec<String>),

    /// Referenced files are neither `.js` nor `.json`.
    #[error(
        "Mesh files must be JavaScript or JSON. Other file types are not supported. The following file(s) are invalid: {}.",
        .0.join(",")
    )]
    InvalidFileType(Vec<String>),

    /// Referenced file base names are longer than the limit.
    #[error(
        "Mesh file names must be less than 25 characters. The following file(s) are invalid: {}.",
        .0.join(",")
    )]
    InvalidFileName(Vec<String>),

    /// The environment file has malformed lines or duplicate keys.
    #[error("Issue in {path} file - {message}")]
    EnvFileFormat { path: String, message: String },

    /// Placeholders reference keys absent from the environment file.
    #[error("The mesh file cannot be interpolated due to missing keys : {}", .0.join(" , "))]
    InterpolationMissingKeys(Vec<String>),

    /// The interpolated text is not valid JSON.
    #[error("Interpolated mesh is not a valid JSON. Please check the generated json file.")]
    InterpolatedJsonInvalid(#[source] serde_json::Error),

    #[error("Unable to read the mesh configuration file provided. Please check the file and try again.")]
    MeshFileUnreadable(#[source] std::io::Error),

    #[error("Unable to read the file {path}. Please check the file and try again.")]
    EnvFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input mesh file is not a valid JSON. {0}")]
    InvalidMeshJson(#[source] serde_json::Error),

    #[error("Invalid mesh configuration: {0}")]
    MeshFileSchema(#[source] serde_json::Error),

    #[error("Unable to read the file {file}. Please check the file and try again.")]
    ImportedFileUnreadable {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON content in {0}")]
    ImportedFileInvalidJson(String),
}

/// Result type for mesh pipeline operations.
pub type MeshResult<T> = Result<T, MeshConfigError>;
