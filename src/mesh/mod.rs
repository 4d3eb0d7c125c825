//! Mesh configuration validation and interpolation.
//!
//! # Data Flow
//! ```text
//! mesh file text + env file path
//!     → interpolation.rs (placeholder pre-check)
//!     → env_file.rs (validate the env file format)
//!     → interpolation.rs (substitute {{env.KEY}} / {env.KEY})
//!     → loader.rs (parse JSON, typed MeshDocument)
//!     → references.rs (collect local file references)
//!     → validation.rs (path containment, file type, file name)
//!     → loader.rs (import files into meshConfig.files)
//! ```
//!
//! # Design Decisions
//! - Every validator aggregates all violations of its kind, then fails once
//! - The first failing stage stops the pipeline
//! - Placeholders and env values are matched by small hand-written parsers
//!   with documented grammars

pub mod env_file;
pub mod error;
pub mod interpolation;
pub mod loader;
pub mod references;
pub mod schema;
pub mod validation;

pub use error::{MeshConfigError, MeshResult};
pub use interpolation::{check_placeholders, interpolate_mesh, InterpolationResult};
pub use loader::{load_mesh, validate_and_interpolate_mesh, LoadedMesh, DEFAULT_ENV_FILE};
pub use schema::{MeshConfig, MeshDocument, ResponseConfig};
