//! Settings subsystem for the CLI and the gateway server.
//!
//! # Data Flow
//! ```text
//! api-mesh.toml (or --config)
//!     → loader.rs (read & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Mesh configuration documents are handled by `crate::mesh`, not here

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, load_settings_or_default, SettingsError};
pub use schema::{
    ObservabilityConfig, RetryConfig, ServerConfig, ServiceConfig, Settings, WorkspaceConfig,
};
