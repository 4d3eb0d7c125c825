//! CLI settings schema.
//!
//! Settings are read from a TOML file. Every section has defaults so that an
//! empty (or missing) file still yields a usable configuration.

use serde::{Deserialize, Serialize};

/// Root settings for the `api-mesh` tools.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Remote mesh management service.
    pub service: ServiceConfig,

    /// Retry policy for idempotent service calls.
    pub retries: RetryConfig,

    /// Org / project / workspace the commands operate on.
    pub workspace: WorkspaceConfig,

    /// Local gateway server.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote mesh management service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the management API.
    pub base_url: String,

    /// API key sent as `x-api-key`.
    pub api_key: String,

    /// Bearer token. `MESH_ACCESS_TOKEN` takes precedence when set.
    pub access_token: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.adobe.io/api-admin".to_string(),
            api_key: String::new(),
            access_token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

/// Workspace selection.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub org_id: String,
    pub org_code: String,
    pub project_id: String,
    pub workspace_id: String,
    pub workspace_name: String,
}

/// Local gateway server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Port used when neither `--port` nor `PORT` is given.
    pub port: u16,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Directory holding built mesh artifacts (`<root>/<meshId>/.meshrc.json`).
    pub artifact_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 30,
            artifact_root: "mesh-artifact".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
