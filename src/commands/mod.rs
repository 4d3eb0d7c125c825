//! `api-mesh` commands.
//!
//! # Responsibilities
//! - One module per command; each exposes its `clap::Args` and an async `run`
//! - Local commands (`validate`, `run`, `init`) never call the service
//! - Remote commands share a [`CommandContext`] carrying settings, the
//!   invocation's request id and the confirmation prompt
//!
//! # Design Decisions
//! - Commands print user-facing output themselves and return
//!   [`CommandError`] on failure; `main` prints the error and exits with 1
//! - Service failures are logged with their cause and surfaced to the user
//!   as a short message ending with the request id

pub mod create;
pub mod delete;
pub mod get;
pub mod init;
pub mod log_get_bulk;
pub mod prompt;
pub mod run;
pub mod status;
pub mod tenant;
pub mod update;
pub mod validate;

use std::sync::Arc;

use crate::artifact::ArtifactError;
use crate::config::{Settings, SettingsError};
use crate::lifecycle::StartupError;
use crate::logs::LogDownloadError;
use crate::mesh::MeshConfigError;
use crate::service::{MeshServiceClient, ServiceError};

pub use prompt::{AutoConfirm, Prompt, StdinPrompt};

/// Errors surfaced by a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Mesh(#[from] MeshConfigError),

    #[error(transparent)]
    Logs(#[from] LogDownloadError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// A complete user-facing message.
    #[error("{0}")]
    Failed(String),
}

/// State shared by the commands of one invocation.
pub struct CommandContext {
    pub settings: Settings,
    pub request_id: String,
    pub prompt: Arc<dyn Prompt>,
}

impl CommandContext {
    pub fn new(settings: Settings, request_id: impl Into<String>, prompt: Arc<dyn Prompt>) -> Self {
        Self {
            settings,
            request_id: request_id.into(),
            prompt,
        }
    }

    /// Client for the mesh management service.
    pub fn client(&self) -> Result<MeshServiceClient, CommandError> {
        Ok(MeshServiceClient::new(
            &self.settings.service,
            self.settings.retries.clone(),
            &self.request_id,
        )?)
    }

    /// `message` followed by the request id.
    pub fn failure(&self, message: &str) -> CommandError {
        CommandError::Failed(format!("{} RequestId: {}", message, self.request_id))
    }

    /// Ask the user to confirm unless `auto_confirm` is set.
    pub fn confirm(&self, message: &str, auto_confirm: bool) -> Result<bool, CommandError> {
        if auto_confirm {
            return Ok(true);
        }
        Ok(self.prompt.confirm(message)?)
    }

    /// `Org(<org>) -> Project(<project>) -> Workspace(<workspace>)`.
    pub fn workspace_label(&self) -> String {
        let workspace = &self.settings.workspace;
        format!(
            "Org({}) -> Project({}) -> Workspace({})",
            workspace.org_id, workspace.project_id, workspace.workspace_id
        )
    }

    /// Id of the workspace's mesh. `action` completes the error messages
    /// ("Unable to <action>. No mesh found for ...").
    pub async fn require_mesh_id(&self, client: &MeshServiceClient, action: &str) -> Result<String, CommandError> {
        let mesh_id = client
            .get_mesh_id(&self.settings.workspace)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to get mesh id");
                self.failure("Unable to get mesh ID. Please check the details and try again.")
            })?;

        mesh_id.ok_or_else(|| {
            CommandError::Failed(format!(
                "Unable to {}. No mesh found for {}. Please check the details and try again.",
                action,
                self.workspace_label()
            ))
        })
    }
}
