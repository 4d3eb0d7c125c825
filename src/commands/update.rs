use std::path::PathBuf;

use clap::Args;

use crate::commands::{CommandContext, CommandError};
use crate::mesh::{load_mesh, DEFAULT_ENV_FILE};

/// Arguments of `api-mesh update`.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Mesh configuration file
    pub file: PathBuf,

    /// Environment file used for interpolation
    #[arg(short, long, default_value = DEFAULT_ENV_FILE)]
    pub env: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short = 'c', long)]
    pub auto_confirm_action: bool,
}

/// Replace the workspace's mesh. Returns the mesh id, or `None` when declined.
pub async fn run(context: &CommandContext, args: &UpdateArgs) -> Result<Option<String>, CommandError> {
    let mesh = load_mesh(&args.file, &args.env)?;

    let client = context.client()?;
    let mesh_id = context.require_mesh_id(&client, "update").await?;

    if !context.confirm("Are you sure you want to update the mesh?", args.auto_confirm_action)? {
        println!("Update cancelled");
        return Ok(None);
    }

    client
        .update_mesh(&context.settings.workspace, &mesh_id, &mesh.document)
        .await
        .map_err(|e| {
            tracing::error!(mesh_id = %mesh_id, error = %e, "Failed to update mesh");
            context.failure(&format!("Unable to update the mesh. {e}."))
        })?;

    println!("Successfully updated the mesh with the id: {mesh_id}");
    Ok(Some(mesh_id))
}
