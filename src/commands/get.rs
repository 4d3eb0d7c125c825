use clap::Args;

use crate::commands::{CommandContext, CommandError};
use crate::service::MeshDetails;

/// Arguments of `api-mesh get`.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Print the whole mesh record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Fetch and print the workspace's mesh.
pub async fn run(context: &CommandContext, args: &GetArgs) -> Result<MeshDetails, CommandError> {
    let client = context.client()?;
    let mesh_id = context.require_mesh_id(&client, "get mesh").await?;

    let mesh = client
        .get_mesh(&context.settings.workspace, &mesh_id)
        .await
        .map_err(|e| {
            tracing::error!(mesh_id = %mesh_id, error = %e, "Failed to get mesh");
            context.failure(&format!("Unable to get mesh with the ID {mesh_id}. Please check the mesh ID and try again."))
        })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&mesh)?);
    } else {
        let config = mesh.mesh_config.clone().unwrap_or_default();
        println!(
            "Successfully retrieved mesh {}",
            serde_json::to_string_pretty(&config)?
        );
    }
    Ok(mesh)
}
