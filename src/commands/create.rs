use std::path::PathBuf;

use clap::Args;

use crate::commands::{CommandContext, CommandError};
use crate::mesh::{load_mesh, DEFAULT_ENV_FILE};
use crate::service::MeshDetails;

/// Arguments of `api-mesh create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Mesh configuration file
    pub file: PathBuf,

    /// Environment file used for interpolation
    #[arg(short, long, default_value = DEFAULT_ENV_FILE)]
    pub env: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short = 'c', long)]
    pub auto_confirm_action: bool,

    /// Print the created mesh as JSON
    #[arg(long)]
    pub json: bool,
}

/// Create the workspace's mesh. Returns `None` when the user declined.
pub async fn run(context: &CommandContext, args: &CreateArgs) -> Result<Option<MeshDetails>, CommandError> {
    let mesh = load_mesh(&args.file, &args.env)?;

    if !context.confirm("Are you sure you want to create a mesh?", args.auto_confirm_action)? {
        println!("Create cancelled");
        return Ok(None);
    }

    let client = context.client()?;
    let created = client
        .create_mesh(&context.settings.workspace, &mesh.document)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create mesh");
            context.failure(&format!("Unable to create a mesh. {e}."))
        })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    }
    println!(
        "Successfully created mesh {}",
        created.mesh_id.as_deref().unwrap_or_default()
    );
    Ok(Some(created))
}
