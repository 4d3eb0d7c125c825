use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::json;

use crate::commands::{CommandContext, CommandError};
use crate::mesh::DEFAULT_ENV_FILE;

/// Starter mesh file written into a new workspace.
pub const STARTER_MESH_FILE: &str = "mesh.json";

/// Arguments of `api-mesh init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project name
    pub project_name: String,

    /// Directory the workspace is created in
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Initiate the workspace as a git project
    #[arg(short, long)]
    pub git: bool,
}

/// Create a mesh workspace. Returns its directory, or `None` when declined.
pub async fn run(context: &CommandContext, args: &InitArgs) -> Result<Option<PathBuf>, CommandError> {
    let base = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()?.join(&args.path)
    };
    let workspace = base.join(&args.project_name);

    let question = format!("Do you want to create the workspace in {}", workspace.display());
    if !context.confirm(&question, false)? {
        return Ok(None);
    }

    println!("Creating workspace in {}", workspace.display());

    if workspace.exists() {
        return Err(CommandError::Failed(
            "Directory already exists. Delete the directory or change the directory".to_string(),
        ));
    }
    tokio::fs::create_dir_all(&workspace).await.map_err(|e| {
        tracing::error!(path = %workspace.display(), error = %e, "Failed to create workspace");
        CommandError::Failed(
            "Workspace couldn't be created at the directory, please verify your permissions".to_string(),
        )
    })?;

    if args.git {
        println!("Initiating git in workspace");
        git_init(&workspace).await?;
    }

    tokio::fs::write(workspace.join(DEFAULT_ENV_FILE), "").await?;
    tokio::fs::write(workspace.join(STARTER_MESH_FILE), starter_mesh(&args.project_name)?).await?;

    println!("workspace setup done successfully");
    Ok(Some(workspace))
}

fn starter_mesh(project_name: &str) -> Result<String, serde_json::Error> {
    let mesh = json!({
        "meshConfig": {
            "sources": [{
                "name": project_name,
                "handler": {
                    "graphql": { "endpoint": "https://example.com/graphql" }
                }
            }],
            "responseConfig": { "includeHTTPDetails": false }
        }
    });
    serde_json::to_string_pretty(&mesh)
}

async fn git_init(workspace: &Path) -> Result<(), CommandError> {
    let output = tokio::process::Command::new("git")
        .arg("init")
        .arg(workspace)
        .output()
        .await?;

    if !output.status.success() {
        return Err(CommandError::Failed(format!(
            "Unable to initiate git in the workspace: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
