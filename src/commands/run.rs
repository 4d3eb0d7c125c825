//! `api-mesh run`: build the mesh locally and serve it.
//!
//! The finalized `meshConfig` is written as the artifact of a mesh named
//! after the mesh file, then the gateway server loads it through the same
//! artifact loader `mesh-server` uses.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::artifact::{write_artifact, FsArtifactLoader};
use crate::commands::{CommandContext, CommandError};
use crate::http::TenantContext;
use crate::lifecycle::{listen_for_shutdown, start_server, Shutdown};
use crate::mesh::{load_mesh, DEFAULT_ENV_FILE};

/// Environment variable consulted when `--port` is absent.
pub const PORT_ENV: &str = "PORT";

/// Arguments of `api-mesh run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Mesh configuration file
    pub file: PathBuf,

    /// Port of the local server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Environment file used for interpolation
    #[arg(short, long, default_value = DEFAULT_ENV_FILE)]
    pub env: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// A mesh built for local serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRun {
    pub mesh_id: String,
    pub port: u16,
    pub artifact_path: PathBuf,
}

/// Build the mesh and serve it until Ctrl+C. `API_MESH_TIER` and
/// `tenantUUID` from the environment are handed to the server.
pub async fn run(context: &CommandContext, args: &RunArgs) -> Result<(), CommandError> {
    let port_env = std::env::var(PORT_ENV).ok();
    let prepared = prepare(context, args, port_env.as_deref()).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(listen_for_shutdown(shutdown.clone()));

    let settings = &context.settings;
    let loader = FsArtifactLoader::new(&settings.server.artifact_root);
    start_server(
        &loader,
        &prepared.mesh_id,
        prepared.port,
        &settings.server,
        &settings.observability,
        TenantContext::from_env(),
        shutdown,
    )
    .await?;
    Ok(())
}

/// Validate the mesh, write its artifact and pick the port.
pub async fn prepare(
    context: &CommandContext,
    args: &RunArgs,
    port_env: Option<&str>,
) -> Result<PreparedRun, CommandError> {
    let port = resolve_port(args.port, port_env, context.settings.server.port)?;
    let mesh_id = mesh_id_for(&args.file)?;
    let mesh = load_mesh(&args.file, &args.env)?;

    let root = Path::new(&context.settings.server.artifact_root);
    let artifact_path = write_artifact(root, &mesh_id, mesh.mesh_config()).await?;
    tracing::info!(
        mesh_id = %mesh_id,
        artifact = %artifact_path.display(),
        files = mesh.files.len(),
        "Mesh artifact written"
    );

    Ok(PreparedRun {
        mesh_id,
        port,
        artifact_path,
    })
}

/// `--port`, then `PORT`, then the configured port.
pub fn resolve_port(flag: Option<u16>, env: Option<&str>, configured: u16) -> Result<u16, CommandError> {
    if let Some(port) = flag {
        return Ok(port);
    }
    match env.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|_| CommandError::Failed(format!("Invalid {PORT_ENV} value: {value}"))),
        None => Ok(configured),
    }
}

fn mesh_id_for(file: &Path) -> Result<String, CommandError> {
    file.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CommandError::Failed("Missing file path. Run api-mesh run --help for more info.".to_string()))
}
