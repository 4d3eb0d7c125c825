//! `mesh-server <meshId> <port>`: serve a built mesh artifact.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use api_mesh::artifact::FsArtifactLoader;
use api_mesh::config::load_settings_or_default;
use api_mesh::http::TenantContext;
use api_mesh::lifecycle::{listen_for_shutdown, start_server, Shutdown};
use api_mesh::observability::logging::init_logging;

/// Serve a built API mesh
#[derive(Parser)]
#[command(name = "mesh-server", version, about)]
struct Cli {
    /// Id of the mesh to serve
    mesh_id: String,

    /// Port to listen on
    port: u16,

    /// Settings file (defaults to api-mesh.toml in the working directory)
    #[arg(long, env = "API_MESH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let settings = match load_settings_or_default(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.observability.log_level);

    tracing::info!(mesh_id = %cli.mesh_id, port = cli.port, "mesh-server starting");

    let shutdown = Shutdown::new();
    tokio::spawn(listen_for_shutdown(shutdown.clone()));

    let loader = FsArtifactLoader::new(&settings.server.artifact_root);
    let result = start_server(
        &loader,
        &cli.mesh_id,
        cli.port,
        &settings.server,
        &settings.observability,
        TenantContext::from_env(),
        shutdown,
    )
    .await;

    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "mesh-server failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
