//! `api-mesh`: manage API meshes and run them locally.
//!
//! # Architecture Overview
//!
//! ```text
//!   mesh.json + .env
//!         │
//!         ▼
//!   ┌──────────────┐   validate / create / update   ┌───────────────────┐
//!   │ mesh         │───────────────────────────────▶│ service client    │──▶ Mesh service
//!   │ interpolate  │                                │ (retries, auth)   │
//!   │ + validate   │                                └───────────────────┘
//!   └──────┬───────┘
//!          │ run
//!          ▼
//!   ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!   │ artifact     │───▶│ http server  │───▶│ gateway      │──▶ GraphQL source
//!   │ .meshrc.json │    │ headers/CORS │    │ httpDetails  │
//!   └──────────────┘    └──────────────┘    └──────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use api_mesh::commands::create::CreateArgs;
use api_mesh::commands::delete::DeleteArgs;
use api_mesh::commands::get::GetArgs;
use api_mesh::commands::init::InitArgs;
use api_mesh::commands::log_get_bulk::LogGetBulkArgs;
use api_mesh::commands::run::RunArgs;
use api_mesh::commands::status::StatusArgs;
use api_mesh::commands::tenant::TenantArgs;
use api_mesh::commands::update::UpdateArgs;
use api_mesh::commands::validate::ValidateArgs;
use api_mesh::commands::{self, CommandContext, CommandError, StdinPrompt};
use api_mesh::config::load_settings_or_default;
use api_mesh::observability::logging::init_logging;

/// Manage API meshes and run them locally
#[derive(Parser)]
#[command(name = "api-mesh", version, about)]
struct Cli {
    /// Settings file (defaults to api-mesh.toml in the working directory)
    #[arg(long, global = true, env = "API_MESH_CONFIG")]
    config: Option<PathBuf>,

    /// Ignore the cached org, project and workspace selection
    #[arg(short, long, global = true)]
    ignore_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a mesh file and print the finalized configuration
    Validate(ValidateArgs),

    /// Create a mesh in the selected workspace
    Create(CreateArgs),

    /// Update the mesh of the selected workspace
    Update(UpdateArgs),

    /// Get the mesh of the selected workspace
    Get(GetArgs),

    /// Delete the mesh of the selected workspace
    Delete(DeleteArgs),

    /// Get the build status of the mesh
    Status(StatusArgs),

    /// Build a mesh locally and serve it
    Run(RunArgs),

    /// Initiate an API Mesh workspace
    Init(InitArgs),

    /// Download the mesh's logs of a time window
    LogGetBulk(LogGetBulkArgs),

    /// Manage tenants
    Tenant(TenantArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // PORT and friends may come from a local .env
    let _ = dotenvy::dotenv();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<(), CommandError> {
    let settings = load_settings_or_default(cli.config.as_deref())?;

    let level = match &cli.command {
        Command::Run(args) if args.debug => "debug".to_string(),
        _ => settings.observability.log_level.clone(),
    };
    init_logging(&level);

    let request_id = Uuid::new_v4().to_string();
    tracing::info!("RequestId: {}", request_id);
    if cli.ignore_cache {
        tracing::debug!("Workspace selection is read from settings; --ignore-cache has no effect");
    }

    let context = CommandContext::new(settings, request_id, Arc::new(StdinPrompt));

    match cli.command {
        Command::Validate(args) => {
            commands::validate::run(&args).await?;
        }
        Command::Create(args) => {
            commands::create::run(&context, &args).await?;
        }
        Command::Update(args) => {
            commands::update::run(&context, &args).await?;
        }
        Command::Get(args) => {
            commands::get::run(&context, &args).await?;
        }
        Command::Delete(args) => {
            commands::delete::run(&context, &args).await?;
        }
        Command::Status(args) => {
            commands::status::run(&context, &args).await?;
        }
        Command::Run(args) => {
            commands::run::run(&context, &args).await?;
        }
        Command::Init(args) => {
            commands::init::run(&context, &args).await?;
        }
        Command::LogGetBulk(args) => {
            commands::log_get_bulk::run(&context, &args).await?;
        }
        Command::Tenant(args) => {
            commands::tenant::run(&context, &args).await?;
        }
    }

    Ok(())
}
