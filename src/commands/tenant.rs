//! `api-mesh tenant`: tenant configuration management.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde_json::Value;

use crate::commands::{CommandContext, CommandError};

/// Arguments of `api-mesh tenant`.
#[derive(Debug, Args)]
pub struct TenantArgs {
    #[command(subcommand)]
    pub action: TenantAction,
}

#[derive(Debug, Subcommand)]
pub enum TenantAction {
    /// Create a tenant with the given config
    Create {
        /// Tenant configuration file
        file: PathBuf,
    },

    /// Update a tenant with the given config
    Update {
        tenant_id: String,

        /// Tenant configuration file
        file: PathBuf,
    },

    /// Get the config of a given tenant
    Get { mesh_id: String },
}

pub async fn run(context: &CommandContext, args: &TenantArgs) -> Result<Value, CommandError> {
    match &args.action {
        TenantAction::Create { file } => create(context, file).await,
        TenantAction::Update { tenant_id, file } => update(context, tenant_id, file).await,
        TenantAction::Get { mesh_id } => get(context, mesh_id).await,
    }
}

async fn create(context: &CommandContext, file: &Path) -> Result<Value, CommandError> {
    const FAILED: &str = "Unable to create a tenant with the given configuration";

    let tenant = read_tenant(file).await.ok_or_else(|| CommandError::Failed(FAILED.to_string()))?;
    let created = context
        .client()?
        .create_tenant(&tenant)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create tenant");
            CommandError::Failed(FAILED.to_string())
        })?;

    println!("Successfully created a tenant with the id: {}", tenant_id(&tenant));
    Ok(created)
}

async fn update(context: &CommandContext, tenant_id_arg: &str, file: &Path) -> Result<Value, CommandError> {
    let mut tenant = read_tenant(file).await.ok_or_else(|| {
        CommandError::Failed("Unable to update the tenant with the given configuration".to_string())
    })?;
    if let Some(object) = tenant.as_object_mut() {
        object.insert(
            "imsOrgId".to_string(),
            Value::String(context.settings.workspace.org_code.clone()),
        );
    }

    let updated = context
        .client()?
        .update_tenant(tenant_id_arg, &tenant)
        .await
        .map_err(|e| {
            tracing::error!(tenant_id = %tenant_id_arg, error = %e, "Failed to update tenant");
            CommandError::Failed(format!("Unable to update the tenant with the id: {}", tenant_id(&tenant)))
        })?;

    println!("Successfully updated the tenant with the id: {}", tenant_id(&tenant));
    Ok(updated)
}

async fn get(context: &CommandContext, mesh_id: &str) -> Result<Value, CommandError> {
    let workspace = &context.settings.workspace;
    let not_found = || CommandError::Failed(format!("Unable to retrieve the tenant config for {mesh_id}"));

    let tenant = context
        .client()?
        .get_tenant(&workspace.org_code, &workspace.project_id, &workspace.workspace_id, mesh_id)
        .await
        .map_err(|e| {
            tracing::error!(mesh_id = %mesh_id, error = %e, "Failed to get tenant");
            not_found()
        })?
        .ok_or_else(not_found)?;

    println!("{tenant}");
    Ok(tenant)
}

/// The tenant JSON, or `None` when the file is unreadable or not JSON.
async fn read_tenant(file: &Path) -> Option<Value> {
    let content = tokio::fs::read_to_string(file)
        .await
        .inspect_err(|e| tracing::error!(file = %file.display(), error = %e, "Unable to read tenant file"))
        .ok()?;
    serde_json::from_str(&content)
        .inspect_err(|e| tracing::error!(file = %file.display(), error = %e, "Tenant file is not valid JSON"))
        .ok()
}

fn tenant_id(tenant: &Value) -> String {
    match &tenant["tenantId"] {
        Value::String(id) => id.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
