use clap::Args;

use crate::commands::{CommandContext, CommandError};

/// Arguments of `api-mesh delete`.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'c', long)]
    pub auto_confirm_action: bool,
}

/// Delete the workspace's mesh. Returns the deleted id, or `None` when declined.
pub async fn run(context: &CommandContext, args: &DeleteArgs) -> Result<Option<String>, CommandError> {
    let client = context.client()?;
    let mesh_id = context.require_mesh_id(&client, "delete").await?;

    if !context.confirm("Are you sure you want to delete the mesh?", args.auto_confirm_action)? {
        println!("Delete cancelled");
        return Ok(None);
    }

    client
        .delete_mesh(&context.settings.workspace, &mesh_id)
        .await
        .map_err(|e| {
            tracing::error!(mesh_id = %mesh_id, error = %e, "Failed to delete mesh");
            context.failure(&format!("Unable to delete mesh {mesh_id}."))
        })?;

    println!("Successfully deleted mesh {mesh_id}");
    Ok(Some(mesh_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context_with_service, ScriptedPrompt};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn router(deleted: Arc<AtomicBool>) -> Router {
        Router::new()
            .route(
                "/organizations/org/projects/proj/workspaces/ws/meshes",
                get(|| async { Json(json!({ "meshId": "m1" })) }),
            )
            .route(
                "/organizations/org/projects/proj/workspaces/ws/meshes/m1",
                axum::routing::delete(move || {
                    let deleted = Arc::clone(&deleted);
                    async move {
                        deleted.store(true, Ordering::SeqCst);
                        StatusCode::NO_CONTENT
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_delete_after_confirmation() {
        let deleted = Arc::new(AtomicBool::new(false));
        let context = context_with_service(router(Arc::clone(&deleted)), ScriptedPrompt::answering(true)).await;

        let id = run(&context, &DeleteArgs { auto_confirm_action: false }).await.unwrap();
        assert_eq!(id.as_deref(), Some("m1"));
        assert!(deleted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_declined_delete() {
        let deleted = Arc::new(AtomicBool::new(false));
        let context = context_with_service(router(Arc::clone(&deleted)), ScriptedPrompt::answering(false)).await;

        assert!(run(&context, &DeleteArgs { auto_confirm_action: false }).await.unwrap().is_none());
        assert!(!deleted.load(Ordering::SeqCst));
    }
}
