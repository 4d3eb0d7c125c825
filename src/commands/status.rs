//! `api-mesh status`: build status of the workspace's mesh.
//!
//! Orgs with the edge-mesh feature have two deployments per mesh: the
//! legacy mesh (reported from the mesh record) and the edge mesh (reported
//! from the latest deployment). Both are printed inside one banner.

use clap::Args;

use crate::commands::{CommandContext, CommandError};
use crate::service::{MeshDeployment, MeshDetails};

const BANNER: &str =
    "******************************************************************************************************";

const STATUS_UNAVAILABLE: &str = "Mesh status is not available";

/// Arguments of `api-mesh status`.
#[derive(Debug, Args)]
pub struct StatusArgs {}

/// Print the status of the workspace's mesh.
pub async fn run(context: &CommandContext, _args: &StatusArgs) -> Result<Vec<String>, CommandError> {
    let client = context.client()?;
    let workspace = &context.settings.workspace;

    let mesh_id = client.get_mesh_id(workspace).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to get mesh id");
        context.failure("Unable to get mesh ID. Please check the details and try again.")
    })?;

    let Some(mesh_id) = mesh_id else {
        return Err(CommandError::Failed(format!(
            "Unable to get mesh status. No mesh found for {}. Please check the details and try again.",
            context.workspace_label()
        )));
    };

    let status_failure = |e: crate::service::ServiceError| {
        tracing::error!(error = %e, "Failed to get mesh status");
        context.failure("Unable to get the mesh status. If the error persists please contact support.")
    };

    let features = client
        .get_tenant_features(&workspace.org_code)
        .await
        .map_err(status_failure)?;
    let mesh = client.get_mesh(workspace, &mesh_id).await.map_err(status_failure)?;

    let deployment = if features.show_edge_mesh_url && mesh.mesh_status.as_deref() != Some("error") {
        Some(
            client
                .get_mesh_deployments(workspace, &mesh_id)
                .await
                .map_err(status_failure)?,
        )
    } else {
        None
    };

    let lines = status_lines(&mesh, features.show_edge_mesh_url, deployment.as_ref());
    for line in &lines {
        println!("{line}");
    }
    Ok(lines)
}

/// The status banner. `deployment` is only consulted for edge-enabled orgs
/// whose mesh did not fail.
pub fn status_lines(mesh: &MeshDetails, edge_enabled: bool, deployment: Option<&MeshDeployment>) -> Vec<String> {
    let label = if edge_enabled { "Legacy Mesh:" } else { "Your mesh" };
    let error = mesh.error.clone().unwrap_or_default();
    let mut lines = vec![BANNER.to_string()];

    match mesh.mesh_status.as_deref() {
        Some("success") => lines.push(format!("{label} has been successfully built.")),
        Some("pending") => lines.push(format!("{label} is awaiting processing.")),
        Some("building") => lines.push(format!(
            "{label} is currently being provisioned. Please wait a few minutes before checking again."
        )),
        Some("error") => {
            if edge_enabled {
                lines.push(format!("{label} build has errors."));
            } else {
                lines.push(format!("{label} errored out with the following error."));
            }
            lines.push(error.clone());
        }
        _ => {}
    }

    if edge_enabled {
        if mesh.mesh_status.as_deref() == Some("error") {
            lines.push("Edge Mesh: build has errors.".to_string());
            lines.push(error);
        } else {
            lines.extend(edge_lines(deployment));
        }
    }

    lines.push(BANNER.to_string());
    lines
}

fn edge_lines(deployment: Option<&MeshDeployment>) -> Vec<String> {
    let status = deployment
        .and_then(|d| d.status.as_deref())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let error = deployment.and_then(|d| d.error.clone()).unwrap_or_default();

    match status.as_str() {
        "success" => vec!["Edge Mesh: has been successfully built.".to_string()],
        "provisioning" => vec![
            "Edge Mesh: is currently being provisioned. Please wait a few minutes before checking again.".to_string(),
        ],
        "de-provisioning" => vec![
            "Edge Mesh: is currently being de-provisioned. Please wait a few minutes before checking again."
                .to_string(),
        ],
        "error" if error.contains(STATUS_UNAVAILABLE) => vec![format!("Edge Mesh: {error}")],
        "error" => vec!["Edge Mesh: build has errors.".to_string(), error],
        _ => vec![format!(
            "Edge Mesh: {STATUS_UNAVAILABLE}. Please wait for a while and try again."
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context_with_service, ScriptedPrompt};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    fn mesh(status: &str, error: Option<&str>) -> MeshDetails {
        MeshDetails {
            mesh_status: Some(status.to_string()),
            error: error.map(str::to_string),
            ..MeshDetails::default()
        }
    }

    fn deployment(status: &str, error: Option<&str>) -> MeshDeployment {
        MeshDeployment {
            status: Some(status.to_string()),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_plain_statuses() {
        let lines = status_lines(&mesh("success", None), false, None);
        assert_eq!(lines, vec![BANNER, "Your mesh has been successfully built.", BANNER]);

        let lines = status_lines(&mesh("pending", None), false, None);
        assert_eq!(lines[1], "Your mesh is awaiting processing.");

        let lines = status_lines(&mesh("building", None), false, None);
        assert_eq!(
            lines[1],
            "Your mesh is currently being provisioned. Please wait a few minutes before checking again."
        );
    }

    #[test]
    fn test_error_status() {
        let lines = status_lines(&mesh("error", Some("Source unreachable")), false, None);
        assert_eq!(
            lines,
            vec![
                BANNER,
                "Your mesh errored out with the following error.",
                "Source unreachable",
                BANNER
            ]
        );

        let lines = status_lines(&mesh("error", Some("Source unreachable")), true, None);
        assert_eq!(
            lines,
            vec![
                BANNER,
                "Legacy Mesh: build has errors.",
                "Source unreachable",
                "Edge Mesh: build has errors.",
                "Source unreachable",
                BANNER
            ]
        );
    }

    #[test]
    fn test_edge_statuses() {
        let ok = mesh("success", None);

        let lines = status_lines(&ok, true, Some(&deployment("SUCCESS", None)));
        assert_eq!(lines[1], "Legacy Mesh: has been successfully built.");
        assert_eq!(lines[2], "Edge Mesh: has been successfully built.");

        let lines = status_lines(&ok, true, Some(&deployment("de-provisioning", None)));
        assert!(lines[2].starts_with("Edge Mesh: is currently being de-provisioned."));

        let lines = status_lines(&ok, true, Some(&deployment("error", Some("Mesh status is not available yet"))));
        assert_eq!(lines[2], "Edge Mesh: Mesh status is not available yet");

        let lines = status_lines(&ok, true, Some(&deployment("error", Some("Worker failed"))));
        assert_eq!(&lines[2..4], &["Edge Mesh: build has errors.", "Worker failed"]);

        let lines = status_lines(&ok, true, None);
        assert_eq!(
            lines[2],
            "Edge Mesh: Mesh status is not available. Please wait for a while and try again."
        );
    }

    #[tokio::test]
    async fn test_status_without_mesh() {
        let router = Router::new().route(
            "/organizations/org/projects/proj/workspaces/ws/meshes",
            get(|| async { Json(json!({})) }),
        );
        let context = context_with_service(router, ScriptedPrompt::answering(true)).await;

        let err = run(&context, &StatusArgs {}).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to get mesh status. No mesh found for Org(org) -> Project(proj) -> Workspace(ws). \
             Please check the details and try again."
        );
    }

    #[tokio::test]
    async fn test_status_fetches_deployment_for_edge_orgs() {
        let router = Router::new()
            .route(
                "/organizations/org/projects/proj/workspaces/ws/meshes",
                get(|| async { Json(json!({ "meshId": "m1" })) }),
            )
            .route(
                "/organizations/{org_code}/features",
                get(|| async { Json(json!({ "showCloudflareURL": true })) }),
            )
            .route(
                "/organizations/org/projects/proj/workspaces/ws/meshes/m1",
                get(|| async { Json(json!({ "meshId": "m1", "meshStatus": "success" })) }),
            )
            .route(
                "/organizations/{org_code}/projects/proj/workspaces/ws/meshes/m1/deployments/latest",
                get(|Path(org_code): Path<String>| async move {
                    if org_code == "ORG@AdobeOrg" {
                        Json(json!({ "status": "provisioning" })).into_response()
                    } else {
                        StatusCode::NOT_FOUND.into_response()
                    }
                }),
            );
        let context = context_with_service(router, ScriptedPrompt::answering(true)).await;

        let lines = run(&context, &StatusArgs {}).await.unwrap();
        assert_eq!(lines[1], "Legacy Mesh: has been successfully built.");
        assert!(lines[2].starts_with("Edge Mesh: is currently being provisioned."));
    }

    #[tokio::test]
    async fn test_status_service_failure() {
        let router = Router::new()
            .route(
                "/organizations/org/projects/proj/workspaces/ws/meshes",
                get(|| async { Json(json!({ "meshId": "m1" })) }),
            )
            .route(
                "/organizations/{org_code}/features",
                get(|| async { (StatusCode::UNAUTHORIZED, "expired token") }),
            );
        let context = context_with_service(router, ScriptedPrompt::answering(true)).await;

        let err = run(&context, &StatusArgs {}).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to get the mesh status. If the error persists please contact support. RequestId: req-1"
        );
    }
}
