//! Payloads exchanged with the mesh management service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET .../meshes` answer for a workspace.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshIdResponse {
    #[serde(default)]
    pub mesh_id: Option<String>,
}

/// A mesh as stored by the service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDetails {
    #[serde(default)]
    pub mesh_id: Option<String>,

    #[serde(default)]
    pub mesh_status: Option<String>,

    /// Build error text when `mesh_status` is `error`.
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub mesh_config: Option<Value>,

    #[serde(default)]
    pub mesh_url: Option<String>,
}

/// Feature flags of an org.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantFeatures {
    /// Meshes of this org are also deployed to the edge.
    #[serde(rename = "showCloudflareURL", default)]
    pub show_edge_mesh_url: bool,
}

/// Latest edge deployment of a mesh.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshDeployment {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// One chunk of bulk logs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PresignedUrl {
    pub key: String,
    pub url: String,
}

/// Presigned URLs covering a log window.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrls {
    #[serde(default)]
    pub presigned_urls: Vec<PresignedUrl>,

    /// Total size of all chunks in bytes.
    #[serde(default)]
    pub total_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presigned_urls_shape() {
        let urls: PresignedUrls = serde_json::from_value(json!({
            "presignedUrls": [{ "key": "logs/1.csv", "url": "https://s3/1" }],
            "totalSize": 2048
        }))
        .unwrap();
        assert_eq!(urls.total_size, 2048);
        assert_eq!(urls.presigned_urls[0].key, "logs/1.csv");
    }

    #[test]
    fn test_tenant_features_flag() {
        let features: TenantFeatures = serde_json::from_value(json!({ "showCloudflareURL": true })).unwrap();
        assert!(features.show_edge_mesh_url);

        let features: TenantFeatures = serde_json::from_value(json!({})).unwrap();
        assert!(!features.show_edge_mesh_url);
    }
}
