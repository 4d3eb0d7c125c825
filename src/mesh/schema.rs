//! Typed view of a mesh configuration document.
//!
//! Only the parts the CLI and the gateway server inspect are modelled. Every
//! other key is ignored on deserialization; the raw `serde_json::Value` is
//! kept alongside by callers that need to forward the full document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level mesh file: `{ "meshConfig": { ... } }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDocument {
    pub mesh_config: MeshConfig,
}

/// The user-authored mesh configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshConfig {
    pub sources: Vec<Source>,

    /// Mesh-level transforms.
    #[serde(default)]
    pub transforms: Vec<Transform>,

    #[serde(default)]
    pub plugins: Vec<Plugin>,

    #[serde(default)]
    pub additional_resolvers: Vec<Reference>,

    #[serde(default)]
    pub response_config: Option<ResponseConfig>,
}

/// A GraphQL source composed into the mesh.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default)]
    pub name: String,

    pub handler: Handler,

    /// Source-level transforms.
    #[serde(default)]
    pub transforms: Vec<Transform>,
}

/// Source handler. At most one of the known handlers is normally set; other
/// handler kinds deserialize to a `Handler` with every field `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Handler {
    #[serde(rename = "JsonSchema")]
    pub json_schema: Option<JsonSchemaHandler>,

    pub openapi: Option<OpenApiHandler>,

    pub graphql: Option<GraphqlHandler>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonSchemaHandler {
    #[serde(default)]
    pub operations: Vec<JsonSchemaOperation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchemaOperation {
    pub request_schema: Option<Reference>,
    pub response_schema: Option<Reference>,
    pub request_sample: Option<Reference>,
    pub response_sample: Option<Reference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenApiHandler {
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlHandler {
    pub endpoint: String,

    #[serde(default)]
    pub operation_headers: BTreeMap<String, String>,
}

/// A value that is either a file path or an inline object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Path(String),
    Inline(Value),
}

impl Reference {
    /// The path, if this reference is a plain string.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Reference::Path(path) => Some(path),
            Reference::Inline(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub replace_field: Option<ReplaceFieldTransform>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaceFieldTransform {
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Replacement {
    /// `<file>#<export>`.
    pub composer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub hooks: Option<Hooks>,

    pub on_fetch: Option<Vec<OnFetch>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hooks {
    pub before_all: Option<HookComposer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookComposer {
    pub composer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnFetch {
    pub source: Option<String>,
    pub handler: Option<String>,
}

/// Response behaviour of the gateway, owned by the mesh author.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResponseConfig {
    #[serde(rename = "CORS", default)]
    pub cors: Option<CorsConfig>,

    /// Keep `extensions.httpDetails` in responses.
    #[serde(rename = "includeHTTPDetails", default)]
    pub include_http_details: bool,

    /// Static headers added to every gateway response.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsConfig {
    pub origin: Option<CorsOrigin>,

    #[serde(default)]
    pub methods: Vec<String>,

    #[serde(default)]
    pub allowed_headers: Vec<String>,

    #[serde(default)]
    pub exposed_headers: Vec<String>,

    #[serde(default)]
    pub credentials: bool,

    pub max_age: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    One(String),
    Many(Vec<String>),
}
