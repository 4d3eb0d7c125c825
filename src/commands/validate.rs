use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use crate::commands::CommandError;
use crate::mesh::{load_mesh, DEFAULT_ENV_FILE};

/// Arguments of `api-mesh validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Mesh configuration file
    pub file: PathBuf,

    /// Environment file used for interpolation
    #[arg(short, long, default_value = DEFAULT_ENV_FILE)]
    pub env: PathBuf,
}

/// Validate the mesh file locally and print the finalized document.
pub async fn run(args: &ValidateArgs) -> Result<Value, CommandError> {
    let mesh = load_mesh(&args.file, &args.env)?;

    tracing::info!(file = %args.file.display(), files = mesh.files.len(), "Mesh file is valid");
    println!("{}", serde_json::to_string_pretty(&mesh.document)?);
    Ok(mesh.document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[tokio::test]
    async fn test_validate_interpolates_and_imports() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "ENDPOINT=https://example.com/graphql\n").unwrap();
        fs::write(dir.path().join("schema.json"), r#"{"type":"object"}"#).unwrap();
        fs::write(
            dir.path().join("mesh.json"),
            r#"{
                "meshConfig": {
                    "sources": [{
                        "name": "api",
                        "handler": {
                            "graphql": { "endpoint": "{{env.ENDPOINT}}" },
                            "JsonSchema": { "operations": [{ "responseSchema": "./schema.json" }] }
                        }
                    }]
                }
            }"#,
        )
        .unwrap();

        let args = ValidateArgs {
            file: dir.path().join("mesh.json"),
            env: dir.path().join(".env"),
        };
        let document = run(&args).await.unwrap();

        assert_eq!(
            document["meshConfig"]["sources"][0]["handler"]["graphql"]["endpoint"],
            "https://example.com/graphql"
        );
        assert_eq!(
            document["meshConfig"]["files"],
            json!([{ "path": "./schema.json", "content": r#"{"type":"object"}"# }])
        );
    }

    #[tokio::test]
    async fn test_validate_reports_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "OTHER=1\n").unwrap();
        fs::write(
            dir.path().join("mesh.json"),
            r#"{"meshConfig":{"sources":[{"name":"a","handler":{"graphql":{"endpoint":"{{env.ENDPOINT}}"}}}]}}"#,
        )
        .unwrap();

        let args = ValidateArgs {
            file: dir.path().join("mesh.json"),
            env: dir.path().join(".env"),
        };
        let err = run(&args).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "The mesh file cannot be interpolated due to missing keys : ENDPOINT"
        );
    }
}
