//! Settings loading from disk.

use std::fs;
use std::io;
use std::path::Path;

use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, ValidationError};

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "api-mesh.toml";

/// Environment variable overriding `service.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "MESH_ACCESS_TOKEN";

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Load settings, falling back to defaults when `path` is `None` and the
/// default file does not exist. An explicitly requested file must exist.
pub fn load_settings_or_default(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = match path {
        Some(path) => load_settings(path)?,
        None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
            load_settings(Path::new(DEFAULT_SETTINGS_FILE))?
        }
        None => {
            tracing::debug!("No settings file found, using defaults");
            Settings::default()
        }
    };

    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        if !token.is_empty() {
            settings.service.access_token = token;
        }
    }

    Ok(settings)
}

fn parse_settings(content: &str) -> Result<Settings, SettingsError> {
    let settings: Settings = toml::from_str(content)?;
    validate_settings(&settings).map_err(SettingsError::Validation)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            [service]
            base_url = "http://localhost:4000"

            [workspace]
            org_id = "org-1"
            "#
        )
        .unwrap();

        let settings = load_settings(tmp.path()).unwrap();
        assert_eq!(settings.service.base_url, "http://localhost:4000");
        assert_eq!(settings.workspace.org_id, "org-1");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_settings("[service\nbase_url = 1").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_settings("[server]\nport = 0\nrequest_timeout_secs = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: server.port: must not be 0, server.request_timeout_secs: must be greater than 0"
        );
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings_or_default(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
