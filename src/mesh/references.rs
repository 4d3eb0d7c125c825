//! Local file references inside a mesh configuration.
//!
//! Sources, transforms, plugins and additional resolvers may point at files
//! next to the mesh file. Those files are shipped with the mesh, so they are
//! collected here and handed to the validators in `mesh::validation`.

use std::path::Path;

use crate::mesh::error::MeshResult;
use crate::mesh::schema::{MeshConfig, Reference, Transform};
use crate::mesh::validation::{check_files_are_under_mesh_directory, validate_file_name, validate_file_type};

/// Whether a reference points at a remote resource rather than a local file.
///
/// Deliberately loose: anything starting with `http`, or containing `s://`
/// (`https://`, `s3://`, ...), is treated as remote.
pub fn is_remote_reference(reference: &str) -> bool {
    reference.starts_with("http") || reference.contains("s://")
}

/// Strip the `#export` suffix from a composer reference.
fn composer_file(composer: &str) -> &str {
    composer.split('#').next().unwrap_or(composer)
}

/// Collect every local file referenced by the mesh configuration.
///
/// The result is deduplicated and keeps first-seen order. `onFetch` handlers
/// are collected without the remote check.
pub fn extract_file_references(config: &MeshConfig) -> Vec<String> {
    let mut files = FileSet::default();

    for source in &config.sources {
        if let Some(json_schema) = &source.handler.json_schema {
            for operation in &json_schema.operations {
                for reference in [
                    &operation.request_schema,
                    &operation.response_schema,
                    &operation.request_sample,
                    &operation.response_sample,
                ] {
                    if let Some(path) = reference.as_ref().and_then(Reference::as_path) {
                        files.push_local(path);
                    }
                }
            }
        }

        if let Some(source) = source.handler.openapi.as_ref().and_then(|o| o.source.as_deref()) {
            files.push_local(source);
        }
    }

    for resolver in &config.additional_resolvers {
        if let Some(path) = resolver.as_path() {
            files.push_local(path);
        }
    }

    for source in &config.sources {
        collect_replace_field_composers(&source.transforms, &mut files);
    }
    collect_replace_field_composers(&config.transforms, &mut files);

    for plugin in &config.plugins {
        let composer = plugin
            .hooks
            .as_ref()
            .and_then(|hooks| hooks.before_all.as_ref())
            .and_then(|before_all| before_all.composer.as_deref());
        if let Some(composer) = composer {
            if !is_remote_reference(composer) {
                files.push(composer_file(composer));
            }
        }
    }

    for plugin in &config.plugins {
        for on_fetch in plugin.on_fetch.iter().flatten() {
            if let Some(handler) = on_fetch.handler.as_deref() {
                files.push(handler);
            }
        }
    }

    files.into_vec()
}

fn collect_replace_field_composers(transforms: &[Transform], files: &mut FileSet) {
    let composers = transforms
        .iter()
        .filter_map(|t| t.replace_field.as_ref())
        .flat_map(|rf| rf.replacements.iter())
        .filter_map(|r| r.composer.as_deref());

    for composer in composers {
        if !is_remote_reference(composer) {
            files.push(composer_file(composer));
        }
    }
}

/// Extract the mesh's file references and validate them against the mesh
/// file location. Validation only runs when at least one file is referenced.
pub fn get_files_in_mesh_config(config: &MeshConfig, mesh_path: &Path) -> MeshResult<Vec<String>> {
    let files = extract_file_references(config);

    tracing::info!("Files to be imported: {}", files.join(", "));

    if !files.is_empty() {
        let validated = check_files_are_under_mesh_directory(&files, mesh_path)
            .and_then(|()| validate_file_type(&files))
            .and_then(|()| validate_file_name(&files));

        if let Err(e) = validated {
            tracing::error!("{}", e);
            return Err(e);
        }
    }

    Ok(files)
}

#[derive(Default)]
struct FileSet {
    files: Vec<String>,
}

impl FileSet {
    fn push(&mut self, file: &str) {
        if !self.files.iter().any(|f| f == file) {
            self.files.push(file.to_string());
        }
    }

    fn push_local(&mut self, file: &str) {
        if !is_remote_reference(file) {
            self.push(file);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.files
    }
}
