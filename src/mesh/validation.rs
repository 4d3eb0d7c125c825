//! Validation of the files referenced by a mesh configuration.
//!
//! # Responsibilities
//! - Reject files that resolve outside the mesh file's directory
//! - Reject file types other than `.js` and `.json`
//! - Reject file names longer than [`MAX_FILE_NAME_LEN`]
//!
//! Each check collects every offending file before failing once.

use std::path::{Component, Path, PathBuf};

use crate::mesh::error::{MeshConfigError, MeshResult};

/// Maximum length of a referenced file's base name.
pub const MAX_FILE_NAME_LEN: usize = 25;

const ALLOWED_EXTENSIONS: &[&str] = &["js", "json"];

/// Fail if any file resolves outside the directory of `mesh_path`, or contains `~`.
///
/// Containment is a string prefix test on the lexically resolved paths, so a
/// sibling directory sharing the prefix (`mesh` vs `mesh-other`) passes.
pub fn check_files_are_under_mesh_directory(files: &[String], mesh_path: &Path) -> MeshResult<()> {
    let mesh_dir = resolve(mesh_path.parent().unwrap_or(Path::new("")));
    let mesh_dir = mesh_dir.to_string_lossy();

    let invalid: Vec<String> = files
        .iter()
        .filter(|file| {
            let resolved = resolve(&Path::new(mesh_dir.as_ref()).join(file.as_str()));
            !resolved.to_string_lossy().starts_with(mesh_dir.as_ref()) || file.contains('~')
        })
        .map(|file| base_name(file))
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(MeshConfigError::PathOutsideMeshDirectory(invalid))
    }
}

/// Fail if any file does not have a `.js` or `.json` extension.
pub fn validate_file_type(files: &[String]) -> MeshResult<()> {
    let invalid: Vec<String> = files
        .iter()
        .filter(|file| {
            let extension = Path::new(file.as_str()).extension().and_then(|e| e.to_str());
            !matches!(extension, Some(ext) if ALLOWED_EXTENSIONS.contains(&ext))
        })
        .map(|file| base_name(file))
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(MeshConfigError::InvalidFileType(invalid))
    }
}

/// Fail if any file's base name is longer than [`MAX_FILE_NAME_LEN`] characters.
pub fn validate_file_name(files: &[String]) -> MeshResult<()> {
    let invalid: Vec<String> = files
        .iter()
        .map(|file| base_name(file))
        .filter(|name| name.chars().count() > MAX_FILE_NAME_LEN)
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(MeshConfigError::InvalidFileName(invalid))
    }
}

/// Last path component, or the input itself when it has none.
pub fn base_name(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

/// Lexically resolve `path` to an absolute path without touching the
/// filesystem: relative paths are joined to the working directory, `.` is
/// dropped and `..` pops a component.
pub fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}
