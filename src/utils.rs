//! Shared path helpers for the CLI and the pipeline.

use std::io;
use std::path::{Component, Path, PathBuf};

/// File name used when the per-seal output path has none (e.g. `..`).
const FALLBACK_CLUSTERS_FILE: &str = "cluster_seals.csv";

/// Derives the cluster summary path from the per-seal output path.
///
/// The summary sits next to the per-seal file with a `cluster_` prefix, so
/// `out/seals.csv` becomes `out/cluster_seals.csv`.
pub fn clusters_path_for(seals_path: &Path) -> PathBuf {
    let file_name = seals_path
        .file_name()
        .map(|name| format!("cluster_{}", name.to_string_lossy()))
        .unwrap_or_else(|| FALLBACK_CLUSTERS_FILE.to_string());

    match seals_path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Resolves an output path to the location it will actually be written at.
///
/// Relative paths are taken from the current directory and `.`/`..` are
/// folded lexically. When the parent directory exists it is canonicalized
/// too, so symlinked directories resolve to the same path. Only used to
/// compare paths; the file itself does not need to exist.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    if let (Some(parent), Some(name)) = (normalized.parent(), normalized.file_name()) {
        if let Ok(parent) = parent.canonicalize() {
            return parent.join(name);
        }
    }
    normalized
}

/// Ensures the parent directory of an output file exists.
///
/// Creates the directory structure if it doesn't exist using `create_dir_all`.
pub fn ensure_parent_directory(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
