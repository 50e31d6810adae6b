//! Resource Loader
//!
//! Reads every non-hidden file under the input directory. Files are not
//! parsed here.

use super::descriptor::ResourcePayload;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Hidden files (`.DS_Store`, editor swap files, ...) are never loaded
fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Load one payload per file, recursively.
///
/// Entries of a directory are visited in file-name order. Any unreadable
/// directory or file fails the whole load.
pub fn load_payloads(root: &Path) -> Result<Vec<ResourcePayload>> {
    if !root.is_dir() {
        return Err(anyhow::anyhow!(
            "Input directory {} does not exist or is not a directory",
            root.display()
        ));
    }

    let mut payloads = Vec::new();
    collect_dir(root, &mut payloads)?;

    tracing::info!(
        "Loaded {} resource files from {}",
        payloads.len(),
        root.display()
    );

    Ok(payloads)
}

fn collect_dir(dir: &Path, payloads: &mut Vec<ResourcePayload>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to stat {}", path.display()))?;

        if file_type.is_dir() {
            collect_dir(&path, payloads)?;
            continue;
        }

        if is_hidden(&entry.file_name()) {
            tracing::debug!("Skipping hidden file {}", path.display());
            continue;
        }

        // Symlinked directories are listed but not followed
        if file_type.is_symlink() && path.is_dir() {
            tracing::debug!("Not following symlinked directory {}", path.display());
            continue;
        }

        let body = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        payloads.push(ResourcePayload::new(path, body));
    }

    Ok(())
}
