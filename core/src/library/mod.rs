//! Installed title library
//!
//! Titles live as `<id>.glt` files in the titles directory. Only the header
//! and metadata record are read when listing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glint_shared::GLT_FORMAT;
use glt_common::{Container, TitleMetadata};

/// A title container found on disk
#[derive(Debug, Clone)]
pub struct InstalledTitle {
    /// Path to the `.glt` file
    pub path: PathBuf,
    pub metadata: TitleMetadata,
}

/// `<dir>/<id>.glt`
pub fn title_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.{}", id, GLT_FORMAT.extension))
}

/// List every readable title container in `dir`, sorted by id.
///
/// Unreadable or invalid files are skipped with a warning.
pub fn scan_titles(dir: &Path) -> Vec<InstalledTitle> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return vec![];
    };

    let mut titles: Vec<_> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(GLT_FORMAT.extension) {
                return None;
            }
            match Container::read_metadata(&path) {
                Ok((_, metadata)) => Some(InstalledTitle { path, metadata }),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();

    titles.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
    titles
}

/// Copy a title container into `dir` under its own id.
///
/// Returns the installed path. An existing title with the same id is replaced.
pub fn install_title(source: &Path, dir: &Path) -> Result<PathBuf> {
    let (_, metadata) = Container::read_metadata(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    TitleMetadata::check_id(&metadata.id)
        .with_context(|| format!("Refusing to install {}", source.display()))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let dest = title_path(dir, &metadata.id);
    std::fs::copy(source, &dest)
        .with_context(|| format!("Failed to copy to {}", dest.display()))?;

    tracing::info!("Installed {} ({}) to {}", metadata.name, metadata.id, dest.display());
    Ok(dest)
}

/// Remove an installed title by id
pub fn delete_title(dir: &Path, id: &str) -> Result<()> {
    TitleMetadata::check_id(id)?;
    let path = title_path(dir, id);
    std::fs::remove_file(&path).with_context(|| format!("Failed to delete {}", path.display()))
}
