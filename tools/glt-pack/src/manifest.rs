//! Title manifest parsing
//!
//! ```json
//! {
//!   "title": {
//!     "id": "0004000200001",
//!     "name": "Cube",
//!     "description": "Spinning cube sample",
//!     "icon": "icon.png",
//!     "tags": ["demo", "graphics"],
//!     "resources": "res"
//!   },
//!   "dbg": { "direct_copy": true, "copy_directory": "../sysroot/titles" }
//! }
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Title manifest structure
#[derive(Debug, Deserialize)]
pub struct TitleManifest {
    pub title: TitleSection,
    #[serde(default)]
    pub dbg: DebugSection,
}

/// Title metadata section
#[derive(Debug, Deserialize)]
pub struct TitleSection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Icon image, any format `image` decodes
    #[serde(default)]
    pub icon: Option<PathBuf>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Directory packed into the resource blob
    #[serde(default)]
    pub resources: Option<PathBuf>,
}

/// Development conveniences
#[derive(Debug, Default, Deserialize)]
pub struct DebugSection {
    /// Copy the built container into `copy_directory`
    #[serde(default)]
    pub direct_copy: bool,
    #[serde(default)]
    pub copy_directory: Option<PathBuf>,
}

impl TitleManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let mut manifest: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.resolve_paths(base);
        Ok(manifest)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            self.title.icon.as_mut(),
            self.title.resources.as_mut(),
            self.dbg.copy_directory.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Where to copy the built container, if requested
    pub fn copy_target(&self) -> Option<&Path> {
        if self.dbg.direct_copy {
            self.dbg.copy_directory.as_deref()
        } else {
            None
        }
    }
}
