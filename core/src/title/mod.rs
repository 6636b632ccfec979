//! Title supervision
//!
//! [`TitleSupervisor`] extracts a title's module and runs it on a dedicated
//! worker thread, returning a [`TitleRuntime`] the host polls each frame.
//! Only one title is expected to run at a time; [`crate::host::HostSession`]
//! enforces that for the home shell.

mod runtime;
mod state;

#[cfg(test)]
mod tests;

pub use runtime::TitleRuntime;
pub use state::{TitleSnapshot, TitleState};

use std::path::Path;
use std::sync::Arc;

use glint_shared::GLT_FORMAT;
use glt_common::{Container, TitleMetadata};
use thiserror::Error;

use crate::config::SupervisorConfig;
use crate::graphics::GraphicsContext;
use crate::module::{LoadError, ModuleLoader};

/// Errors that can occur when launching a title
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to extract title module: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to spawn title thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Title {id} is already running")]
    Busy { id: String },
}

/// Display information for an installed title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleInfo {
    pub metadata: TitleMetadata,
    /// Icon uploaded through the graphics context, if it supports textures
    pub icon_texture: Option<u32>,
}

/// Launches titles against a shared loader and graphics context
#[derive(Clone)]
pub struct TitleSupervisor {
    loader: Arc<dyn ModuleLoader>,
    graphics: Arc<dyn GraphicsContext>,
    config: SupervisorConfig,
}

impl TitleSupervisor {
    pub fn new(
        loader: Arc<dyn ModuleLoader>,
        graphics: Arc<dyn GraphicsContext>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            loader,
            graphics,
            config,
        }
    }

    pub fn graphics(&self) -> &Arc<dyn GraphicsContext> {
        &self.graphics
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Read a title's metadata without extracting it, uploading its icon
    pub fn load_metadata(&self, path: &Path) -> Option<TitleInfo> {
        let (_, metadata) = match Container::read_metadata(path) {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!("Failed to read title metadata {}: {}", path.display(), e);
                return None;
            }
        };

        let size = GLT_FORMAT.icon_size;
        let icon_texture = self
            .graphics
            .create_icon_texture(size, size, &metadata.icon);

        Some(TitleInfo {
            metadata,
            icon_texture,
        })
    }

    /// Extract the title's module and start its worker thread.
    ///
    /// Returns immediately; the title starts running once the host hands off
    /// the graphics context (see [`TitleRuntime::hand_off`]).
    pub fn launch(&self, container: &Container) -> Result<TitleRuntime, LaunchError> {
        let module = self.loader.extract(container)?;
        let metadata = container.metadata().clone();
        tracing::info!("Launching title {} ({})", metadata.name, metadata.id);

        TitleRuntime::spawn(metadata, module, Arc::clone(&self.graphics), &self.config)
            .map_err(LaunchError::Spawn)
    }
}
