//! System startup
//!
//! Creates the system directory layout and runs the home shell title on the
//! calling thread. The home shell is an ordinary title container whose
//! resources are mounted at the home token; it drives itself with its own
//! present result and launches other titles through the host session.

use std::path::Path;

use anyhow::{Context, Result};
use glt_common::Container;

use crate::config::SystemConfig;
use crate::graphics::GraphicsContext;
use crate::module::{ModuleLoader, entry};
use crate::mount::MountTable;
use crate::title::LaunchError;

/// Directories created under the system root
pub const SYSTEM_DIRS: &[&str] = &["sys", "sys/apps", "sys/settings", "titles"];

/// How a home shell boot ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// No home shell container at the expected path
    MissingHome,
    /// The home shell container could not be read
    InvalidHome,
    /// The home shell ran and returned after `frames` cycles
    Ran { frames: u64 },
}

/// Create any missing system directories under `root`
pub fn init_system_dirs(root: &Path) -> Result<()> {
    for dir in SYSTEM_DIRS {
        let path = root.join(dir);
        if !path.is_dir() {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            tracing::info!("Created {}", path.display());
        }
    }
    Ok(())
}

/// Load the home shell, mount its resources and run it until it stops presenting.
pub fn boot_home_screen(
    system: &SystemConfig,
    loader: &dyn ModuleLoader,
    graphics: &dyn GraphicsContext,
    mounts: &MountTable,
) -> Result<BootOutcome, LaunchError> {
    let path = system
        .apps_dir()
        .join(format!("{}.{}", system.home_title, glint_shared::GLT_FORMAT.extension));
    if !path.is_file() {
        tracing::error!("Home shell not found at {}", path.display());
        return Ok(BootOutcome::MissingHome);
    }

    let container = Container::load(&path);
    if !container.is_valid() {
        return Ok(BootOutcome::InvalidHome);
    }

    let module = loader.extract(&container)?;
    if let Err(e) = mounts.mount(&container, &system.home_mount) {
        tracing::warn!("Home shell resources unavailable: {}", e);
    }

    graphics.make_current();
    module.call_attach(graphics.handle());
    module.call_void(entry::SETUP);

    let mut frames = 0;
    while module.call_int(entry::PRESENT) == 1 {
        module.call_int(entry::CYCLE);
        frames += 1;
    }

    module.call_void(entry::SHUTDOWN);
    tracing::info!("Home shell exited after {} frames", frames);
    Ok(BootOutcome::Ran { frames })
}
