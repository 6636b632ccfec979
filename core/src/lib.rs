//! Glint Core - title runtime
//!
//! Loads `.glt` title containers into the host process and runs them next to
//! the home shell, sharing a single graphics context.
//!
//! # Architecture
//!
//! - [`MountTable`] - Process-wide registry of mounted resource packs
//! - [`ModuleLoader`] / [`TitleModule`] - Native code loading and entry point calls
//! - [`TitleSupervisor`] - Spawns a title's worker thread
//! - [`TitleRuntime`] - Host-side handle polled once per frame
//! - [`HostSession`] - Home shell side of the graphics context handoff

pub mod boot;
pub mod config;
pub mod ffi;
pub mod graphics;
pub mod host;
pub mod library;
pub mod module;
pub mod mount;
#[cfg(test)]
pub mod test_utils;
pub mod title;

pub use boot::{BootOutcome, boot_home_screen, init_system_dirs};
pub use config::{Config, SupervisorConfig, SystemConfig};
pub use graphics::{GraphicsContext, HeadlessContext};
pub use host::{HostEvent, HostSession};
pub use library::{InstalledTitle, scan_titles, title_path};
pub use module::{
    CALL_FAILED, ContextHandle, LoadError, ModuleLoader, TitleModule, default_loader,
};
pub use mount::{MountError, MountTable, MountToken};
pub use title::{
    LaunchError, TitleInfo, TitleRuntime, TitleSnapshot, TitleState, TitleSupervisor,
};

// Re-export the container formats for convenience
pub use glt_common::{Container, ResourcePack, TitleMetadata};
