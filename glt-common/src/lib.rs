//! Shared formats for Glint titles
//!
//! This crate provides the binary formats shared between:
//! - `glint-core` (runtime: loading, mounting, launching titles)
//! - `glt-pack` (authoring tool: producing `.glt` containers)
//!
//! # Modules
//!
//! - [`formats`] - Title container (`GLTE`) and resource pack (`GLTR`) codecs

pub mod formats;

pub use formats::{
    Container, ContainerHeader, FormatError, PackHeader, ResourceEntry, ResourcePack,
    TitleMetadata,
};

// Re-export the format constants for convenience
pub use glint_shared::{GLT_FORMAT, TitleFormat};
