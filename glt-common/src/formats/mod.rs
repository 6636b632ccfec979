//! Glint title formats
//!
//! Both formats are little-endian with no padding and no alignment:
//!
//! - [`container`] - `.glt` file: header, fixed metadata record, code blob, resource blob
//! - [`resource_pack`] - nested archive of length-prefixed `(path, data)` records
//!
//! Format constants (magic bytes, field widths) live in [`glint_shared::GLT_FORMAT`].

pub mod container;
mod error;
mod fixed_str;
pub mod resource_pack;

pub use container::{Container, ContainerHeader, TitleMetadata};
pub use error::FormatError;
pub use fixed_str::{read_fixed_str, write_fixed_str};
pub use resource_pack::{PackHeader, ResourceEntry, ResourcePack};
