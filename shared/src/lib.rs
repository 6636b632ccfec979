//! Shared types for the Glint console runtime.
//!
//! Holds the constants every crate agrees on (title container magic bytes,
//! fixed field widths, file extension) and small filesystem helpers used by
//! both the runtime and the authoring tool.

pub mod fs;
pub mod title_format;

pub use fs::{MAX_RESOURCE_BYTES, MAX_TITLE_BYTES, read_file_with_limit};
pub use title_format::{GLT_FORMAT, TitleFormat};
