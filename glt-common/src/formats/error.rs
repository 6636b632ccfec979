//! Errors raised while reading or writing title formats.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the container and resource pack codecs.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The file could not be read
    #[error("Failed to read title container: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exceeds the in-memory read cap
    #[error("Title container too large: {path} ({len} bytes, max {max} bytes)")]
    TooLarge { path: PathBuf, len: u64, max: u64 },

    /// Fewer bytes than the fixed header
    #[error("Title container too small: {len} bytes (header is {expected} bytes)")]
    TooSmall { len: usize, expected: usize },

    /// Container does not start with `GLTE`
    #[error("Invalid container magic bytes (expected: GLTE)")]
    InvalidMagic,

    /// Resource pack does not start with `GLTR`
    #[error("Invalid resource pack magic bytes (expected: GLTR)")]
    InvalidPackMagic,

    /// A record field runs past the end of the pack
    #[error(
        "Resource pack truncated at entry {index}: {field} needs {needed} bytes, {remaining} remaining"
    )]
    Truncated {
        index: usize,
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// A path does not fit the u16 length prefix
    #[error("Resource path too long: {path} ({len} bytes, max 65535)")]
    PathTooLong { path: String, len: usize },

    /// A blob does not fit a u32 size field
    #[error("{what} too large: {len} bytes (max 4294967295)")]
    BlobTooLarge { what: String, len: usize },

    /// Walking a resource directory failed
    #[error("Failed to collect resources from {path}: {message}")]
    ResourceDir { path: PathBuf, message: String },

    /// Metadata text field exceeds its fixed width
    #[error("{field} too long: {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Metadata has an empty title id
    #[error("Title id cannot be empty")]
    EmptyId,

    /// Title id cannot be used as a file name
    #[error("Title id '{id}' is not a valid file name")]
    InvalidId { id: String },

    /// A tag slot before the last used one is empty
    #[error("Tag {index} is empty")]
    EmptyTag { index: usize },

    /// More tags than there are slots
    #[error("Too many tags: {count} (max {max})")]
    TooManyTags { count: usize, max: usize },

    /// Icon buffer is not 128x128 RGB
    #[error("Icon must be {expected} bytes, got {len}")]
    InvalidIcon { len: usize, expected: usize },
}
