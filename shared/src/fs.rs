//! Filesystem helpers shared across Glint tools and runtimes.

use std::path::Path;

use anyhow::{Context, Result};

/// Maximum allowed title container size for reading into memory.
pub const MAX_TITLE_BYTES: u64 = 512 * 1024 * 1024; // 512 MiB
/// Maximum allowed size of a single resource file when authoring a pack.
pub const MAX_RESOURCE_BYTES: u64 = u32::MAX as u64;

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}
