//! Glint resource pack format (`GLTR`)
//!
//! The resource blob of a container is a flat archive of a title's asset
//! files, addressed by relative path.
//!
//! # Layout
//! ```text
//! 0x00: magic "GLTR"
//! 0x04: entry_count u32
//! 0x08: entry_count records, back to back:
//!       path_length u16
//!       path        [u8; path_length]   UTF-8, '/'-separated (invalid bytes decode lossily)
//!       data_size   u32
//!       data        [u8; data_size]
//! ```
//!
//! No delimiters, padding or alignment. Bytes after the last record are
//! ignored.


use std::path::Path;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use glint_shared::{GLT_FORMAT, MAX_RESOURCE_BYTES};
use hashbrown::HashMap;

use super::error::FormatError;

/// Resource pack header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct PackHeader {
    pub magic: [u8; 4],
    pub entry_count: u32,
}

impl PackHeader {
    pub const SIZE: usize = 8;

    pub fn new(entry_count: u32) -> Self {
        Self {
            magic: *GLT_FORMAT.pack_magic,
            entry_count,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        LittleEndian::write_u32(&mut bytes[4..8], self.entry_count);
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            entry_count: LittleEndian::read_u32(&bytes[4..8]),
        })
    }
}

/// One file inside a resource pack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Path relative to the pack root, e.g. `ui/AppEmpty.png`
    pub path: String,

    /// File contents
    pub data: Arc<[u8]>,
}

impl ResourceEntry {
    pub fn new(path: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }

    /// Encoded size of this record
    pub fn encoded_len(&self) -> usize {
        2 + self.path.len() + 4 + self.data.len()
    }
}

/// Parsed resource pack, entries in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePack {
    pub entries: Vec<ResourceEntry>,
}

/// Bounds-checked cursor over pack records
struct PackReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    index: usize,
}

impl<'a> PackReader<'a> {
    fn take(&mut self, needed: usize, field: &'static str) -> Result<&'a [u8], FormatError> {
        let remaining = self.bytes.len() - self.offset;
        if needed > remaining {
            return Err(FormatError::Truncated {
                index: self.index,
                field,
                needed,
                remaining,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + needed];
        self.offset += needed;
        Ok(slice)
    }

    fn read_u16(&mut self, field: &'static str) -> Result<u16, FormatError> {
        Ok(LittleEndian::read_u16(self.take(2, field)?))
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, FormatError> {
        Ok(LittleEndian::read_u32(self.take(4, field)?))
    }

    fn read_entry(&mut self) -> Result<ResourceEntry, FormatError> {
        let path_len = self.read_u16("path_length")? as usize;
        let path = self.take(path_len, "path")?;
        let path = match std::str::from_utf8(path) {
            Ok(path) => path.to_string(),
            Err(_) => {
                let lossy = String::from_utf8_lossy(path).into_owned();
                tracing::warn!("Resource path at entry {} is not UTF-8: {:?}", self.index, lossy);
                lossy
            }
        };

        let data_size = self.read_u32("data_size")? as usize;
        let data = self.take(data_size, "data")?;

        Ok(ResourceEntry {
            path,
            data: Arc::from(data),
        })
    }
}

impl ResourcePack {
    /// Create an empty pack
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, path: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.entries.push(ResourceEntry::new(path, data));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.iter()
    }

    /// Find an entry by exact path (linear scan; mount the pack for lookups)
    pub fn find(&self, path: &str) -> Option<&ResourceEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Total size of all entry data
    pub fn data_len(&self) -> usize {
        self.entries.iter().map(|e| e.data.len()).sum()
    }

    /// Parse a pack from a container's resource blob.
    ///
    /// Every field read is checked against the remaining bytes; a record that
    /// claims more bytes than are left fails the whole parse.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let header = PackHeader::from_bytes(bytes).ok_or(FormatError::Truncated {
            index: 0,
            field: "header",
            needed: PackHeader::SIZE,
            remaining: bytes.len(),
        })?;
        if &header.magic != GLT_FORMAT.pack_magic {
            return Err(FormatError::InvalidPackMagic);
        }

        let mut reader = PackReader {
            bytes,
            offset: PackHeader::SIZE,
            index: 0,
        };

        // Smallest record is 6 bytes; don't trust the count for allocation
        let max_entries = (bytes.len() - PackHeader::SIZE) / 6;
        let mut entries = Vec::with_capacity((header.entry_count as usize).min(max_entries));

        for index in 0..header.entry_count as usize {
            reader.index = index;
            entries.push(reader.read_entry()?);
        }

        Ok(Self { entries })
    }

    /// Serialize to the pack layout
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let entry_count = u32::try_from(self.entries.len()).map_err(|_| FormatError::BlobTooLarge {
            what: "Entry count".to_string(),
            len: self.entries.len(),
        })?;

        let total = PackHeader::SIZE + self.entries.iter().map(ResourceEntry::encoded_len).sum::<usize>();
        let mut bytes = Vec::with_capacity(total);
        bytes.extend_from_slice(&PackHeader::new(entry_count).to_bytes());

        for entry in &self.entries {
            let path_len = u16::try_from(entry.path.len()).map_err(|_| FormatError::PathTooLong {
                path: entry.path.clone(),
                len: entry.path.len(),
            })?;
            let data_size = u32::try_from(entry.data.len()).map_err(|_| FormatError::BlobTooLarge {
                what: format!("Resource {}", entry.path),
                len: entry.data.len(),
            })?;

            bytes.extend_from_slice(&path_len.to_le_bytes());
            bytes.extend_from_slice(entry.path.as_bytes());
            bytes.extend_from_slice(&data_size.to_le_bytes());
            bytes.extend_from_slice(&entry.data);
        }

        Ok(bytes)
    }

    /// Build a pack from every regular file under `dir`.
    ///
    /// Paths are relative to `dir`, `/`-separated and sorted, so the same
    /// directory always produces the same bytes.
    pub fn from_dir(dir: &Path) -> Result<Self, FormatError> {
        let dir_err = |message: String| FormatError::ResourceDir {
            path: dir.to_path_buf(),
            message,
        };

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| dir_err(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|e| dir_err(e.to_string()))?;
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((relative, entry.into_path()));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut pack = Self::new();
        for (relative, path) in files {
            let data = glint_shared::read_file_with_limit(&path, MAX_RESOURCE_BYTES)
                .map_err(|e| dir_err(format!("{:#}", e)))?;
            tracing::debug!("Packed resource {} ({} bytes)", relative, data.len());
            pack.push(relative, data);
        }
        Ok(pack)
    }

    /// Build the path → data mapping used for mounting.
    ///
    /// Paths are unique keys; a later duplicate replaces an earlier one.
    pub fn into_map(self) -> HashMap<String, Arc<[u8]>> {
        let mut map = HashMap::with_capacity(self.entries.len());
        for entry in self.entries {
            if map.insert(entry.path.clone(), entry.data).is_some() {
                tracing::warn!("Duplicate resource path in pack: {}", entry.path);
            }
        }
        map
    }
}
