//! Glint title container format (`.glt`)
//!
//! A container packages one native code module and one resource pack
//! together with identifying metadata.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     .glt Title File                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  ContainerHeader (12 bytes)                              │
//! │  ├── magic: "GLTE"                                       │
//! │  ├── code_size: u32 LE                                   │
//! │  └── resource_size: u32 LE                               │
//! ├──────────────────────────────────────────────────────────┤
//! │  TitleMetadata (49376 bytes)                             │
//! ├──────────────────────────────────────────────────────────┤
//! │  code blob       (code_size bytes, shared object)        │
//! ├──────────────────────────────────────────────────────────┤
//! │  resource blob   (resource_size bytes, GLTR pack)        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Reading is best-effort: a file shorter than its declared sizes still loads,
//! and [`Container::code`] / [`Container::resource`] return whatever bytes are
//! actually present.

mod metadata;


pub use metadata::TitleMetadata;

use std::io::Read;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use glint_shared::{GLT_FORMAT, MAX_TITLE_BYTES};

use super::error::FormatError;

/// Container header (12 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct ContainerHeader {
    pub magic: [u8; 4],
    pub code_size: u32,
    pub resource_size: u32,
}

impl ContainerHeader {
    pub const SIZE: usize = 12;

    pub fn new(code_size: u32, resource_size: u32) -> Self {
        Self {
            magic: *GLT_FORMAT.magic,
            code_size,
            resource_size,
        }
    }

    /// Whether the magic tag is `GLTE`
    pub fn has_valid_magic(&self) -> bool {
        &self.magic == GLT_FORMAT.magic
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        LittleEndian::write_u32(&mut bytes[4..8], self.code_size);
        LittleEndian::write_u32(&mut bytes[8..12], self.resource_size);
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            code_size: LittleEndian::read_u32(&bytes[4..8]),
            resource_size: LittleEndian::read_u32(&bytes[8..12]),
        })
    }
}

/// Offset of the code blob from the start of the file
pub const CODE_OFFSET: usize = ContainerHeader::SIZE + TitleMetadata::SIZE;

/// A title container read into memory.
///
/// Holds the whole file buffer; the code and resource blobs are views into it.
#[derive(Debug, Clone)]
pub struct Container {
    header: ContainerHeader,
    metadata: TitleMetadata,
    data: Arc<[u8]>,
}

impl Default for Container {
    fn default() -> Self {
        Self::empty()
    }
}

impl Container {
    /// The zero-initialised container returned when a load fails
    pub fn empty() -> Self {
        Self {
            header: ContainerHeader::default(),
            metadata: TitleMetadata::default(),
            data: Arc::from(Vec::new()),
        }
    }

    /// Encode a complete container file
    pub fn encode(
        metadata: &TitleMetadata,
        code: &[u8],
        resource: &[u8],
    ) -> Result<Vec<u8>, FormatError> {
        let code_size = blob_size("Code blob", code)?;
        let resource_size = blob_size("Resource blob", resource)?;

        let mut bytes = Vec::with_capacity(CODE_OFFSET + code.len() + resource.len());
        bytes.extend_from_slice(&ContainerHeader::new(code_size, resource_size).to_bytes());
        bytes.extend_from_slice(&metadata.to_bytes());
        bytes.extend_from_slice(code);
        bytes.extend_from_slice(resource);
        Ok(bytes)
    }

    /// Build an in-memory container from its parts
    pub fn new(metadata: &TitleMetadata, code: &[u8], resource: &[u8]) -> Result<Self, FormatError> {
        Self::from_bytes(Self::encode(metadata, code, resource)?)
    }

    /// Parse a container from a file buffer.
    ///
    /// Rejects buffers shorter than the header or with the wrong magic. A
    /// short metadata record is zero-filled; short blobs are clamped.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self, FormatError> {
        let data: Arc<[u8]> = bytes.into();

        let header = ContainerHeader::from_bytes(&data).ok_or(FormatError::TooSmall {
            len: data.len(),
            expected: ContainerHeader::SIZE,
        })?;
        if !header.has_valid_magic() {
            return Err(FormatError::InvalidMagic);
        }

        let metadata = TitleMetadata::from_truncated(&data[ContainerHeader::SIZE..]);

        Ok(Self {
            header,
            metadata,
            data,
        })
    }

    /// Read and parse a container file
    pub fn read(path: &Path) -> Result<Self, FormatError> {
        let len = std::fs::metadata(path)
            .map_err(|source| FormatError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if len > MAX_TITLE_BYTES {
            return Err(FormatError::TooLarge {
                path: path.to_path_buf(),
                len,
                max: MAX_TITLE_BYTES,
            });
        }

        let bytes = std::fs::read(path).map_err(|source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    /// Load a container, logging and returning [`Container::empty`] on failure.
    ///
    /// Callers check [`is_valid`](Self::is_valid) before using the result.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(container) => {
                tracing::info!(
                    "Title name: {}, description: {}",
                    container.metadata.name,
                    container.metadata.description
                );
                if !container.is_complete() {
                    tracing::warn!(
                        "Title container {} is {} bytes, header declares {}",
                        path.display(),
                        container.data.len(),
                        container.declared_len()
                    );
                }
                container
            }
            Err(e) => {
                tracing::warn!("Failed to load title container {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Read only the header and metadata record, without the blobs
    pub fn read_metadata(path: &Path) -> Result<(ContainerHeader, TitleMetadata), FormatError> {
        let io_err = |source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = std::fs::File::open(path).map_err(io_err)?;
        let mut bytes = Vec::with_capacity(CODE_OFFSET);
        file.take(CODE_OFFSET as u64)
            .read_to_end(&mut bytes)
            .map_err(io_err)?;

        let container = Self::from_bytes(bytes)?;
        Ok((container.header, container.metadata))
    }

    /// Whether this container was parsed from a file with the `GLTE` magic
    pub fn is_valid(&self) -> bool {
        self.header.has_valid_magic()
    }

    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    pub fn metadata(&self) -> &TitleMetadata {
        &self.metadata
    }

    /// Whole file buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Total length the header declares for the file
    pub fn declared_len(&self) -> u64 {
        CODE_OFFSET as u64 + self.header.code_size as u64 + self.header.resource_size as u64
    }

    /// Whether the buffer length matches the declared sizes exactly
    pub fn is_complete(&self) -> bool {
        self.data.len() as u64 == self.declared_len()
    }

    /// Byte range of the code blob, clamped to the buffer
    pub fn code_range(&self) -> Range<usize> {
        self.clamp(CODE_OFFSET as u64, self.header.code_size)
    }

    /// Byte range of the resource blob, clamped to the buffer
    pub fn resource_range(&self) -> Range<usize> {
        let start = CODE_OFFSET as u64 + self.header.code_size as u64;
        self.clamp(start, self.header.resource_size)
    }

    /// Code blob bytes actually present in the file
    pub fn code(&self) -> &[u8] {
        &self.data[self.code_range()]
    }

    /// Resource blob bytes actually present in the file
    pub fn resource(&self) -> &[u8] {
        &self.data[self.resource_range()]
    }

    pub fn has_code(&self) -> bool {
        !self.code_range().is_empty()
    }

    fn clamp(&self, start: u64, size: u32) -> Range<usize> {
        let len = self.data.len() as u64;
        let start = start.min(len);
        let end = (start + size as u64).min(len);
        start as usize..end as usize
    }
}

fn blob_size(what: &str, blob: &[u8]) -> Result<u32, FormatError> {
    u32::try_from(blob.len()).map_err(|_| FormatError::BlobTooLarge {
        what: what.to_string(),
        len: blob.len(),
    })
}
