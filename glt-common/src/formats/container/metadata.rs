//! Fixed-size title metadata record.

use std::ffi::OsStr;
use std::path::Path;

use glint_shared::GLT_FORMAT;

use crate::formats::error::FormatError;
use crate::formats::fixed_str::{read_fixed_str, write_fixed_str};

/// Identifying information stored after the container header.
///
/// # Layout
/// ```text
/// 0x0000: id           [u8; 16]    NUL-padded
/// 0x0010: name         [u8; 32]    NUL-padded
/// 0x0030: description  [u8; 128]   NUL-padded
/// 0x00B0: icon         [u8; 49152] 128×128 RGB8
/// 0xC0B0: tags         [[u8; 16]; 3]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMetadata {
    /// Stable short id (also the container file stem)
    pub id: String,

    /// Display name
    pub name: String,

    /// Description shown in the home shell
    pub description: String,

    /// Icon pixels, 128×128 RGB8, row-major
    pub icon: Vec<u8>,

    /// Up to 3 non-empty short tags; empty slots are dropped on decode
    pub tags: Vec<String>,
}

impl Default for TitleMetadata {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            icon: vec![0; GLT_FORMAT.icon_bytes()],
            tags: Vec::new(),
        }
    }
}

const ID_OFFSET: usize = 0;
const NAME_OFFSET: usize = ID_OFFSET + GLT_FORMAT.id_len;
const DESCRIPTION_OFFSET: usize = NAME_OFFSET + GLT_FORMAT.name_len;
const ICON_OFFSET: usize = DESCRIPTION_OFFSET + GLT_FORMAT.description_len;
const TAGS_OFFSET: usize = ICON_OFFSET + GLT_FORMAT.icon_bytes();

impl TitleMetadata {
    pub const SIZE: usize = GLT_FORMAT.metadata_bytes();

    /// Create metadata with a zeroed icon and no tags
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description (builder style)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the tags (builder style)
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Check that every field fits its fixed slot without truncation
    pub fn validate(&self) -> Result<(), FormatError> {
        Self::check_id(&self.id)?;
        check_field("Title id", &self.id, GLT_FORMAT.id_len)?;
        check_field("Title name", &self.name, GLT_FORMAT.name_len)?;
        check_field(
            "Description",
            &self.description,
            GLT_FORMAT.description_len,
        )?;
        if self.tags.len() > GLT_FORMAT.tag_count {
            return Err(FormatError::TooManyTags {
                count: self.tags.len(),
                max: GLT_FORMAT.tag_count,
            });
        }
        for (index, tag) in self.tags.iter().enumerate() {
            // Empty slots read back as absent, which would shift later tags
            if tag.is_empty() {
                return Err(FormatError::EmptyTag { index });
            }
            check_field("Tag", tag, GLT_FORMAT.tag_len)?;
        }
        if self.icon.len() != GLT_FORMAT.icon_bytes() {
            return Err(FormatError::InvalidIcon {
                len: self.icon.len(),
                expected: GLT_FORMAT.icon_bytes(),
            });
        }
        Ok(())
    }

    /// Check that an id can name its own `<id>.glt` file inside a directory.
    ///
    /// Rejects empty ids, path separators, NUL and `.`/`..` components.
    pub fn check_id(id: &str) -> Result<(), FormatError> {
        if id.is_empty() {
            return Err(FormatError::EmptyId);
        }
        let invalid = id.contains(['/', '\\', '\0'])
            || id.contains("..")
            || id == "."
            || Path::new(id).file_name() != Some(OsStr::new(id));
        if invalid {
            return Err(FormatError::InvalidId { id: id.to_string() });
        }
        Ok(())
    }

    /// Write the fixed-size record.
    ///
    /// Over-long text is truncated, surplus tags are dropped and a short icon
    /// is zero-filled. Call [`validate`](Self::validate) first to reject those.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; Self::SIZE];
        write_fixed_str(&mut bytes[ID_OFFSET..NAME_OFFSET], &self.id);
        write_fixed_str(&mut bytes[NAME_OFFSET..DESCRIPTION_OFFSET], &self.name);
        write_fixed_str(
            &mut bytes[DESCRIPTION_OFFSET..ICON_OFFSET],
            &self.description,
        );

        let icon_len = self.icon.len().min(GLT_FORMAT.icon_bytes());
        bytes[ICON_OFFSET..ICON_OFFSET + icon_len].copy_from_slice(&self.icon[..icon_len]);

        for (slot, tag) in self.tags.iter().take(GLT_FORMAT.tag_count).enumerate() {
            let start = TAGS_OFFSET + slot * GLT_FORMAT.tag_len;
            write_fixed_str(&mut bytes[start..start + GLT_FORMAT.tag_len], tag);
        }
        bytes
    }

    /// Read a complete record
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self::decode(&bytes[..Self::SIZE]))
    }

    /// Read a record from however many bytes are available.
    ///
    /// Missing trailing bytes read as zero, the same as copying a short file
    /// into a zero-initialised record.
    pub fn from_truncated(bytes: &[u8]) -> Self {
        if bytes.len() >= Self::SIZE {
            return Self::decode(&bytes[..Self::SIZE]);
        }
        let mut padded = vec![0u8; Self::SIZE];
        padded[..bytes.len()].copy_from_slice(bytes);
        Self::decode(&padded)
    }

    fn decode(bytes: &[u8]) -> Self {
        let tags = (0..GLT_FORMAT.tag_count)
            .map(|slot| {
                let start = TAGS_OFFSET + slot * GLT_FORMAT.tag_len;
                read_fixed_str(&bytes[start..start + GLT_FORMAT.tag_len])
            })
            .filter(|tag| !tag.is_empty())
            .collect();

        Self {
            id: read_fixed_str(&bytes[ID_OFFSET..NAME_OFFSET]),
            name: read_fixed_str(&bytes[NAME_OFFSET..DESCRIPTION_OFFSET]),
            description: read_fixed_str(&bytes[DESCRIPTION_OFFSET..ICON_OFFSET]),
            icon: bytes[ICON_OFFSET..TAGS_OFFSET].to_vec(),
            tags,
        }
    }
}

fn check_field(field: &'static str, value: &str, width: usize) -> Result<(), FormatError> {
    // One byte is reserved for the terminating NUL
    if value.len() >= width {
        return Err(FormatError::FieldTooLong {
            field,
            len: value.len(),
            max: width - 1,
        });
    }
    Ok(())
}
