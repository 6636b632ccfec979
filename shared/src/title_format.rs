//! Title container format constants.
//!
//! `TitleFormat` is the single source of truth for the on-disk constants of
//! `.glt` title containers: magic tags, field widths and the icon geometry.
//!
//! # Example
//!
//! ```
//! use glint_shared::GLT_FORMAT;
//!
//! assert_eq!(GLT_FORMAT.extension, "glt");
//! assert_eq!(GLT_FORMAT.magic, b"GLTE");
//! assert_eq!(GLT_FORMAT.pack_magic, b"GLTR");
//! ```

/// Container format description.
#[derive(Debug, Clone, Copy)]
pub struct TitleFormat {
    /// Container file extension without dot (e.g., "glt")
    pub extension: &'static str,

    /// Magic bytes at the start of a container file
    pub magic: &'static [u8; 4],

    /// Magic bytes at the start of the nested resource pack
    pub pack_magic: &'static [u8; 4],

    /// Width of the NUL-padded title id field
    pub id_len: usize,

    /// Width of the NUL-padded display name field
    pub name_len: usize,

    /// Width of the NUL-padded description field
    pub description_len: usize,

    /// Icon edge length in pixels (icons are square)
    pub icon_size: u32,

    /// Bytes per icon pixel (RGB)
    pub icon_channels: u32,

    /// Number of tag slots
    pub tag_count: usize,

    /// Width of each NUL-padded tag slot
    pub tag_len: usize,
}

impl TitleFormat {
    /// Size of the icon pixel buffer in bytes.
    pub const fn icon_bytes(&self) -> usize {
        (self.icon_size * self.icon_size * self.icon_channels) as usize
    }

    /// Size of the fixed metadata record that follows the header.
    pub const fn metadata_bytes(&self) -> usize {
        self.id_len
            + self.name_len
            + self.description_len
            + self.icon_bytes()
            + self.tag_count * self.tag_len
    }
}

/// Glint title container format.
///
/// - Extension: `.glt`
/// - Container magic: `GLTE`
/// - Resource pack magic: `GLTR`
/// - Metadata: id[16], name[32], description[128], icon 128x128 RGB, tags[3][16]
pub const GLT_FORMAT: TitleFormat = TitleFormat {
    extension: "glt",
    magic: b"GLTE",
    pack_magic: b"GLTR",
    id_len: 16,
    name_len: 32,
    description_len: 128,
    icon_size: 128,
    icon_channels: 3,
    tag_count: 3,
    tag_len: 16,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glt_format_magic() {
        assert_eq!(GLT_FORMAT.magic, b"GLTE");
        assert_eq!(GLT_FORMAT.pack_magic, b"GLTR");
    }

    #[test]
    fn test_icon_bytes() {
        assert_eq!(GLT_FORMAT.icon_bytes(), 49152);
    }

    #[test]
    fn test_metadata_bytes() {
        // 16 + 32 + 128 + 49152 + 3 * 16
        assert_eq!(GLT_FORMAT.metadata_bytes(), 49376);
    }
}
