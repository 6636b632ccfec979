//! Icon conversion to the container's fixed RGB8 layout

use std::path::Path;

use anyhow::{Context, Result};
use glint_shared::GLT_FORMAT;
use image::imageops::FilterType;

/// Load an image and convert it to `icon_size`×`icon_size` RGB8 pixels.
///
/// Images of any other size are resized to fit exactly.
pub fn load_icon(path: &Path) -> Result<Vec<u8>> {
    let img =
        image::open(path).with_context(|| format!("Failed to load icon: {}", path.display()))?;
    Ok(convert_icon(img))
}

/// Convert a decoded image to the icon layout
pub fn convert_icon(img: image::DynamicImage) -> Vec<u8> {
    let size = GLT_FORMAT.icon_size;
    let img = if img.width() == size && img.height() == size {
        img
    } else {
        img.resize_exact(size, size, FilterType::Triangle)
    };
    img.to_rgb8().into_raw()
}
