//! NUL-padded fixed-width text fields.

/// Read a NUL-padded field, stopping at the first NUL.
///
/// Invalid UTF-8 is replaced rather than rejected; metadata is display text.
pub fn read_fixed_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Write `value` into a NUL-padded field.
///
/// At most `dst.len() - 1` bytes are copied so the field always keeps a
/// terminating NUL. Truncation happens on a char boundary.
pub fn write_fixed_str(dst: &mut [u8], value: &str) {
    dst.fill(0);
    let Some(max) = dst.len().checked_sub(1) else {
        return;
    };
    let mut end = value.len().min(max);
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    dst[..end].copy_from_slice(&value.as_bytes()[..end]);
}
