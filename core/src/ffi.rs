//! Host functions exported to titles
//!
//! Titles are loaded with global symbol visibility, so they call these by
//! name. The launcher binary is linked with `-rdynamic` to export them.

use std::ffi::{CStr, c_char};

use crate::mount::MountTable;

/// Resolve a virtual resource path (e.g. `S:/AppEmpty.png`).
///
/// Returns a pointer to the resource bytes and writes their length to
/// `out_size`, or returns null if the path does not resolve. The bytes stay
/// valid until the pack is unmounted or replaced.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string. `out_size` must be null or
/// point to writable memory for a `usize`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn glint_resolve_resource(
    path: *const c_char,
    out_size: *mut usize,
) -> *const u8 {
    if path.is_null() {
        return std::ptr::null();
    }
    // SAFETY: caller guarantees a NUL-terminated string
    let path = unsafe { CStr::from_ptr(path) };
    let Ok(path) = path.to_str() else {
        tracing::warn!("Resource path is not UTF-8: {:?}", path);
        return std::ptr::null();
    };

    // The table keeps its own reference, so the bytes outlive this Arc
    let Some(data) = MountTable::global().resolve(path) else {
        return std::ptr::null();
    };
    if !out_size.is_null() {
        // SAFETY: caller guarantees out_size is writable
        unsafe { *out_size = data.len() };
    }
    data.as_ptr()
}

/// Log a message from a title
///
/// # Safety
///
/// `message` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn glint_debug_print(message: *const c_char) {
    if message.is_null() {
        return;
    }
    // SAFETY: caller guarantees a NUL-terminated string
    let message = unsafe { CStr::from_ptr(message) };
    tracing::info!("[TITLE] {}", message.to_string_lossy());
}

/// Host functions exported to titles, by symbol name.
///
/// Executables reference this so the linker keeps the exports.
pub fn exported_symbols() -> [(&'static str, *const ()); 2] {
    [
        ("glint_resolve_resource", glint_resolve_resource as *const ()),
        ("glint_debug_print", glint_debug_print as *const ()),
    ]
}
