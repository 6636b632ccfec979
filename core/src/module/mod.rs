//! Title module loading
//!
//! A title's code blob is a native shared object. [`ModuleLoader`] turns a
//! [`Container`] into a callable [`TitleModule`]; the supervisor only ever
//! talks to these two traits, so an alternative backend can be substituted
//! without touching [`crate::title`].
//!
//! Entry points are looked up by name on every call. A missing entry point is
//! logged and treated as a no-op; int-returning calls yield [`CALL_FAILED`].

#[cfg(target_os = "linux")]
mod native;

#[cfg(target_os = "linux")]
pub use native::{NativeModule, NativeModuleLoader};

use std::ffi::c_void;
use std::sync::Arc;

use glt_common::Container;
use thiserror::Error;

/// Exported symbol names every title is expected to provide
pub mod entry {
    /// `void glattach(void* context)`
    pub const GL_ATTACH: &str = "glattach";
    /// `void app_setup(void)`
    pub const SETUP: &str = "app_setup";
    /// `int app_cycle(void)`
    pub const CYCLE: &str = "app_cycle";
    /// `int app_present(void)`
    pub const PRESENT: &str = "app_present";
    /// `void app_shutdown(void)`
    pub const SHUTDOWN: &str = "app_shutdown";
}

/// Return value of [`TitleModule::call_int`] when the symbol is missing
pub const CALL_FAILED: i32 = -1;

/// Results returned by `app_cycle`
pub mod cycle {
    pub const CONTINUE: i32 = 0;
    pub const EXIT: i32 = 1;
    pub const PAUSE: i32 = 2;
}

/// Errors that can occur while extracting a title module
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Container has no code blob")]
    MissingCode,

    #[error("Failed to create anonymous file: {0}")]
    AnonymousFile(#[source] std::io::Error),

    #[error("Failed to write code blob: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to load module {path}: {message}")]
    Open { path: String, message: String },

    #[error("Symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("Invalid symbol name: {0:?}")]
    InvalidName(String),

    #[error("Native title modules are not supported on this platform")]
    Unsupported,
}

/// Opaque graphics context pointer handed to a title's `glattach`.
///
/// The host owns the pointee. Ownership of the context itself moves between
/// threads by the attach/release protocol, never by this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHandle(*mut c_void);

// SAFETY: the handle is an opaque token passed through to foreign code; it is
// never dereferenced on the Rust side.
unsafe impl Send for ContextHandle {}
unsafe impl Sync for ContextHandle {}

impl ContextHandle {
    pub const NULL: Self = Self(std::ptr::null_mut());

    pub fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for ContextHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// A loaded, callable title module
pub trait TitleModule: Send {
    /// Call `void name(void)`; a missing symbol is logged and skipped
    fn call_void(&self, name: &str);

    /// Call `int name(void)`; a missing symbol returns [`CALL_FAILED`]
    fn call_int(&self, name: &str) -> i32;

    /// Call `void glattach(void*)` with the host's context
    fn call_attach(&self, context: ContextHandle);
}

/// Turns a container's code blob into a [`TitleModule`]
pub trait ModuleLoader: Send + Sync {
    fn extract(&self, container: &Container) -> Result<Box<dyn TitleModule>, LoadError>;
}

/// Loader used when the platform has no native backend
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedLoader;

impl ModuleLoader for UnsupportedLoader {
    fn extract(&self, container: &Container) -> Result<Box<dyn TitleModule>, LoadError> {
        if !container.has_code() {
            return Err(LoadError::MissingCode);
        }
        Err(LoadError::Unsupported)
    }
}

/// The platform's default module loader
pub fn default_loader() -> Arc<dyn ModuleLoader> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(NativeModuleLoader)
    }
    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(UnsupportedLoader)
    }
}

/// Extract a module, logging and returning `None` on failure
pub fn extract(loader: &dyn ModuleLoader, container: &Container) -> Option<Box<dyn TitleModule>> {
    match loader.extract(container) {
        Ok(module) => Some(module),
        Err(e) => {
            tracing::error!("Failed to extract title module: {}", e);
            None
        }
    }
}
