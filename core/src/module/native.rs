//! In-memory shared object loading (Linux)
//!
//! The code blob is written to an anonymous `memfd` and opened through its
//! `/proc/self/fd/N` path, so nothing touches the filesystem.
//!
//! The module is never `dlclose`d and the descriptor is never closed: glibc
//! caches loaded objects by path, and a reused descriptor number would hand
//! back the previous title's handle.

use std::ffi::{CStr, CString, c_void};
use std::fs::File;
use std::io::Write;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd};

use glt_common::Container;

use super::{CALL_FAILED, ContextHandle, LoadError, ModuleLoader, TitleModule, entry};

type VoidFn = unsafe extern "C" fn();
type IntFn = unsafe extern "C" fn() -> i32;
type AttachFn = unsafe extern "C" fn(*mut c_void);

/// A title module loaded from memory
pub struct NativeModule {
    handle: *mut c_void,
    path: String,
}

// SAFETY: the dlopen handle is process-global and dlsym is thread-safe.
unsafe impl Send for NativeModule {}

impl NativeModule {
    /// Load a shared object from bytes
    pub fn load(code: &[u8]) -> Result<Self, LoadError> {
        if code.is_empty() {
            return Err(LoadError::MissingCode);
        }

        let name = CString::new("title").map_err(|e| LoadError::InvalidName(e.to_string()))?;
        // SAFETY: name is a valid NUL-terminated string
        let fd = unsafe { libc::memfd_create(name.as_ptr(), libc::MFD_CLOEXEC) };
        if fd < 0 {
            return Err(LoadError::AnonymousFile(std::io::Error::last_os_error()));
        }
        // SAFETY: fd was just returned by memfd_create and is owned here
        let mut file = unsafe { File::from_raw_fd(fd) };
        file.write_all(code).map_err(LoadError::Write)?;

        let path = format!("/proc/self/fd/{}", file.as_raw_fd());
        let c_path = CString::new(path.clone()).map_err(|e| LoadError::InvalidName(e.to_string()))?;

        // SAFETY: c_path is valid; the loaded object runs its initialisers here
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_LAZY | libc::RTLD_GLOBAL) };
        if handle.is_null() {
            return Err(LoadError::Open {
                path,
                message: last_dl_error(),
            });
        }

        // Keep the descriptor open for the life of the process
        let _ = file.into_raw_fd();
        tracing::debug!("Loaded title module from {} ({} bytes)", path, code.len());

        Ok(Self { handle, path })
    }

    /// Path the module was opened from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolve a symbol as a function pointer of type `T`.
    ///
    /// # Safety
    ///
    /// `T` must be a function pointer type matching the symbol's signature.
    pub unsafe fn symbol<T: Copy>(&self, name: &str) -> Result<T, LoadError> {
        let c_name = CString::new(name).map_err(|_| LoadError::InvalidName(name.to_string()))?;

        // SAFETY: handle came from a successful dlopen; c_name is valid
        let symbol = unsafe {
            libc::dlerror();
            libc::dlsym(self.handle, c_name.as_ptr())
        };
        if symbol.is_null() {
            return Err(LoadError::SymbolNotFound {
                symbol: name.to_string(),
            });
        }

        // SAFETY: caller guarantees T is a matching fn pointer
        Ok(unsafe { std::mem::transmute_copy(&symbol) })
    }

    fn lookup<T: Copy>(&self, name: &str) -> Option<T> {
        // SAFETY: only called with the fn pointer aliases above
        match unsafe { self.symbol::<T>(name) } {
            Ok(f) => Some(f),
            Err(e) => {
                tracing::warn!("{} in {}", e, self.path);
                None
            }
        }
    }
}

impl TitleModule for NativeModule {
    fn call_void(&self, name: &str) {
        if let Some(f) = self.lookup::<VoidFn>(name) {
            // SAFETY: entry points take no arguments
            unsafe { f() }
        }
    }

    fn call_int(&self, name: &str) -> i32 {
        match self.lookup::<IntFn>(name) {
            // SAFETY: entry points take no arguments and return int
            Some(f) => unsafe { f() },
            None => CALL_FAILED,
        }
    }

    fn call_attach(&self, context: ContextHandle) {
        if let Some(f) = self.lookup::<AttachFn>(entry::GL_ATTACH) {
            // SAFETY: glattach takes the host's opaque context pointer
            unsafe { f(context.as_ptr()) }
        }
    }
}

fn last_dl_error() -> String {
    // SAFETY: dlerror returns a thread-local string or null
    unsafe {
        let err = libc::dlerror();
        if err.is_null() {
            "Unknown error".to_string()
        } else {
            CStr::from_ptr(err).to_string_lossy().into_owned()
        }
    }
}

/// [`ModuleLoader`] backed by `memfd_create` + `dlopen`
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeModuleLoader;

impl ModuleLoader for NativeModuleLoader {
    fn extract(&self, container: &Container) -> Result<Box<dyn TitleModule>, LoadError> {
        if !container.has_code() {
            return Err(LoadError::MissingCode);
        }
        Ok(Box::new(NativeModule::load(container.code())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glt_common::TitleMetadata;

    /// Path of the libm already mapped into the test process, if any
    fn mapped_libm() -> Option<String> {
        let maps = std::fs::read_to_string("/proc/self/maps").ok()?;
        maps.lines()
            .filter_map(|line| line.split_whitespace().nth(5))
            .find(|path| path.contains("/libm.so") || path.contains("/libm-"))
            .map(str::to_string)
    }

    #[test]
    fn test_empty_code_is_missing() {
        assert!(matches!(NativeModule::load(&[]), Err(LoadError::MissingCode)));

        let container = Container::new(&TitleMetadata::new("id", "name"), b"", b"").unwrap();
        assert!(matches!(
            NativeModuleLoader.extract(&container),
            Err(LoadError::MissingCode)
        ));
    }

    #[test]
    fn test_garbage_code_fails_to_open() {
        let result = NativeModule::load(b"definitely not an ELF object");
        match result {
            Err(LoadError::Open { path, message }) => {
                assert!(path.starts_with("/proc/self/fd/"));
                assert!(!message.is_empty());
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("garbage loaded as a module"),
        }
    }

    #[test]
    fn test_load_shared_object_from_memory() {
        // Rust test binaries link libm; skip where it isn't a separate object
        let Some(path) = mapped_libm() else {
            return;
        };
        let Ok(code) = std::fs::read(&path) else {
            return;
        };

        let module = NativeModule::load(&code).unwrap();
        assert!(module.path().starts_with("/proc/self/fd/"));

        // Default rounding mode is FE_TONEAREST (0)
        assert_eq!(module.call_int("fegetround"), 0);
        assert_eq!(module.call_int("app_cycle_missing"), CALL_FAILED);
        module.call_void("app_setup_missing");
        // SAFETY: looked up only to check presence
        assert!(unsafe { module.symbol::<VoidFn>("no_such_symbol") }.is_err());
    }
}
