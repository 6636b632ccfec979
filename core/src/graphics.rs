//! Graphics context seam
//!
//! The GPU context is shared between the host and the running title but may
//! be current on only one thread at a time. Windowing and rendering live
//! outside this crate; the supervisor only needs to hand the raw context to
//! the title and release it from whichever thread is giving it up.

use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};

use crate::module::ContextHandle;

/// Host-provided graphics context
pub trait GraphicsContext: Send + Sync {
    /// Raw handle passed to the title's `glattach`
    fn handle(&self) -> ContextHandle;

    /// Make the context current on the calling thread
    fn make_current(&self);

    /// Detach the context from the calling thread (`MakeContextCurrent(NULL)`)
    fn release_current(&self);

    /// Whether the context is current on the calling thread
    fn is_current(&self) -> bool;

    /// Upload a title icon, returning the texture id
    fn create_icon_texture(&self, _width: u32, _height: u32, _rgb: &[u8]) -> Option<u32> {
        None
    }
}

/// Context stand-in for headless runs.
///
/// Tracks which thread holds it so handoff mistakes show up in logs.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    owner: Mutex<Option<ThreadId>>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thread currently holding the context
    pub fn owner(&self) -> Option<ThreadId> {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GraphicsContext for HeadlessContext {
    fn handle(&self) -> ContextHandle {
        ContextHandle::NULL
    }

    fn make_current(&self) {
        let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        let me = thread::current().id();
        if let Some(other) = *owner
            && other != me
        {
            tracing::warn!("Graphics context taken while current on {:?}", other);
        }
        *owner = Some(me);
    }

    fn release_current(&self) {
        let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        if *owner == Some(thread::current().id()) {
            *owner = None;
        }
    }

    fn is_current(&self) -> bool {
        self.owner() == Some(thread::current().id())
    }
}
