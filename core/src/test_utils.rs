//! Shared test utilities for unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use glt_common::{Container, ResourcePack, TitleMetadata};

use crate::config::SupervisorConfig;
use crate::graphics::GraphicsContext;
use crate::module::{ContextHandle, LoadError, ModuleLoader, TitleModule, cycle, entry};

// ============================================================================
// Call recording
// ============================================================================

/// One observable call into a title module or graphics context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Context made current on the calling thread
    Acquire,
    /// Context released from the calling thread
    Release,
    Attach,
    Setup,
    Cycle(i32),
    Present,
    Shutdown,
    /// Any other entry point, by name
    Other(String),
}

/// Ordered call log shared between a module, a context and the test
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

// ============================================================================
// Scripted title module
// ============================================================================

/// Title module that replays a fixed list of `app_cycle` results.
///
/// Once the script runs out, `app_cycle` returns `CONTINUE`.
pub struct ScriptedModule {
    script: Mutex<VecDeque<i32>>,
    presents: Mutex<VecDeque<i32>>,
    present: i32,
    log: CallLog,
}

impl ScriptedModule {
    pub fn new(script: &[i32], log: CallLog) -> Self {
        Self {
            script: Mutex::new(script.iter().copied().collect()),
            presents: Mutex::new(VecDeque::new()),
            present: 1,
            log,
        }
    }

    /// Value returned by `app_present` once `presents` runs out
    pub fn with_present(mut self, present: i32) -> Self {
        self.present = present;
        self
    }

    /// Values returned by the first `app_present` calls
    pub fn with_presents(self, presents: &[i32]) -> Self {
        *self.presents.lock().unwrap() = presents.iter().copied().collect();
        self
    }
}

impl TitleModule for ScriptedModule {
    fn call_void(&self, name: &str) {
        let call = match name {
            entry::SETUP => Call::Setup,
            entry::SHUTDOWN => Call::Shutdown,
            other => Call::Other(other.to_string()),
        };
        self.log.push(call);
    }

    fn call_int(&self, name: &str) -> i32 {
        match name {
            entry::CYCLE => {
                let result = self
                    .script
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or(cycle::CONTINUE);
                self.log.push(Call::Cycle(result));
                // Keep unscripted loops from spinning flat out
                if result == cycle::CONTINUE {
                    std::thread::sleep(Duration::from_millis(1));
                }
                result
            }
            entry::PRESENT => {
                self.log.push(Call::Present);
                self.presents
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or(self.present)
            }
            other => {
                self.log.push(Call::Other(other.to_string()));
                crate::module::CALL_FAILED
            }
        }
    }

    fn call_attach(&self, _context: ContextHandle) {
        self.log.push(Call::Attach);
    }
}

/// Loader handing out [`ScriptedModule`]s, one per script, in order
pub struct ScriptedLoader {
    scripts: Mutex<VecDeque<Vec<i32>>>,
    present: i32,
    presents: Vec<i32>,
    log: CallLog,
}

impl ScriptedLoader {
    pub fn new(scripts: Vec<Vec<i32>>, log: CallLog) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            present: 1,
            presents: Vec::new(),
            log,
        }
    }

    pub fn with_present(mut self, present: i32) -> Self {
        self.present = present;
        self
    }

    pub fn with_presents(mut self, presents: &[i32]) -> Self {
        self.presents = presents.to_vec();
        self
    }
}

impl ModuleLoader for ScriptedLoader {
    fn extract(&self, container: &Container) -> Result<Box<dyn TitleModule>, LoadError> {
        if !container.has_code() {
            return Err(LoadError::MissingCode);
        }
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::new(
            ScriptedModule::new(&script, self.log.clone())
                .with_present(self.present)
                .with_presents(&self.presents),
        ))
    }
}

// ============================================================================
// Recording graphics context
// ============================================================================

/// Graphics context that records acquire/release into a [`CallLog`]
pub struct RecordingContext {
    owner: Mutex<Option<std::thread::ThreadId>>,
    log: CallLog,
}

impl RecordingContext {
    pub fn new(log: CallLog) -> Self {
        Self {
            owner: Mutex::new(None),
            log,
        }
    }

    pub fn owner(&self) -> Option<std::thread::ThreadId> {
        *self.owner.lock().unwrap()
    }
}

impl GraphicsContext for RecordingContext {
    fn handle(&self) -> ContextHandle {
        ContextHandle::NULL
    }

    fn make_current(&self) {
        *self.owner.lock().unwrap() = Some(std::thread::current().id());
        self.log.push(Call::Acquire);
    }

    fn release_current(&self) {
        let mut owner = self.owner.lock().unwrap();
        if *owner == Some(std::thread::current().id()) {
            *owner = None;
        }
        self.log.push(Call::Release);
    }

    fn is_current(&self) -> bool {
        self.owner() == Some(std::thread::current().id())
    }

    fn create_icon_texture(&self, width: u32, height: u32, rgb: &[u8]) -> Option<u32> {
        (rgb.len() == (width * height * 3) as usize).then_some(1)
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Supervisor settings that start titles immediately
pub fn immediate_config() -> SupervisorConfig {
    SupervisorConfig {
        warmup_ms: 0,
        await_handoff: false,
    }
}

/// A container with placeholder code and the given resources
pub fn test_container(id: &str, resources: &[(&str, &[u8])]) -> Container {
    let mut pack = ResourcePack::new();
    for (path, data) in resources {
        pack.push(*path, data.to_vec());
    }
    Container::new(
        &TitleMetadata::new(id, format!("Title {id}")),
        b"\x7fELF",
        &pack.to_bytes().unwrap(),
    )
    .unwrap()
}
