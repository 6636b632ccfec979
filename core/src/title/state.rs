//! State shared between the host thread and a title's worker thread

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Lifecycle of a launched title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TitleState {
    /// Module loaded, worker not yet running
    Extracted,
    /// Worker thread started, waiting out the warmup
    Starting,
    /// Title owns the graphics context (or is waiting for the host to hand it off)
    Running,
    /// Title yielded to the host; the host owns the context
    Paused,
    /// Worker finished; the runtime can be reaped
    Exited,
}

impl fmt::Display for TitleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TitleState::Extracted => "extracted",
            TitleState::Starting => "starting",
            TitleState::Running => "running",
            TitleState::Paused => "paused",
            TitleState::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// Point-in-time copy of a title's shared state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleSnapshot {
    pub state: TitleState,
    /// The title's loop is executing
    pub running: bool,
    /// Control has been yielded back to the host
    pub paused: bool,
    /// Last value returned by `app_present`
    pub present_result: i32,
    /// Number of `app_cycle` calls so far
    pub frames: u64,
}

#[derive(Debug)]
pub(crate) struct SharedState {
    pub state: TitleState,
    pub running: bool,
    pub paused: bool,
    pub stop_requested: bool,
    pub handed_off: bool,
    pub present_result: i32,
    pub frames: u64,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            state: TitleState::Extracted,
            running: false,
            paused: false,
            stop_requested: false,
            handed_off: false,
            // Keeps the host presenting until the title's first frame
            present_result: 1,
            frames: 0,
        }
    }
}

/// Mutex-guarded state plus a condvar notified on every change
#[derive(Debug, Default)]
pub(crate) struct Shared {
    state: Mutex<SharedState>,
    changed: Condvar,
}

impl Shared {
    pub fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the state and wake every waiter
    pub fn update<R>(&self, f: impl FnOnce(&mut SharedState) -> R) -> R {
        let result = f(&mut self.lock());
        self.changed.notify_all();
        result
    }

    /// Block while `condition` holds
    pub fn wait_while(
        &self,
        mut condition: impl FnMut(&SharedState) -> bool,
    ) -> MutexGuard<'_, SharedState> {
        self.changed
            .wait_while(self.lock(), |s| condition(s))
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block while `condition` holds, for at most `timeout`
    pub fn wait_timeout_while(
        &self,
        timeout: Duration,
        mut condition: impl FnMut(&SharedState) -> bool,
    ) -> MutexGuard<'_, SharedState> {
        self.changed
            .wait_timeout_while(self.lock(), timeout, |s| condition(s))
            .unwrap_or_else(PoisonError::into_inner)
            .0
    }

    pub fn snapshot(&self) -> TitleSnapshot {
        let s = self.lock();
        TitleSnapshot {
            state: s.state,
            running: s.running,
            paused: s.paused,
            present_result: s.present_result,
            frames: s.frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_initial_state() {
        let shared = Shared::default();
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.state, TitleState::Extracted);
        assert!(!snapshot.running);
        assert!(!snapshot.paused);
        assert_eq!(snapshot.present_result, 1);
        assert_eq!(snapshot.frames, 0);
    }

    #[test]
    fn test_update_wakes_waiter() {
        let shared = Arc::new(Shared::default());
        let waiter = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || shared.wait_while(|s| !s.handed_off).frames)
        };

        shared.update(|s| {
            s.frames = 3;
            s.handed_off = true;
        });
        assert_eq!(waiter.join().unwrap(), 3);
    }

    #[test]
    fn test_wait_timeout_returns_current_state() {
        let shared = Shared::default();
        let guard = shared.wait_timeout_while(Duration::from_millis(10), |s| !s.running);
        assert!(!guard.running);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TitleState::Paused.to_string(), "paused");
        assert_eq!(TitleState::Exited.to_string(), "exited");
    }
}
