//! Title worker thread and its host-side handle
//!
//! # Protocol
//!
//! ```text
//! Host thread                          Title worker
//!     │                                    │
//! [launch]───────────spawn──────────────►[warmup]
//!     │                                  running = true
//! [sees Running, releases context]         │
//! [hand_off]──────────────────────────►[attach, app_setup]
//!     │                                  loop {
//!     │                                    app_cycle: 0 continue
//!     │                                               1 running = false
//!     │                                               2 release, paused = true
//!     │                                    app_present
//! [sees Paused, shows home]                wait while paused
//! [resume: paused = false]────────────►    reattach
//!     │                                  }
//!     │                                  app_shutdown, release
//! [sees Exited, reaps]◄───────────────── paused = true, running = false
//! ```
//!
//! The host never blocks on the worker; it polls [`TitleRuntime::snapshot`]
//! once per frame.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use glt_common::TitleMetadata;
use tracing::{debug, error, info, warn};

use super::state::{Shared, TitleSnapshot, TitleState};
use crate::config::SupervisorConfig;
use crate::graphics::GraphicsContext;
use crate::module::{ContextHandle, TitleModule, cycle, entry};

/// Host-side handle to a launched title
pub struct TitleRuntime {
    metadata: TitleMetadata,
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl TitleRuntime {
    /// Spawn the worker thread for an extracted module
    pub(crate) fn spawn(
        metadata: TitleMetadata,
        module: Box<dyn TitleModule>,
        graphics: Arc<dyn GraphicsContext>,
        config: &SupervisorConfig,
    ) -> std::io::Result<Self> {
        let shared = Arc::new(Shared::default());
        let worker = TitleWorker {
            module,
            context: graphics.handle(),
            graphics,
            shared: Arc::clone(&shared),
            warmup: config.warmup(),
            await_handoff: config.await_handoff,
        };

        let name = if metadata.id.is_empty() {
            "title".to_string()
        } else {
            format!("title-{}", metadata.id)
        };
        let thread = thread::Builder::new().name(name).spawn(move || worker.run())?;

        Ok(Self {
            metadata,
            shared,
            thread: Some(thread),
        })
    }

    pub fn metadata(&self) -> &TitleMetadata {
        &self.metadata
    }

    pub fn state(&self) -> TitleState {
        self.shared.lock().state
    }

    pub fn snapshot(&self) -> TitleSnapshot {
        self.shared.snapshot()
    }

    /// The title's loop is executing
    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Control has been yielded to the host (or the title has exited)
    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    /// Last value returned by `app_present`
    pub fn present_result(&self) -> i32 {
        self.shared.lock().present_result
    }

    /// Number of `app_cycle` calls so far
    pub fn frames(&self) -> u64 {
        self.shared.lock().frames
    }

    /// The worker has finished and the runtime can be reaped
    pub fn is_finished(&self) -> bool {
        self.state() == TitleState::Exited
    }

    /// Signal that the host released the graphics context
    pub fn hand_off(&self) {
        self.shared.update(|s| {
            if !s.handed_off {
                debug!("Graphics context handed off to {}", self.metadata.id);
                s.handed_off = true;
            }
        });
    }

    /// Return control to a paused title.
    ///
    /// The host must release its graphics context first.
    pub fn resume(&self) -> bool {
        self.shared.update(|s| {
            if s.state != TitleState::Paused || !s.running {
                return false;
            }
            s.paused = false;
            s.state = TitleState::Running;
            true
        })
    }

    /// Ask the title to stop at its next check.
    ///
    /// Wakes a paused worker so it can run `app_shutdown`; a title spinning
    /// inside its own code cannot be interrupted.
    pub fn request_stop(&self) {
        self.shared.update(|s| {
            s.stop_requested = true;
            s.running = false;
        });
    }

    /// Block until the title reaches `target` or `timeout` elapses
    pub fn wait_for_state(&self, target: TitleState, timeout: Duration) -> bool {
        self.shared
            .wait_timeout_while(timeout, |s| s.state != target)
            .state
            == target
    }

    /// Block until the worker thread finishes
    pub fn join(mut self) {
        self.join_thread();
    }

    fn join_thread(&mut self) {
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("Title thread for {} panicked", self.metadata.id);
        }
    }
}

impl Drop for TitleRuntime {
    fn drop(&mut self) {
        if self.is_finished() {
            self.join_thread();
        } else if self.thread.is_some() {
            warn!(
                "Dropping title {} while {}; detaching its thread",
                self.metadata.id,
                self.state()
            );
            self.request_stop();
        }
    }
}

/// Everything the worker thread owns
struct TitleWorker {
    module: Box<dyn TitleModule>,
    graphics: Arc<dyn GraphicsContext>,
    context: ContextHandle,
    shared: Arc<Shared>,
    warmup: Duration,
    await_handoff: bool,
}

impl TitleWorker {
    fn run(self) {
        self.shared.update(|s| s.state = TitleState::Starting);

        if !self.warmup.is_zero() {
            drop(
                self.shared
                    .wait_timeout_while(self.warmup, |s| !s.stop_requested),
            );
        }

        let started = self.shared.update(|s| {
            if s.stop_requested {
                return false;
            }
            s.running = true;
            s.state = TitleState::Running;
            true
        });

        let ready = started
            && (!self.await_handoff
                || self.shared.wait_while(|s| !s.handed_off && s.running).running);

        if ready {
            self.attach();
            self.module.call_void(entry::SETUP);
            info!("Title thread started");
            self.run_loop();
            self.module.call_void(entry::SHUTDOWN);
            self.graphics.release_current();
        } else {
            info!("Title stopped before it was handed the graphics context");
        }

        self.shared.update(|s| {
            s.running = false;
            s.paused = true;
            s.state = TitleState::Exited;
        });
        info!("Title thread exiting");
    }

    fn run_loop(&self) {
        while self.shared.lock().running {
            let result = self.module.call_int(entry::CYCLE);
            self.shared.update(|s| s.frames += 1);

            let pause = match result {
                cycle::EXIT => {
                    info!("Title requested exit");
                    self.shared.update(|s| s.running = false);
                    false
                }
                cycle::PAUSE => {
                    info!("Title requested pause");
                    self.graphics.release_current();
                    self.shared.update(|s| {
                        s.paused = true;
                        s.state = TitleState::Paused;
                    });
                    true
                }
                _ => false,
            };

            let present = self.module.call_int(entry::PRESENT);
            self.shared.update(|s| s.present_result = present);

            if pause {
                let still_running = self.shared.wait_while(|s| s.paused && s.running).running;
                if !still_running {
                    // The host may still hold the context, so shutdown runs without it
                    break;
                }
                debug!("Title resumed");
                self.attach();
            }
        }
    }

    fn attach(&self) {
        self.graphics.make_current();
        self.module.call_attach(self.context);
    }
}
