//! Host side of the title handoff
//!
//! The home shell runs on the host thread and owns the graphics context
//! whenever no title is running. [`HostSession`] is polled once per host
//! frame and turns the running title's state into [`HostEvent`]s, moving the
//! context across at the right moments.

use glt_common::Container;

use crate::graphics::GraphicsContext;
use crate::title::{LaunchError, TitleRuntime, TitleState, TitleSupervisor};

/// What the host should do this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// No title launched; run the home shell
    Idle,
    /// Title thread is warming up; keep presenting
    Starting,
    /// Title owns the graphics context; don't touch it
    Active,
    /// Title just paused to home; the host owns the context again
    Returned,
    /// Title is still paused
    Paused,
    /// Title finished and was reaped
    Exited { id: String },
}

/// Per-frame coordinator between the home shell and one title
pub struct HostSession {
    supervisor: TitleSupervisor,
    runtime: Option<TitleRuntime>,
    returned: bool,
}

impl HostSession {
    pub fn new(supervisor: TitleSupervisor) -> Self {
        Self {
            supervisor,
            runtime: None,
            returned: false,
        }
    }

    pub fn supervisor(&self) -> &TitleSupervisor {
        &self.supervisor
    }

    pub fn runtime(&self) -> Option<&TitleRuntime> {
        self.runtime.as_ref()
    }

    /// Whether the title currently owns the graphics context
    pub fn is_title_active(&self) -> bool {
        self.runtime
            .as_ref()
            .is_some_and(|rt| rt.state() == TitleState::Running)
    }

    /// Launch a title; only one may run at a time
    pub fn launch(&mut self, container: &Container) -> Result<&TitleRuntime, LaunchError> {
        if let Some(runtime) = &self.runtime {
            return Err(LaunchError::Busy {
                id: runtime.metadata().id.clone(),
            });
        }
        self.returned = false;
        Ok(self.runtime.insert(self.supervisor.launch(container)?))
    }

    /// Poll the title once
    pub fn update(&mut self) -> HostEvent {
        let graphics = self.supervisor.graphics();
        let Some(runtime) = &self.runtime else {
            return HostEvent::Idle;
        };

        match runtime.state() {
            TitleState::Extracted | TitleState::Starting => HostEvent::Starting,
            TitleState::Running => {
                if graphics.is_current() {
                    graphics.release_current();
                }
                runtime.hand_off();
                self.returned = false;
                HostEvent::Active
            }
            TitleState::Paused => {
                if self.returned {
                    HostEvent::Paused
                } else {
                    tracing::info!("Title {} returned to home", runtime.metadata().id);
                    self.returned = true;
                    graphics.make_current();
                    HostEvent::Returned
                }
            }
            TitleState::Exited => {
                let id = runtime.metadata().id.clone();
                if let Some(runtime) = self.runtime.take() {
                    runtime.join();
                }
                self.returned = false;
                graphics.make_current();
                tracing::info!("Title {} exited", id);
                HostEvent::Exited { id }
            }
        }
    }

    /// Give the context back to a paused title
    pub fn resume(&mut self) -> bool {
        let Some(runtime) = &self.runtime else {
            return false;
        };
        if runtime.state() != TitleState::Paused {
            return false;
        }
        self.supervisor.graphics().release_current();
        self.returned = false;
        runtime.resume()
    }

    /// Ask the title to stop; it is reaped by a later [`update`](Self::update)
    pub fn stop(&mut self) {
        if let Some(runtime) = &self.runtime {
            runtime.request_stop();
        }
    }

    /// Run the host's present, or report the title's while it owns the context
    pub fn present(&self, host_present: impl FnOnce() -> i32) -> i32 {
        match &self.runtime {
            Some(runtime) if runtime.state() == TitleState::Running => runtime.present_result(),
            _ => host_present(),
        }
    }
}

impl Drop for HostSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::SupervisorConfig;
    use crate::test_utils::{CallLog, RecordingContext, ScriptedLoader, test_container};

    fn session(scripts: Vec<Vec<i32>>) -> (HostSession, Arc<RecordingContext>) {
        let log = CallLog::new();
        let graphics = Arc::new(RecordingContext::new(log.clone()));
        let supervisor = TitleSupervisor::new(
            Arc::new(ScriptedLoader::new(scripts, log)),
            graphics.clone(),
            SupervisorConfig::default(),
        );
        graphics.make_current();
        (HostSession::new(supervisor), graphics)
    }

    fn poll_until(session: &mut HostSession, f: impl Fn(&HostEvent) -> bool) -> HostEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let event = session.update();
            if f(&event) {
                return event;
            }
            assert!(Instant::now() < deadline, "last event: {:?}", event);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_idle_without_title() {
        let (mut session, graphics) = session(vec![]);
        assert_eq!(session.update(), HostEvent::Idle);
        assert_eq!(session.present(|| 1), 1);
        assert!(!session.resume());
        assert!(graphics.is_current());
    }

    #[test]
    fn test_pause_resume_and_stop() {
        let (mut session, graphics) = session(vec![vec![0, 0, 2]]);
        session.launch(&test_container("home-test", &[])).unwrap();

        poll_until(&mut session, |e| *e == HostEvent::Active);
        assert!(!graphics.is_current());

        poll_until(&mut session, |e| *e == HostEvent::Returned);
        assert!(graphics.is_current());
        assert_eq!(session.update(), HostEvent::Paused);
        assert_eq!(session.present(|| 7), 7);

        assert!(session.resume());
        assert!(!graphics.is_current());
        poll_until(&mut session, |e| *e == HostEvent::Active);
        // Scripted titles present 1 (keep running)
        assert_eq!(session.present(|| 7), 1);

        session.stop();
        let event = poll_until(&mut session, |e| matches!(e, HostEvent::Exited { .. }));
        assert_eq!(event, HostEvent::Exited {
            id: "home-test".to_string()
        });
        assert!(graphics.is_current());
        assert_eq!(session.update(), HostEvent::Idle);
    }

    #[test]
    fn test_title_exit_is_reaped() {
        let (mut session, graphics) = session(vec![vec![0, 1]]);
        session.launch(&test_container("quick", &[])).unwrap();

        poll_until(&mut session, |e| matches!(e, HostEvent::Exited { .. }));
        assert!(session.runtime().is_none());
        assert!(graphics.is_current());
    }

    #[test]
    fn test_only_one_title_at_a_time() {
        let (mut session, _graphics) = session(vec![vec![], vec![]]);
        session.launch(&test_container("first", &[])).unwrap();

        assert!(matches!(
            session.launch(&test_container("second", &[])),
            Err(LaunchError::Busy { id }) if id == "first"
        ));

        session.stop();
        poll_until(&mut session, |e| matches!(e, HostEvent::Exited { .. }));
        assert!(session.launch(&test_container("second", &[])).is_ok());
        session.stop();
        poll_until(&mut session, |e| matches!(e, HostEvent::Exited { .. }));
    }
}
