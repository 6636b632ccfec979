//! Tests for the title supervisor

use std::sync::Arc;
use std::time::{Duration, Instant};

use glt_common::{Container, TitleMetadata};

use super::*;
use crate::config::SupervisorConfig;
use crate::module::LoadError;
use crate::test_utils::{
    Call, CallLog, RecordingContext, ScriptedLoader, immediate_config, test_container,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn supervisor(scripts: Vec<Vec<i32>>, config: SupervisorConfig) -> (TitleSupervisor, CallLog) {
    let log = CallLog::new();
    let supervisor = TitleSupervisor::new(
        Arc::new(ScriptedLoader::new(scripts, log.clone())),
        Arc::new(RecordingContext::new(log.clone())),
        config,
    );
    (supervisor, log)
}

fn wait_for(timeout: Duration, f: impl Fn() -> bool) {
    let deadline = Instant::now() + timeout;
    while !f() {
        assert!(Instant::now() < deadline, "condition not met in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_pause_releases_context_before_host_sees_paused() {
    let (supervisor, log) = supervisor(vec![vec![0, 0, 2]], immediate_config());
    let runtime = supervisor.launch(&test_container("pause", &[])).unwrap();

    assert!(runtime.wait_for_state(TitleState::Paused, TIMEOUT));
    let snapshot = runtime.snapshot();
    assert!(snapshot.running);
    assert!(snapshot.paused);
    assert_eq!(snapshot.frames, 3);
    assert_eq!(&log.calls()[..9], &[
        Call::Acquire,
        Call::Attach,
        Call::Setup,
        Call::Cycle(0),
        Call::Present,
        Call::Cycle(0),
        Call::Present,
        Call::Cycle(2),
        Call::Release,
    ]);

    // Force-stop while paused
    runtime.request_stop();
    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));
    assert_eq!(log.count(&Call::Shutdown), 1);
    // Shutdown runs without reattaching the context the host holds
    assert_eq!(&log.calls()[9..], &[Call::Present, Call::Shutdown, Call::Release]);
    assert_eq!(log.count(&Call::Attach), 1);
    assert!(!runtime.resume());
    runtime.join();
}

#[test]
fn test_exit_calls_shutdown_once() {
    let (supervisor, log) = supervisor(vec![vec![0, 1]], immediate_config());
    let runtime = supervisor.launch(&test_container("exit", &[])).unwrap();

    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));
    assert_eq!(log.calls(), vec![
        Call::Acquire,
        Call::Attach,
        Call::Setup,
        Call::Cycle(0),
        Call::Present,
        Call::Cycle(1),
        Call::Present,
        Call::Shutdown,
        Call::Release,
    ]);

    let snapshot = runtime.snapshot();
    assert!(!snapshot.running);
    assert!(snapshot.paused);
    assert_eq!(snapshot.frames, 2);
    runtime.join();
}

#[test]
fn test_resume_reattaches_context() {
    let (supervisor, log) = supervisor(vec![vec![2, 1]], immediate_config());
    let runtime = supervisor.launch(&test_container("resume", &[])).unwrap();

    assert!(runtime.wait_for_state(TitleState::Paused, TIMEOUT));
    assert!(runtime.resume());
    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));

    assert_eq!(log.calls(), vec![
        Call::Acquire,
        Call::Attach,
        Call::Setup,
        Call::Cycle(2),
        Call::Release,
        Call::Present,
        Call::Acquire,
        Call::Attach,
        Call::Cycle(1),
        Call::Present,
        Call::Shutdown,
        Call::Release,
    ]);
    runtime.join();
}

#[test]
fn test_title_waits_for_handoff() {
    let config = SupervisorConfig {
        warmup_ms: 0,
        await_handoff: true,
    };
    let (supervisor, log) = supervisor(vec![vec![1]], config);
    let runtime = supervisor.launch(&test_container("handoff", &[])).unwrap();

    assert!(runtime.wait_for_state(TitleState::Running, TIMEOUT));
    assert!(runtime.is_running());
    std::thread::sleep(Duration::from_millis(20));
    assert!(log.calls().is_empty());

    runtime.hand_off();
    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));
    assert_eq!(log.calls()[..3], [Call::Acquire, Call::Attach, Call::Setup]);
    assert_eq!(log.count(&Call::Shutdown), 1);
    runtime.join();
}

#[test]
fn test_stop_before_handoff_skips_setup() {
    let config = SupervisorConfig {
        warmup_ms: 0,
        await_handoff: true,
    };
    let (supervisor, log) = supervisor(vec![vec![]], config);
    let runtime = supervisor.launch(&test_container("early", &[])).unwrap();

    assert!(runtime.wait_for_state(TitleState::Running, TIMEOUT));
    runtime.request_stop();
    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));

    assert!(log.calls().is_empty());
    let snapshot = runtime.snapshot();
    assert!(!snapshot.running);
    assert!(snapshot.paused);
    runtime.join();
}

#[test]
fn test_stop_during_warmup() {
    let config = SupervisorConfig {
        warmup_ms: 60_000,
        await_handoff: false,
    };
    let (supervisor, log) = supervisor(vec![vec![]], config);
    let runtime = supervisor.launch(&test_container("warmup", &[])).unwrap();

    assert!(runtime.wait_for_state(TitleState::Starting, TIMEOUT));
    runtime.request_stop();
    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));
    assert!(log.calls().is_empty());
    runtime.join();
}

#[test]
fn test_stop_running_title() {
    let (supervisor, log) = supervisor(vec![vec![]], immediate_config());
    let runtime = supervisor.launch(&test_container("spin", &[])).unwrap();

    wait_for(TIMEOUT, || runtime.frames() >= 3);
    runtime.request_stop();
    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));
    assert_eq!(log.count(&Call::Setup), 1);
    assert_eq!(log.count(&Call::Shutdown), 1);
    runtime.join();
}

#[test]
fn test_present_result_is_surfaced() {
    let log = CallLog::new();
    let supervisor = TitleSupervisor::new(
        Arc::new(ScriptedLoader::new(vec![vec![]], log.clone()).with_present(0)),
        Arc::new(RecordingContext::new(log.clone())),
        immediate_config(),
    );
    let runtime = supervisor.launch(&test_container("present", &[])).unwrap();
    assert_eq!(runtime.metadata().id, "present");

    wait_for(TIMEOUT, || runtime.present_result() == 0);
    runtime.request_stop();
    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));
    runtime.join();
}

#[test]
fn test_resume_requires_pause() {
    let config = SupervisorConfig {
        warmup_ms: 0,
        await_handoff: true,
    };
    let (supervisor, _log) = supervisor(vec![vec![]], config);
    let runtime = supervisor.launch(&test_container("noresume", &[])).unwrap();

    assert!(runtime.wait_for_state(TitleState::Running, TIMEOUT));
    assert!(!runtime.resume());
    runtime.request_stop();
    assert!(runtime.wait_for_state(TitleState::Exited, TIMEOUT));
    runtime.join();
}

#[test]
fn test_launch_without_code_fails() {
    let (supervisor, _log) = supervisor(vec![], immediate_config());
    let container = Container::new(&TitleMetadata::new("empty", "Empty"), b"", b"").unwrap();

    assert!(matches!(
        supervisor.launch(&container),
        Err(LaunchError::Load(LoadError::MissingCode))
    ));
}

#[test]
fn test_load_metadata_uploads_icon() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon.glt");
    let metadata = TitleMetadata::new("icon", "Icon Test").with_tags(["demo"]);
    std::fs::write(&path, Container::encode(&metadata, b"code", b"").unwrap()).unwrap();

    let (supervisor, _log) = supervisor(vec![], immediate_config());
    let info = supervisor.load_metadata(&path).unwrap();
    assert_eq!(info.metadata, metadata);
    assert_eq!(info.icon_texture, Some(1));

    assert!(supervisor.load_metadata(&dir.path().join("missing.glt")).is_none());
}
