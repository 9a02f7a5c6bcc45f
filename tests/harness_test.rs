/*!
 * Harness Integration Tests
 * Settings from the environment, sessions and the exit decision
 */

use pretty_assertions::assert_eq;
use readiness_signals::harness::{
    DUPLICATE_POLICY_VAR, GAME_DIR_VAR, SHUTDOWN_ON_ERROR_VAR, SHUTDOWN_ON_FAILURE_VAR,
    SHUTDOWN_ON_SUCCESS_VAR, STARTUP_TIMEOUT_VAR,
};
use readiness_signals::{
    DuplicatePolicy, HarnessError, HarnessResult, HarnessSettings, LaunchSession,
    ReadinessRegistry, ShutdownAction, SignalError, SignalName, TimeoutPolicy,
};
use serial_test::serial;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn clear_env() {
    for key in [
        DUPLICATE_POLICY_VAR,
        GAME_DIR_VAR,
        SHUTDOWN_ON_ERROR_VAR,
        SHUTDOWN_ON_FAILURE_VAR,
        SHUTDOWN_ON_SUCCESS_VAR,
        STARTUP_TIMEOUT_VAR,
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_settings_from_env() {
    clear_env();
    std::env::set_var(SHUTDOWN_ON_SUCCESS_VAR, "false");
    std::env::set_var(STARTUP_TIMEOUT_VAR, "30");
    std::env::set_var(DUPLICATE_POLICY_VAR, "reject");

    let settings = HarnessSettings::from_env().unwrap();
    clear_env();

    assert!(!settings.shutdown_on_success);
    assert!(settings.shutdown_on_failure);
    assert_eq!(
        settings.startup_timeout,
        TimeoutPolicy::Startup(Duration::from_secs(30))
    );
    assert_eq!(settings.duplicate_policy, DuplicatePolicy::Reject);
}

#[test]
#[serial]
fn test_settings_from_env_rejects_garbage() {
    clear_env();
    std::env::set_var(STARTUP_TIMEOUT_VAR, "soon");

    let result = HarnessSettings::from_env();
    clear_env();

    assert_eq!(
        result,
        Err(HarnessError::Configuration {
            key: STARTUP_TIMEOUT_VAR.to_string(),
            value: "soon".to_string()
        })
    );
}

#[test]
fn test_session_applies_duplicate_policy() {
    let session = LaunchSession::start(
        |registry: Arc<ReadinessRegistry<u32>>| -> HarnessResult<()> {
            registry.complete(SignalName::PlayerJoined)?;
            registry.complete(SignalName::PlayerJoined)?;
            Ok(())
        },
        HarnessSettings::default().with_duplicate_policy(DuplicatePolicy::Reject),
    )
    .unwrap();

    assert_eq!(
        session.join(),
        Err(HarnessError::Signal(SignalError::AlreadyCompleted {
            signal: "player-joined".to_string()
        }))
    );
    // The failing launcher shut the registry down
    assert!(session.registry().is_shut_down());
    assert!(session.registry().is_completed(SignalName::PlayerJoined));
}

#[test]
fn test_full_session_interactive_shutdown() {
    let session = LaunchSession::start(
        |registry: Arc<ReadinessRegistry<String>>| -> HarnessResult<()> {
            thread::sleep(Duration::from_millis(20));
            registry.complete_loader_ready("loader".to_string())?;
            registry.complete(SignalName::PlayerJoined)?;
            thread::sleep(Duration::from_millis(100));
            registry.complete(SignalName::GameClosed)?;
            Ok(())
        },
        HarnessSettings::interactive(),
    )
    .unwrap();

    let runner = session
        .resolve_delegate(|handle| Ok(format!("{handle}-runner")))
        .unwrap();
    assert_eq!(runner, "loader-runner");

    session
        .registry()
        .wait_timeout(SignalName::PlayerJoined, Duration::from_secs(2))
        .unwrap();
    session.status().record_pass();

    let closed = AtomicBool::new(false);
    let action = session
        .shutdown_coordinator()
        .run(|| {
            closed.store(true, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    assert_eq!(
        action,
        ShutdownAction::WaitForClose {
            reason: "tests succeeded"
        }
    );
    assert!(closed.load(Ordering::SeqCst));
    assert!(session.registry().is_completed(SignalName::GameClosed));
    assert_eq!(session.join(), Ok(()));
}

#[test]
fn test_shutdown_wait_released_by_registry_shutdown() {
    let registry = Arc::new(ReadinessRegistry::<u8>::new());
    registry.complete_loader_ready(1).unwrap();
    let settings = HarnessSettings::interactive();

    let stopper = registry.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        stopper.shutdown();
    });

    let status = readiness_signals::TestStatus::new();
    status.record_failure();
    let result = readiness_signals::ShutdownCoordinator::new(&registry, &settings, &status)
        .run(|| Ok(()));

    handle.join().unwrap();
    assert_eq!(
        result,
        Err(HarnessError::Signal(SignalError::Cancelled {
            signal: "game-closed".to_string()
        }))
    );
}
