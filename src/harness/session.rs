/*!
 * Launch Session
 *
 * Runs a launcher on its own thread and hands runners the loader handle
 * once it is published. A launcher that fails or panics shuts the registry
 * down, so runners blocked on it fail with `Cancelled` instead of hanging.
 */

use super::settings::HarnessSettings;
use super::shutdown::ShutdownCoordinator;
use super::status::TestStatus;
use crate::core::errors::HarnessError;
use crate::core::types::HarnessResult;
use crate::registry::ReadinessRegistry;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{error, info};

/// Starts the environment and reports milestones to the registry
///
/// Implementations may complete signals from any thread and at any time;
/// returning does not have to wait for the environment to exit.
pub trait Launcher<H>: Send + 'static {
    fn launch(self, registry: Arc<ReadinessRegistry<H>>) -> HarnessResult<()>;
}

impl<H, F> Launcher<H> for F
where
    F: FnOnce(Arc<ReadinessRegistry<H>>) -> HarnessResult<()> + Send + 'static,
{
    fn launch(self, registry: Arc<ReadinessRegistry<H>>) -> HarnessResult<()> {
        self(registry)
    }
}

/// One launched environment and the state runners share around it
pub struct LaunchSession<H> {
    registry: Arc<ReadinessRegistry<H>>,
    settings: HarnessSettings,
    status: Arc<TestStatus>,
    launcher: Mutex<Option<JoinHandle<HarnessResult<()>>>>,
    init_errors: Mutex<Vec<HarnessError>>,
}

impl<H> LaunchSession<H>
where
    H: Clone + Send + 'static,
{
    /// Spawn `launcher` on a thread named `launcher`
    pub fn start<L>(launcher: L, settings: HarnessSettings) -> HarnessResult<Self>
    where
        L: Launcher<H>,
    {
        let registry = Arc::new(ReadinessRegistry::with_policy(settings.duplicate_policy));
        let launcher_registry = registry.clone();

        info!(
            registry_id = %registry.id(),
            game_dir = %settings.game_dir.display(),
            "starting launcher"
        );

        let handle = thread::Builder::new()
            .name("launcher".into())
            .spawn(move || {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| launcher.launch(launcher_registry.clone())));
                match outcome {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(err)) => {
                        error!(error = %err, "launcher failed");
                        launcher_registry.shutdown();
                        Err(err)
                    }
                    Err(_) => {
                        error!("launcher panicked");
                        launcher_registry.shutdown();
                        Err(HarnessError::LauncherPanicked)
                    }
                }
            })?;

        Ok(Self {
            registry,
            settings,
            status: Arc::new(TestStatus::new()),
            launcher: Mutex::new(Some(handle)),
            init_errors: Mutex::new(Vec::new()),
        })
    }

    pub fn registry(&self) -> &Arc<ReadinessRegistry<H>> {
        &self.registry
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub fn status(&self) -> &Arc<TestStatus> {
        &self.status
    }

    /// Wait for the loader handle, then build a delegate from it
    ///
    /// The wait is bounded by `settings.startup_timeout`; a timeout too large
    /// to represent as a deadline leaves it unbounded. Any failure,
    /// whether waiting or building, is also recorded for
    /// `initialization_errors`.
    pub fn resolve_delegate<D, F>(&self, build: F) -> HarnessResult<D>
    where
        F: FnOnce(&H) -> HarnessResult<D>,
    {
        let deadline = self.settings.startup_timeout.deadline_from(Instant::now());
        let handle = self.registry.wait_for_loader_until(deadline);

        let result = handle.map_err(HarnessError::from).and_then(|h| build(&h));
        if let Err(err) = &result {
            error!(error = %err, "failed to resolve delegate");
            self.init_errors.lock().push(err.clone());
        }
        result
    }

    /// Drain the errors recorded by `resolve_delegate`
    pub fn initialization_errors(&self) -> Vec<HarnessError> {
        std::mem::take(&mut *self.init_errors.lock())
    }

    /// Wait for the launcher thread and return its result
    ///
    /// Subsequent calls return `Ok(())`.
    pub fn join(&self) -> HarnessResult<()> {
        let handle = self.launcher.lock().take();
        match handle {
            Some(handle) => handle.join().map_err(|_| HarnessError::LauncherPanicked)?,
            None => Ok(()),
        }
    }

    pub fn shutdown_coordinator(&self) -> ShutdownCoordinator<'_, H> {
        ShutdownCoordinator::new(&self.registry, &self.settings, &self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SignalError;
    use crate::core::timeout::TimeoutPolicy;
    use crate::registry::SignalName;
    use std::time::Duration;

    #[test]
    fn test_resolve_delegate_from_handle() {
        let session = LaunchSession::start(
            |registry: Arc<ReadinessRegistry<u32>>| -> HarnessResult<()> {
                thread::sleep(Duration::from_millis(20));
                registry.complete_loader_ready(42)?;
                Ok(())
            },
            HarnessSettings::default(),
        )
        .unwrap();

        let delegate = session.resolve_delegate(|h| Ok(format!("runner-{h}"))).unwrap();
        assert_eq!(delegate, "runner-42");
        assert!(session.join().is_ok());
        assert!(session.initialization_errors().is_empty());
    }

    #[test]
    fn test_failing_launcher_cancels_waiters() {
        let session = LaunchSession::start(
            |_registry: Arc<ReadinessRegistry<u32>>| -> HarnessResult<()> {
                thread::sleep(Duration::from_millis(20));
                Err(HarnessError::LaunchFailed("no display".into()))
            },
            HarnessSettings::default().with_startup_timeout(TimeoutPolicy::None),
        )
        .unwrap();

        let result = session.resolve_delegate(|h| Ok(*h));
        assert_eq!(
            result,
            Err(HarnessError::Signal(SignalError::Cancelled {
                signal: "loader-ready".into()
            }))
        );
        assert_eq!(
            session.join(),
            Err(HarnessError::LaunchFailed("no display".into()))
        );
        assert_eq!(session.initialization_errors().len(), 1);
        assert!(session.initialization_errors().is_empty());
    }

    #[test]
    fn test_panicking_launcher_reported() {
        let session = LaunchSession::start(
            |_registry: Arc<ReadinessRegistry<u32>>| -> HarnessResult<()> {
                panic!("launcher exploded");
            },
            HarnessSettings::default(),
        )
        .unwrap();

        assert_eq!(session.join(), Err(HarnessError::LauncherPanicked));
        assert!(session.registry().is_shut_down());
        assert_eq!(session.join(), Ok(()));
    }

    #[test]
    fn test_delegate_build_error_recorded() {
        let session = LaunchSession::start(
            |registry: Arc<ReadinessRegistry<u32>>| -> HarnessResult<()> {
                registry.complete_loader_ready(1)?;
                registry.complete(SignalName::PlayerJoined)?;
                Ok(())
            },
            HarnessSettings::default(),
        )
        .unwrap();

        let result: HarnessResult<()> =
            session.resolve_delegate(|_| Err(HarnessError::DelegateFailed("no constructor".into())));
        assert!(result.is_err());
        assert_eq!(
            session.initialization_errors(),
            vec![HarnessError::DelegateFailed("no constructor".into())]
        );
    }

    #[test]
    fn test_startup_timeout_bounds_resolution() {
        let session = LaunchSession::start(
            |_registry: Arc<ReadinessRegistry<u32>>| -> HarnessResult<()> {
                // Never publishes the loader
                Ok(())
            },
            HarnessSettings::default()
                .with_startup_timeout(TimeoutPolicy::Startup(Duration::from_millis(50))),
        )
        .unwrap();

        let result = session.resolve_delegate(|h| Ok(*h));
        assert!(matches!(
            result,
            Err(HarnessError::Signal(SignalError::TimedOut { .. }))
        ));
    }

    #[test]
    fn test_unbounded_startup_timeout_resolves_completed_loader() {
        let session = LaunchSession::start(
            |registry: Arc<ReadinessRegistry<u32>>| -> HarnessResult<()> {
                registry.complete_loader_ready(9)?;
                Ok(())
            },
            HarnessSettings::default()
                .with_startup_timeout(TimeoutPolicy::Startup(Duration::from_secs(u64::MAX))),
        )
        .unwrap();

        assert_eq!(session.resolve_delegate(|h| Ok(*h)), Ok(9));
        assert!(session.initialization_errors().is_empty());
    }
}
