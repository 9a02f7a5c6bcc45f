/*!
 * Shutdown Coordination
 *
 * Decides at exit whether to close the client immediately or leave it open
 * until the user closes it, based on the run's outcome and the settings.
 */

use super::settings::HarnessSettings;
use super::status::TestStatus;
use crate::core::types::HarnessResult;
use crate::registry::{ReadinessRegistry, SignalName};
use tracing::{info, warn};

/// What to do with the client at exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownAction {
    CloseNow,
    WaitForClose { reason: &'static str },
}

/// Exit-time decision and wait
pub struct ShutdownCoordinator<'a, H> {
    registry: &'a ReadinessRegistry<H>,
    settings: &'a HarnessSettings,
    status: &'a TestStatus,
}

impl<'a, H> ShutdownCoordinator<'a, H>
where
    H: Clone + Send + 'static,
{
    pub fn new(
        registry: &'a ReadinessRegistry<H>,
        settings: &'a HarnessSettings,
        status: &'a TestStatus,
    ) -> Self {
        Self {
            registry,
            settings,
            status,
        }
    }

    pub fn decide(&self) -> ShutdownAction {
        if self.status.aborted() && !self.settings.shutdown_on_error {
            ShutdownAction::WaitForClose {
                reason: "the run aborted",
            }
        } else if self.status.succeeded() && !self.settings.shutdown_on_success {
            ShutdownAction::WaitForClose {
                reason: "tests succeeded",
            }
        } else if self.status.failed() && !self.settings.shutdown_on_failure {
            ShutdownAction::WaitForClose {
                reason: "tests failed",
            }
        } else {
            ShutdownAction::CloseNow
        }
    }

    /// Apply the decision, then call `close` if the environment ever came up
    ///
    /// Waiting for the user is unbounded but still cancellable through
    /// `ReadinessRegistry::shutdown`.
    pub fn run<F>(&self, close: F) -> HarnessResult<ShutdownAction>
    where
        F: FnOnce() -> HarnessResult<()>,
    {
        let action = self.decide();

        if let ShutdownAction::WaitForClose { reason } = action {
            warn!("Waiting for the client to close because {}", reason);
            self.registry.wait(SignalName::GameClosed)?;
        }

        if self.registry.is_completed(SignalName::LoaderReady) {
            info!(summary = ?self.status.summary(), "closing client");
            close()?;
        }

        Ok(action)
    }
}
