/*!
 * Harness
 *
 * The collaborators around the registry: a launcher that produces
 * milestones, a session that hands runners the loader handle, and the
 * exit-time decision on whether to leave the client open.
 */

mod session;
mod settings;
mod shutdown;
mod status;

pub use session::{LaunchSession, Launcher};
pub use settings::{
    HarnessSettings, DUPLICATE_POLICY_VAR, GAME_DIR_VAR, SHUTDOWN_ON_ERROR_VAR,
    SHUTDOWN_ON_FAILURE_VAR, SHUTDOWN_ON_SUCCESS_VAR, STARTUP_TIMEOUT_VAR,
};
pub use shutdown::{ShutdownAction, ShutdownCoordinator};
pub use status::{StatusSummary, TestStatus};
