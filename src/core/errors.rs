/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signal-related errors with serialization support
///
/// Every abnormal exit from a wait maps to its own variant so callers can
/// tell a completed milestone apart from giving up on it.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SignalError {
    #[error("Signal '{signal}' was already completed")]
    #[diagnostic(
        code(signal::already_completed),
        help("A milestone may only be reported once. Check the producer for a duplicate report.")
    )]
    AlreadyCompleted { signal: String },

    #[error("Timed out after {waited_ms}ms waiting for signal '{signal}'")]
    #[diagnostic(
        code(signal::timed_out),
        help("The producer never reported this milestone. Check the launched process logs or raise the timeout.")
    )]
    TimedOut { signal: String, waited_ms: u64 },

    #[error("Wait for signal '{signal}' was cancelled")]
    #[diagnostic(
        code(signal::cancelled),
        help("The registry was shut down or the wait's cancel token fired before completion.")
    )]
    Cancelled { signal: String },

    #[error("Unknown signal: {0}")]
    #[diagnostic(
        code(signal::unknown),
        help("Valid signals are 'loader-ready', 'player-joined' and 'game-closed'.")
    )]
    UnknownSignal(String),

    #[error("Signal '{signal}' carries a payload and cannot be completed without one")]
    #[diagnostic(
        code(signal::payload_required),
        help("Use the payload-carrying completion method for this signal.")
    )]
    PayloadRequired { signal: String },
}

impl SignalError {
    /// Name of the signal this error concerns, if any
    pub fn signal(&self) -> Option<&str> {
        match self {
            Self::AlreadyCompleted { signal }
            | Self::TimedOut { signal, .. }
            | Self::Cancelled { signal }
            | Self::PayloadRequired { signal } => Some(signal),
            Self::UnknownSignal(_) => None,
        }
    }

    /// Whether the error came from giving up on a wait
    pub fn is_abandoned_wait(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::Cancelled { .. })
    }
}

/// Harness-level errors with miette diagnostics
/// Note: not serializable because it wraps errors produced by launchers
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum HarnessError {
    #[error("Signal error: {0}")]
    #[diagnostic(transparent)]
    Signal(#[from] SignalError),

    #[error("Invalid value '{value}' for {key}")]
    #[diagnostic(
        code(harness::configuration),
        help("Booleans accept 1/0/true/false/yes/no; durations are whole seconds; policies are 'ignore' or 'reject'.")
    )]
    Configuration { key: String, value: String },

    #[error("Launcher failed: {0}")]
    #[diagnostic(
        code(harness::launch_failed),
        help("The environment could not be started. Waiters have been released with a cancellation.")
    )]
    LaunchFailed(String),

    #[error("Launcher thread panicked")]
    #[diagnostic(
        code(harness::launcher_panicked),
        help("The launcher aborted unexpectedly. Check the log output for the panic message.")
    )]
    LauncherPanicked,

    #[error("Failed to create delegate: {0}")]
    #[diagnostic(
        code(harness::delegate_failed),
        help("The loader handle arrived but the delegate runner could not be built from it.")
    )]
    DelegateFailed(String),
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::LaunchFailed(err.to_string())
    }
}
