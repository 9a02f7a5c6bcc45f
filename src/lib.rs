/*!
 * Readiness Signals Library
 * One-shot readiness signals for launcher/runner handshakes
 */

pub mod core;
pub mod harness;
pub mod monitoring;
pub mod registry;

// Re-exports
pub use crate::core::sync::{CancelToken, Signal, SignalState, WakeResult};
pub use crate::core::{
    Completion, DuplicatePolicy, HarnessError, HarnessResult, SignalError, SignalResult,
    TimeoutPolicy,
};
pub use harness::{
    HarnessSettings, LaunchSession, Launcher, ShutdownAction, ShutdownCoordinator, TestStatus,
};
pub use monitoring::init_tracing;
pub use registry::{ReadinessRegistry, RegistrySnapshot, SignalName};
