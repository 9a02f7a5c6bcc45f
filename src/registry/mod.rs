/*!
 * Readiness Registry
 *
 * Named one-shot signals decoupling a launcher (which discovers that the
 * environment is usable) from the runners that must not proceed before it.
 */

mod name;
mod readiness;

pub use name::SignalName;
pub use readiness::{ReadinessRegistry, RegistrySnapshot, SignalStatus};
