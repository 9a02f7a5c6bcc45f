/*!
 * Synchronization Primitives
 *
 * One-shot readiness signals and the cancel tokens that interrupt them.
 *
 * # Architecture
 *
 * - `Signal<T>`: a named cell that completes exactly once and parks
 *   waiters on a `parking_lot::Condvar` until it does
 * - `CancelToken`: wakes parked waiters so they fail with `Cancelled`
 * - `Wakeable`: the seam a token uses to reach a primitive's waiters
 *
 * # Use Cases
 *
 * - **Bootstrap handshakes**: block a runner until the environment is up
 * - **Teardown**: release everything still waiting when the harness exits
 */

mod cancel;
mod signal;
mod traits;

pub use cancel::CancelToken;
pub use signal::{Signal, SignalState};
pub use traits::{WakeResult, Wakeable};
