/*!
 * Core Module
 * Fundamental types, error handling and synchronization primitives
 */

pub mod errors;
pub mod sync;
pub mod timeout;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use timeout::{deadline_after, TimeoutPolicy};
pub use types::*;
