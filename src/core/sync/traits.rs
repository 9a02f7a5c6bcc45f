/*!
 * Synchronization Traits
 *
 * The seam between cancel tokens and the primitives they interrupt.
 */

/// Result of a wake operation
///
/// Compact representation (single usize) for efficient returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    #[inline(always)]
    pub(crate) fn from_count(count: usize) -> Self {
        if count == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(count)
        }
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

/// Something whose blocked waiters can be woken from outside
///
/// Implementations must:
/// - **Take their own state lock** before notifying, so a waiter that has
///   checked its condition but not yet parked cannot miss the wake
/// - **Be idempotent**: waking with nobody parked is a no-op
pub trait Wakeable: Send + Sync {
    /// Wake every parked waiter, returning how many were woken
    fn wake_all(&self) -> usize;

    /// Name for diagnostics
    fn name(&self) -> &'static str;
}
