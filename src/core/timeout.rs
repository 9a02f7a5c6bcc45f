/*!
 * Wait Timeouts
 *
 * Named timeout policies for the blocking waits in the harness.
 *
 * ## Timeout Classes
 *
 * - **Startup**: waiting for the environment's loader (minutes)
 * - **Join**: waiting for the player to enter the world (minutes)
 * - **Custom**: user-defined
 *
 * Deadlines too far in the future to represent as an `Instant` are treated
 * as no deadline at all.
 */

use std::time::{Duration, Instant};

/// Timeout policy for a blocking wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// No timeout (infinite wait) - use sparingly!
    #[default]
    None,

    /// Environment bootstrap timeout
    Startup(Duration),

    /// Player join timeout
    Join(Duration),

    /// Custom timeout
    Custom(Duration),
}

impl TimeoutPolicy {
    /// Default startup timeout: 5 minutes
    pub const fn default_startup() -> Self {
        Self::Startup(Duration::from_secs(300))
    }

    /// Default join timeout: 2 minutes
    pub const fn default_join() -> Self {
        Self::Join(Duration::from_secs(120))
    }

    /// Get the duration for this policy
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Startup(d) | Self::Join(d) | Self::Custom(d) => Some(*d),
        }
    }

    /// Absolute deadline for a wait that began at `start`
    ///
    /// `None` for no timeout, or when the deadline overflows `Instant`.
    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        self.duration().and_then(|d| start.checked_add(d))
    }

    /// Get timeout category as string
    pub fn category(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Startup(_) => "startup",
            Self::Join(_) => "join",
            Self::Custom(_) => "custom",
        }
    }
}

/// Deadline `timeout` from now, or `None` if it is not representable
#[inline]
pub fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
