/*!
 * One-Shot Signal
 *
 * A named cell that moves from pending to completed exactly once,
 * optionally carrying a payload, built on parking_lot's Mutex + Condvar.
 *
 * # Design: Check and Park Under One Lock
 *
 * The completion check and the condvar wait happen under the same mutex,
 * and `complete` stores the payload under that mutex before notifying.
 * A waiter therefore either sees the payload or is parked when the
 * notification fires; there is no window in which a completion is missed.
 */

use super::cancel::CancelToken;
use super::traits::Wakeable;
use crate::core::errors::SignalError;
use crate::core::timeout::deadline_after;
use crate::core::types::{Completion, DuplicatePolicy, SignalResult};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// State of a one-shot signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalState<T> {
    Pending,
    Completed(T),
}

impl<T> SignalState<T> {
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, SignalState::Completed(_))
    }
}

struct SignalInner<T> {
    name: &'static str,
    state: Mutex<SignalState<T>>,
    condvar: Condvar,
    waiters: AtomicUsize,
}

impl<T: Send + 'static> Wakeable for SignalInner<T> {
    fn wake_all(&self) -> usize {
        let _state = self.state.lock();
        self.condvar.notify_all()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Decrements the parked-waiter count on every exit path
struct WaiterGuard<'a>(&'a AtomicUsize);

impl<'a> WaiterGuard<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::Relaxed);
        Self(count)
    }
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Named one-shot signal
///
/// # Examples
///
/// ```
/// use readiness_signals::core::sync::Signal;
/// use readiness_signals::core::DuplicatePolicy;
/// use std::sync::Arc;
/// use std::thread;
///
/// let signal = Arc::new(Signal::new("loader-ready", DuplicatePolicy::Ignore));
/// let producer = signal.clone();
///
/// thread::spawn(move || {
///     producer.complete(42u32).unwrap();
/// });
///
/// assert_eq!(signal.wait().unwrap(), 42);
/// ```
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
    policy: DuplicatePolicy,
}

impl<T> Signal<T>
where
    T: Send + 'static,
{
    /// Create a pending signal
    pub fn new(name: &'static str, policy: DuplicatePolicy) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                name,
                state: Mutex::new(SignalState::Pending),
                condvar: Condvar::new(),
                waiters: AtomicUsize::new(0),
            }),
            policy,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    #[inline]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Move the signal to completed, storing `payload`, and release all waiters
    ///
    /// Only the first call performs the transition. Later calls never touch
    /// the stored payload: they return `Completion::Ignored` under
    /// `DuplicatePolicy::Ignore` or `SignalError::AlreadyCompleted` under
    /// `DuplicatePolicy::Reject`.
    pub fn complete(&self, payload: T) -> SignalResult<Completion> {
        let mut state = self.inner.state.lock();
        if state.is_completed() {
            drop(state);
            return match self.policy {
                DuplicatePolicy::Ignore => {
                    debug!(signal = self.name(), "duplicate completion ignored");
                    Ok(Completion::Ignored)
                }
                DuplicatePolicy::Reject => {
                    warn!(signal = self.name(), "duplicate completion rejected");
                    Err(SignalError::AlreadyCompleted {
                        signal: self.name().to_string(),
                    })
                }
            };
        }

        *state = SignalState::Completed(payload);
        let woken = self.inner.condvar.notify_all();
        drop(state);

        info!(signal = self.name(), woken, "signal completed");
        Ok(Completion::Completed)
    }

    /// Non-blocking state query
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.inner.state.lock().is_completed()
    }

    /// Number of threads currently parked in a wait (for diagnostics)
    ///
    /// Waits that return without parking are never counted.
    #[inline]
    pub fn waiter_count(&self) -> usize {
        self.inner.waiters.load(Ordering::Relaxed)
    }
}

impl<T> Signal<T>
where
    T: Clone + Send + 'static,
{
    /// Non-blocking payload read
    pub fn try_get(&self) -> Option<T> {
        match &*self.inner.state.lock() {
            SignalState::Completed(value) => Some(value.clone()),
            SignalState::Pending => None,
        }
    }

    /// Block until completed, with no deadline
    ///
    /// Returns immediately if the signal is already completed.
    pub fn wait(&self) -> SignalResult<T> {
        self.wait_inner(None, None)
    }

    /// Block until completed or `timeout` elapses
    ///
    /// A timeout too large to represent as a deadline waits without one.
    pub fn wait_timeout(&self, timeout: Duration) -> SignalResult<T> {
        self.wait_inner(None, deadline_after(timeout))
    }

    /// Block until completed or `deadline` passes
    pub fn wait_deadline(&self, deadline: Instant) -> SignalResult<T> {
        self.wait_inner(None, Some(deadline))
    }

    /// Block until completed, the deadline passes, or `token` is cancelled
    ///
    /// A completed signal wins over a cancelled token: the payload is
    /// returned even if cancellation happened first.
    pub fn wait_with(&self, token: &CancelToken, deadline: Option<Instant>) -> SignalResult<T> {
        self.wait_inner(Some(token), deadline)
    }

    fn wait_inner(&self, token: Option<&CancelToken>, deadline: Option<Instant>) -> SignalResult<T> {
        let start = Instant::now();

        if let Some(token) = token {
            let waker: Weak<dyn Wakeable> = Arc::downgrade(&self.inner) as Weak<dyn Wakeable>;
            token.register(&waker);
        }

        let mut state = self.inner.state.lock();
        let mut waiter = None;

        loop {
            if let SignalState::Completed(value) = &*state {
                return Ok(value.clone());
            }

            if token.is_some_and(CancelToken::is_cancelled) {
                warn!(signal = self.name(), "wait cancelled before completion");
                return Err(SignalError::Cancelled {
                    signal: self.name().to_string(),
                });
            }

            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        let waited_ms = start.elapsed().as_millis() as u64;
                        warn!(signal = self.name(), waited_ms, "wait timed out");
                        return Err(SignalError::TimedOut {
                            signal: self.name().to_string(),
                            waited_ms,
                        });
                    }
                    debug!(signal = self.name(), "parking until deadline");
                    waiter.get_or_insert_with(|| WaiterGuard::enter(&self.inner.waiters));
                    // Timeout or spurious wake: loop re-checks completion first
                    let _ = self.inner.condvar.wait_until(&mut state, deadline);
                }
                None => {
                    debug!(signal = self.name(), "parking");
                    waiter.get_or_insert_with(|| WaiterGuard::enter(&self.inner.waiters));
                    self.inner.condvar.wait(&mut state);
                }
            }
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.inner.name)
            .field("completed", &self.inner.state.lock().is_completed())
            .field("waiters", &self.inner.waiters.load(Ordering::Relaxed))
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_signal_starts_pending() {
        let signal = Signal::<u32>::new("test", DuplicatePolicy::Ignore);
        assert!(!signal.is_completed());
        assert_eq!(signal.try_get(), None);
        assert_eq!(signal.waiter_count(), 0);
    }

    #[test]
    fn test_complete_then_wait_returns_immediately() {
        let signal = Signal::new("test", DuplicatePolicy::Ignore);
        assert_eq!(signal.complete(7u32), Ok(Completion::Completed));

        let start = Instant::now();
        assert_eq!(signal.wait(), Ok(7));
        assert_eq!(signal.wait_timeout(Duration::ZERO), Ok(7));
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_wait_blocks_until_complete() {
        let signal = Arc::new(Signal::new("test", DuplicatePolicy::Ignore));
        let waiter = signal.clone();

        let handle = thread::spawn(move || waiter.wait_timeout(Duration::from_secs(2)));

        thread::sleep(Duration::from_millis(50));
        signal.complete("ready".to_string()).unwrap();

        assert_eq!(handle.join().unwrap(), Ok("ready".to_string()));
    }

    #[test]
    fn test_duplicate_ignored_keeps_payload() {
        let signal = Signal::new("test", DuplicatePolicy::Ignore);
        signal.complete(1u32).unwrap();
        assert_eq!(signal.complete(2), Ok(Completion::Ignored));
        assert_eq!(signal.try_get(), Some(1));
    }

    #[test]
    fn test_duplicate_rejected_keeps_payload() {
        let signal = Signal::new("test", DuplicatePolicy::Reject);
        signal.complete(1u32).unwrap();
        assert_eq!(
            signal.complete(2),
            Err(SignalError::AlreadyCompleted {
                signal: "test".into()
            })
        );
        assert_eq!(signal.try_get(), Some(1));
        assert!(signal.is_completed());
    }

    #[test]
    fn test_wait_timeout_not_before_deadline() {
        let signal = Signal::<()>::new("never", DuplicatePolicy::Ignore);
        let start = Instant::now();
        let result = signal.wait_timeout(Duration::from_millis(50));

        assert!(matches!(result, Err(SignalError::TimedOut { .. })));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_cancel_releases_waiter() {
        let signal = Arc::new(Signal::<()>::new("test", DuplicatePolicy::Ignore));
        let token = CancelToken::new();

        let waiter = signal.clone();
        let waiter_token = token.clone();
        let handle = thread::spawn(move || waiter.wait_with(&waiter_token, None));

        thread::sleep(Duration::from_millis(50));
        token.cancel();

        assert_eq!(
            handle.join().unwrap(),
            Err(SignalError::Cancelled {
                signal: "test".into()
            })
        );
        assert!(!signal.is_completed());
    }

    #[test]
    fn test_completed_wins_over_cancelled() {
        let signal = Signal::new("test", DuplicatePolicy::Ignore);
        let token = CancelToken::new();
        signal.complete(5u8).unwrap();
        token.cancel();
        assert_eq!(signal.wait_with(&token, None), Ok(5));
    }

    #[test]
    fn test_waiter_count_tracks_parked_threads() {
        let signal = Arc::new(Signal::<()>::new("test", DuplicatePolicy::Ignore));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let waiter = signal.clone();
                thread::spawn(move || waiter.wait_timeout(Duration::from_secs(2)))
            })
            .collect();

        thread::sleep(Duration::from_millis(100));
        assert_eq!(signal.waiter_count(), 2);

        signal.complete(()).unwrap();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert_eq!(signal.waiter_count(), 0);
    }

    #[test]
    fn test_immediate_returns_never_count_as_waiters() {
        let signal = Signal::<u8>::new("test", DuplicatePolicy::Ignore);
        let token = CancelToken::new();
        token.cancel();

        assert!(signal.wait_with(&token, None).is_err());
        assert!(signal.wait_deadline(Instant::now()).is_err());
        assert_eq!(signal.waiter_count(), 0);

        signal.complete(3).unwrap();
        assert_eq!(signal.wait(), Ok(3));
        assert_eq!(signal.waiter_count(), 0);
    }
}
