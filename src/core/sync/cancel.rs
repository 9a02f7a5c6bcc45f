/*!
 * Cancel Tokens
 *
 * Interrupts blocked waits. A cancelled token stays cancelled; every wait
 * started with it (or with one of its children) fails with
 * `SignalError::Cancelled` unless its signal has already completed.
 */

use super::traits::{WakeResult, Wakeable};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

#[derive(Default)]
struct CancelInner {
    cancelled: AtomicBool,
    parent: Option<Arc<CancelInner>>,
    /// Primitives with waiters parked under this token
    wakers: Mutex<Vec<Weak<dyn Wakeable>>>,
}

impl CancelInner {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    fn register(&self, waker: &Weak<dyn Wakeable>) {
        {
            let mut wakers = self.wakers.lock();
            wakers.retain(|w| w.strong_count() > 0);
            if !wakers.iter().any(|w| Weak::ptr_eq(w, waker)) {
                wakers.push(waker.clone());
            }
        }
        if let Some(parent) = &self.parent {
            parent.register(waker);
        }
    }
}

/// Cloneable cancellation handle
///
/// Clones share state: cancelling any clone cancels them all.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token that is cancelled when either it or `self` is
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(CancelInner {
                parent: Some(self.inner.clone()),
                ..Default::default()
            }),
        }
    }

    /// Whether this token (or any ancestor) has been cancelled
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Cancel the token and wake every wait parked under it
    ///
    /// Returns how many parked threads were woken. Cancelling twice is a no-op.
    pub fn cancel(&self) -> WakeResult {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return WakeResult::NoWaiters;
        }

        // Snapshot outside the list lock: wake_all takes each primitive's state lock
        let wakers: Vec<_> = self.inner.wakers.lock().drain(..).collect();

        let mut woken = 0;
        for waker in wakers.iter().filter_map(Weak::upgrade) {
            let count = waker.wake_all();
            debug!(primitive = waker.name(), woken = count, "cancel token woke waiters");
            woken += count;
        }
        WakeResult::from_count(woken)
    }

    /// Register a primitive to be woken on cancellation
    ///
    /// Callers must register *before* their final cancellation check.
    pub(crate) fn register(&self, waker: &Weak<dyn Wakeable>) {
        self.inner.register(waker);
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
