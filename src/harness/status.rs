/*!
 * Test Status
 * Process-wide outcome aggregated across every runner sharing a session
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Lock-free pass/fail counters
#[derive(Debug, Default)]
pub struct TestStatus {
    passed: AtomicUsize,
    failed: AtomicUsize,
    aborted: AtomicBool,
}

impl TestStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&self) {
        self.passed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one test
    pub fn record(&self, passed: bool) {
        if passed {
            self.record_pass()
        } else {
            self.record_failure()
        }
    }

    /// Mark the run as having terminated abnormally
    pub fn mark_aborted(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    pub fn passed(&self) -> usize {
        self.passed.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    /// At least one test ran, none failed, and the run completed normally
    pub fn succeeded(&self) -> bool {
        !self.aborted() && self.failures() == 0 && self.passed() > 0
    }

    /// Any test failed
    pub fn failed(&self) -> bool {
        self.failures() > 0
    }

    pub fn summary(&self) -> StatusSummary {
        StatusSummary {
            passed: self.passed(),
            failed: self.failures(),
            aborted: self.aborted(),
        }
    }
}

/// Serializable copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub passed: usize,
    pub failed: usize,
    pub aborted: bool,
}
