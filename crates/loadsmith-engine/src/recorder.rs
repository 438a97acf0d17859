//! Append-only sink for request outcomes.

use std::sync::atomic::{AtomicU64, Ordering};

use loadsmith_core::outcome::RequestOutcome;
use parking_lot::Mutex;

/// Collects outcomes from every virtual user, in completion order.
///
/// Appends go through a short critical section. The atomic counters exist so
/// progress reporting can read cheap live numbers without touching the
/// sample lock; the locked vector is the source of truth.
#[derive(Debug, Default)]
pub struct OutcomeRecorder {
    outcomes: Mutex<Vec<RequestOutcome>>,
    total: AtomicU64,
    failed: AtomicU64,
}

impl OutcomeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome.
    pub fn record(&self, outcome: RequestOutcome) {
        if !outcome.success {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.outcomes.lock().push(outcome);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Clone of everything recorded so far; safe to call mid-run.
    pub fn snapshot(&self) -> Vec<RequestOutcome> {
        self.outcomes.lock().clone()
    }

    /// Outcomes recorded so far.
    pub fn len(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Failures recorded so far.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Drop everything recorded (useful for tests that reuse a recorder).
    pub fn clear(&self) {
        self.outcomes.lock().clear();
        self.total.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}
