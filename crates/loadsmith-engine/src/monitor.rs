//! Progress observation hooks for in-flight runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::scheduler::RunState;

/// A point-in-time view of an in-flight run, emitted roughly once a second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunProgress {
    /// Wall time since the run started
    pub elapsed_ms: u64,
    /// Where the run's lifecycle currently sits
    pub state: RunState,
    /// Users currently inside their request loop
    pub active_users: u32,
    /// Highest concurrency seen so far
    pub peak_users: u32,
    /// Outcomes recorded so far
    pub total_requests: u64,
    /// Failed outcomes recorded so far
    pub failed_requests: u64,
    /// Requests per second over the run so far
    pub requests_per_sec: f64,
}

/// Observer for in-flight runs.
///
/// Emission happens on the scheduler's run loop, so implementations must be
/// cheap; anything expensive belongs behind a channel.
#[async_trait]
pub trait RunMonitor: Send + Sync {
    async fn on_progress(&self, progress: RunProgress);
}

/// Discards everything; stands in when no monitor is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

#[async_trait]
impl RunMonitor for NoopMonitor {
    async fn on_progress(&self, _progress: RunProgress) {}
}

/// Collects progress samples in memory, for tests and examples.
#[derive(Debug, Default)]
pub struct InMemoryMonitor {
    samples: parking_lot::Mutex<Vec<RunProgress>>,
}

impl InMemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything observed so far.
    pub fn samples(&self) -> Vec<RunProgress> {
        self.samples.lock().clone()
    }

    /// Number of samples observed so far.
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RunMonitor for InMemoryMonitor {
    async fn on_progress(&self, progress: RunProgress) {
        self.samples.lock().push(progress);
    }
}
