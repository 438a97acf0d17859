//! Aggregate metrics reduced from recorded outcomes.
//!
//! Every type here is plain serializable data; reducing outcomes into a
//! [`MetricsSnapshot`] is the engine crate's job. Latency figures are
//! expressed in fractional milliseconds so means and percentiles survive
//! serialization without unit juggling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Latency distribution over every recorded outcome, failures included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

/// Request rates over the run's elapsed wall time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputStats {
    /// All requests per second
    pub requests_per_sec: f64,
    /// Successful requests per second
    pub transactions_per_sec: f64,
}

/// Failure counts, overall rate, and per-classification breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    /// Total failed requests
    pub total: u64,
    /// Failures as a percentage of all requests (0 when nothing ran)
    pub rate: f64,
    /// Failure count per classification bucket; BTreeMap keeps the
    /// serialized breakdown stable
    pub by_kind: BTreeMap<String, u64>,
}

/// Virtual-user concurrency as tracked live by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyStats {
    /// Highest number of users active at once
    pub peak_users: u32,
    /// Users still active when the run hit its deadline or was aborted
    pub active_at_end: u32,
    /// Time-weighted average users over the run
    pub average_users: f64,
}

/// Everything a finished (or in-flight) run can report about itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    /// Wall time the numbers cover
    pub elapsed_ms: u64,
    pub latency: LatencyStats,
    pub throughput: ThroughputStats,
    pub errors: ErrorStats,
    pub concurrency: ConcurrencyStats,
}
