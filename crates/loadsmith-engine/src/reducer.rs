//! Pure reduction of recorded outcomes into a metrics snapshot.

use std::collections::BTreeMap;
use std::time::Duration;

use loadsmith_core::metrics::{
    ConcurrencyStats, ErrorStats, LatencyStats, MetricsSnapshot, ThroughputStats,
};
use loadsmith_core::outcome::RequestOutcome;

/// Reduce outcomes into an aggregate snapshot.
///
/// Pure: reads no clocks and mutates nothing, so the same inputs always
/// produce an identical snapshot. Empty input reduces to an all-zero
/// snapshot rather than an error; a run where everything failed is still a
/// valid result.
pub fn reduce(
    outcomes: &[RequestOutcome],
    elapsed: Duration,
    concurrency: ConcurrencyStats,
) -> MetricsSnapshot {
    let total = outcomes.len() as u64;
    let successes = outcomes.iter().filter(|o| o.success).count() as u64;
    let failures = total - successes;

    MetricsSnapshot {
        total_requests: total,
        successful_requests: successes,
        elapsed_ms: elapsed.as_millis() as u64,
        latency: reduce_latency(outcomes),
        throughput: reduce_throughput(total, successes, elapsed),
        errors: reduce_errors(outcomes, total, failures),
        concurrency,
    }
}

/// Latency distribution over all outcomes, failures included: a slow failure
/// is still a latency the target produced.
fn reduce_latency(outcomes: &[RequestOutcome]) -> LatencyStats {
    if outcomes.is_empty() {
        return LatencyStats::default();
    }
    let mut sorted: Vec<u64> = outcomes.iter().map(|o| o.response_time_ms).collect();
    sorted.sort_unstable();

    let sum: u128 = sorted.iter().map(|&v| v as u128).sum();
    LatencyStats {
        min_ms: sorted[0] as f64,
        max_ms: sorted[sorted.len() - 1] as f64,
        mean_ms: sum as f64 / sorted.len() as f64,
        median_ms: percentile(&sorted, 0.50),
        p95_ms: percentile(&sorted, 0.95),
        p99_ms: percentile(&sorted, 0.99),
    }
}

// Element at floor(n * p), clamped to the last index
fn percentile(sorted: &[u64], p: f64) -> f64 {
    let index = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[index] as f64
}

fn reduce_throughput(total: u64, successes: u64, elapsed: Duration) -> ThroughputStats {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return ThroughputStats::default();
    }
    ThroughputStats {
        requests_per_sec: total as f64 / secs,
        transactions_per_sec: successes as f64 / secs,
    }
}

fn reduce_errors(outcomes: &[RequestOutcome], total: u64, failures: u64) -> ErrorStats {
    let mut by_kind = BTreeMap::new();
    for outcome in outcomes {
        if let Some(kind) = outcome.classification() {
            *by_kind.entry(kind).or_insert(0u64) += 1;
        }
    }
    let rate = if total == 0 {
        0.0
    } else {
        failures as f64 / total as f64 * 100.0
    };
    ErrorStats {
        total: failures,
        rate,
        by_kind,
    }
}
