//! Threshold validation of a reduced metrics snapshot.

use loadsmith_core::metrics::MetricsSnapshot;
use loadsmith_core::thresholds::{ThresholdMetric, ThresholdSet, ValidationResult, Violation};

/// Check a snapshot against a threshold set.
///
/// Pure and deterministic. Bounds are checked in a fixed order (p95, p99,
/// error rate, throughput) so the same inputs always yield the same verdict
/// with violations in the same order. Sitting exactly on a bound passes.
pub fn validate(metrics: &MetricsSnapshot, thresholds: &ThresholdSet) -> ValidationResult {
    let mut violations = Vec::new();

    if let Some(bound) = thresholds.max_p95_ms {
        if metrics.latency.p95_ms > bound {
            violations.push(Violation::new(
                ThresholdMetric::P95Latency,
                metrics.latency.p95_ms,
                bound,
            ));
        }
    }
    if let Some(bound) = thresholds.max_p99_ms {
        if metrics.latency.p99_ms > bound {
            violations.push(Violation::new(
                ThresholdMetric::P99Latency,
                metrics.latency.p99_ms,
                bound,
            ));
        }
    }
    if let Some(bound) = thresholds.max_error_rate_percent {
        if metrics.errors.rate > bound {
            violations.push(Violation::new(
                ThresholdMetric::ErrorRate,
                metrics.errors.rate,
                bound,
            ));
        }
    }
    if let Some(floor) = thresholds.min_requests_per_sec {
        if metrics.throughput.requests_per_sec < floor {
            violations.push(Violation::new(
                ThresholdMetric::Throughput,
                metrics.throughput.requests_per_sec,
                floor,
            ));
        }
    }

    ValidationResult::from_violations(violations)
}
