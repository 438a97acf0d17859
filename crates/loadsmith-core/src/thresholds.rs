//! Pass/fail bounds a run's metrics are validated against.

use serde::{Deserialize, Serialize};

/// Bounds to enforce on a [`MetricsSnapshot`](crate::metrics::MetricsSnapshot).
///
/// Unset bounds are not enforced; the default set enforces nothing and every
/// run passes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Ceiling on 95th percentile latency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_p95_ms: Option<f64>,
    /// Ceiling on 99th percentile latency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_p99_ms: Option<f64>,
    /// Ceiling on the failure percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_error_rate_percent: Option<f64>,
    /// Floor on overall request throughput
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_requests_per_sec: Option<f64>,
}

impl ThresholdSet {
    /// Production-grade bounds with tight latency ceilings and a real
    /// throughput floor.
    pub fn strict() -> Self {
        Self {
            max_p95_ms: Some(500.0),
            max_p99_ms: Some(1_000.0),
            max_error_rate_percent: Some(1.0),
            min_requests_per_sec: Some(100.0),
        }
    }

    /// Development bounds: forgiving latency and error ceilings, no
    /// throughput floor.
    pub fn relaxed() -> Self {
        Self {
            max_p95_ms: Some(2_000.0),
            max_p99_ms: Some(5_000.0),
            max_error_rate_percent: Some(5.0),
            min_requests_per_sec: None,
        }
    }

    /// Set the p95 latency ceiling.
    pub fn with_max_p95_ms(mut self, millis: f64) -> Self {
        self.max_p95_ms = Some(millis);
        self
    }

    /// Set the p99 latency ceiling.
    pub fn with_max_p99_ms(mut self, millis: f64) -> Self {
        self.max_p99_ms = Some(millis);
        self
    }

    /// Set the failure-percentage ceiling.
    pub fn with_max_error_rate_percent(mut self, percent: f64) -> Self {
        self.max_error_rate_percent = Some(percent);
        self
    }

    /// Set the throughput floor.
    pub fn with_min_requests_per_sec(mut self, rps: f64) -> Self {
        self.min_requests_per_sec = Some(rps);
        self
    }
}

/// Which bound a violation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMetric {
    P95Latency,
    P99Latency,
    ErrorRate,
    Throughput,
}

impl ThresholdMetric {
    /// Fixed remediation hint attached to every violation of this metric.
    pub fn remediation(&self) -> &'static str {
        match self {
            ThresholdMetric::P95Latency => {
                "optimize hot paths, add caching, or scale out to bring tail latency down"
            }
            ThresholdMetric::P99Latency => {
                "investigate tail amplifiers such as cold caches, lock contention, or slow dependencies"
            }
            ThresholdMetric::ErrorRate => {
                "check target logs and dependency health; consider retries or circuit breaking"
            }
            ThresholdMetric::Throughput => {
                "raise concurrency or instance count, or remove serialization bottlenecks"
            }
        }
    }
}

impl std::fmt::Display for ThresholdMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdMetric::P95Latency => write!(f, "p95_latency"),
            ThresholdMetric::P99Latency => write!(f, "p99_latency"),
            ThresholdMetric::ErrorRate => write!(f, "error_rate"),
            ThresholdMetric::Throughput => write!(f, "throughput"),
        }
    }
}

/// One bound the run failed to meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The metric that missed its bound
    pub metric: ThresholdMetric,
    /// Observed value
    pub actual: f64,
    /// The bound it had to meet
    pub required: f64,
    /// Remediation hint keyed to the metric
    pub hint: String,
}

impl Violation {
    /// Build a violation, filling in the metric's fixed hint.
    pub fn new(metric: ThresholdMetric, actual: f64, required: f64) -> Self {
        Self {
            metric,
            actual,
            required,
            hint: metric.remediation().to_string(),
        }
    }
}

/// The verdict for one run against one threshold set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no bound was violated
    pub passed: bool,
    /// Every bound that was missed, in check order
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// A passing verdict with no violations.
    pub fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    /// A verdict derived from the collected violations.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }
}
