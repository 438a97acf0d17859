// Load-Test Plan and Data Model
//
// This crate defines the declarative side of loadsmith: what a load test
// looks like and what it reports, with no runtime machinery attached.
//
// Key design decisions:
// - Scenarios are plain serializable data, validated once before a run
// - Measurement is injected through the RequestExecutor trait so the engine
//   never owns transport details or timeout enforcement
// - Outcomes capture completion order, not issue order
// - Metrics are fractional-millisecond f64s so means and percentiles survive
//   JSON round-trips without unit juggling
// - Threshold bounds are optional; an empty set enforces nothing
// - Error classifications are stable strings, suitable as breakdown keys

pub mod executor;
pub mod metrics;
pub mod outcome;
pub mod scenario;
pub mod thresholds;

// Re-exports for convenience
pub use executor::{ExecutorError, ExecutorResponse, RequestExecutor};
pub use metrics::{
    ConcurrencyStats, ErrorStats, LatencyStats, MetricsSnapshot, ThroughputStats,
};
pub use outcome::RequestOutcome;
pub use scenario::{ConfigError, RequestTemplate, Scenario, TestKind};
pub use thresholds::{ThresholdMetric, ThresholdSet, ValidationResult, Violation};
