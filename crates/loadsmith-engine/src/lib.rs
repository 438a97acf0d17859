//! # Load-Test Simulation Engine
//!
//! Drives concurrent virtual users against an injected executor according to
//! a declarative scenario, then reduces what happened into pass/fail.
//!
//! ## Features
//!
//! - **Weighted selection**: templates are drawn with probability
//!   proportional to their weight
//! - **Ramped concurrency**: users are admitted on a fixed cadence until the
//!   target is reached, then hold steady until the deadline
//! - **Graceful stop**: abort or deadline flips one shared flag; in-flight
//!   requests finish and their outcomes still count
//! - **Pure reduction**: the same outcomes always reduce to the same
//!   metrics snapshot
//! - **Threshold verdicts**: violations name the metric, the observed value,
//!   the bound, and a remediation hint
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   VirtualUserScheduler                       │
//! │  (ramps users in, drives select/execute/record/think loops) │
//! └─────────────────────────────────────────────────────────────┘
//!           │ select_template        │ execute        │ record
//!           ▼                        ▼                ▼
//! ┌──────────────────┐  ┌─────────────────────┐  ┌──────────────────┐
//! │ RequestTemplates │  │  RequestExecutor    │  │  OutcomeRecorder │
//! │ (weighted pool)  │  │  (injected seam)    │  │  (append-only)   │
//! └──────────────────┘  └─────────────────────┘  └──────────────────┘
//!                                                       │ snapshot
//!                                                       ▼
//!                              reduce ──> MetricsSnapshot ──> validate
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use loadsmith_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let scenario = Scenario::new("checkout")
//!     .with_duration_secs(30)
//!     .with_ramp_up_secs(5)
//!     .with_target_users(20)
//!     .with_template(RequestTemplate::get("https://shop.test/products").with_weight(3.0))
//!     .with_template(RequestTemplate::get("https://shop.test/cart"));
//!
//! let executor = Arc::new(StaticExecutor::new().with_latency_ms(20));
//! let scheduler = VirtualUserScheduler::new(scenario, executor)?;
//! let report = scheduler.run().await?;
//!
//! let verdict = validate(&report.metrics, &ThresholdSet::strict());
//! assert!(verdict.passed);
//! ```

pub mod executors;
pub mod monitor;
pub mod recorder;
pub mod reducer;
pub mod scheduler;
pub mod select;
pub mod validator;

/// Prelude for common imports
pub mod prelude {
    pub use crate::executors::{FailingExecutor, FlakyExecutor, StaticExecutor};
    pub use crate::monitor::{InMemoryMonitor, NoopMonitor, RunMonitor, RunProgress};
    pub use crate::recorder::OutcomeRecorder;
    pub use crate::reducer::reduce;
    pub use crate::scheduler::{
        AbortHandle, RunReport, RunState, SchedulerError, VirtualUserScheduler,
    };
    pub use crate::select::select_template;
    pub use crate::validator::validate;
    pub use loadsmith_core::executor::{ExecutorError, ExecutorResponse, RequestExecutor};
    pub use loadsmith_core::metrics::MetricsSnapshot;
    pub use loadsmith_core::outcome::RequestOutcome;
    pub use loadsmith_core::scenario::{ConfigError, RequestTemplate, Scenario, TestKind};
    pub use loadsmith_core::thresholds::{ThresholdSet, ValidationResult};
}

// Re-export key types at crate root
pub use executors::{FailingExecutor, FlakyExecutor, StaticExecutor};
pub use monitor::{InMemoryMonitor, NoopMonitor, RunMonitor, RunProgress};
pub use recorder::OutcomeRecorder;
pub use reducer::reduce;
pub use scheduler::{AbortHandle, RunReport, RunState, SchedulerError, VirtualUserScheduler};
pub use select::select_template;
pub use validator::validate;
