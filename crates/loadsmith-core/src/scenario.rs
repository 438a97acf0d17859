//! Declarative load-test plans.
//!
//! A [`Scenario`] names the shape of a run: how many virtual users, how fast
//! they ramp in, how long the run lasts, and the weighted pool of
//! [`RequestTemplate`]s each user draws from. Plans are plain data. They are
//! validated once up front and never mutated mid-run.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when a plan fails validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Scenario has no request templates to draw from
    #[error("scenario '{0}' has no request templates")]
    NoTemplates(String),

    /// Total duration must be positive
    #[error("scenario '{0}' has zero duration")]
    ZeroDuration(String),

    /// Target users cannot exceed the configured ceiling
    #[error("target users ({target}) exceed max users ({max})")]
    TargetExceedsMax {
        /// Requested steady-state user count
        target: u32,
        /// Configured ceiling
        max: u32,
    },

    /// Every template weight must be a positive finite number
    #[error("template {index} ('{url}') has invalid weight {weight}")]
    InvalidWeight {
        /// Position of the offending template
        index: usize,
        /// Template URL, for the error message
        url: String,
        /// The rejected weight
        weight: f64,
    },
}

/// What kind of load profile a scenario describes.
///
/// Purely informational: the engine is driven by the numeric fields, but the
/// tag travels with reports so downstream tooling can group runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Stress,
    Spike,
    Soak,
    Breakpoint,
    Scalability,
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestKind::Stress => write!(f, "stress"),
            TestKind::Spike => write!(f, "spike"),
            TestKind::Soak => write!(f, "soak"),
            TestKind::Breakpoint => write!(f, "breakpoint"),
            TestKind::Scalability => write!(f, "scalability"),
        }
    }
}

/// A single weighted request shape virtual users can issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTemplate {
    /// HTTP verb, passed through to the executor untouched
    pub method: String,
    /// Target URL
    pub url: String,
    /// Extra headers (BTreeMap keeps serialized plans stable)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Optional JSON body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Relative selection weight; higher means chosen more often
    pub weight: f64,
    /// Status code that counts as success
    pub expected_status: u16,
    /// Per-request timeout budget the executor must honor
    pub timeout_ms: u64,
}

impl RequestTemplate {
    /// Create a template with default weight, expected status, and timeout.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            weight: 1.0,          // even split unless told otherwise
            expected_status: 200, // plain success
            timeout_ms: 30_000,   // generous default budget
        }
    }

    /// Shorthand for a GET template.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Shorthand for a POST template with a JSON body.
    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new("POST", url).with_body(body)
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the relative selection weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the status code that counts as success.
    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Set the per-request timeout budget.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Timeout budget as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A complete load-test plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable name, carried into reports
    pub name: String,
    /// Load profile tag
    pub kind: TestKind,
    /// Total run duration in seconds (must be positive)
    pub duration_secs: u64,
    /// Window across which target users are admitted
    pub ramp_up_secs: u64,
    /// Advisory wind-down metadata; the engine stops all users together
    pub ramp_down_secs: u64,
    /// Virtual users to ramp to
    pub target_users: u32,
    /// Ceiling target users may never exceed
    pub max_users: u32,
    /// Pause between one user's consecutive requests
    pub think_time_ms: u64,
    /// Weighted pool of request shapes (must be non-empty)
    pub templates: Vec<RequestTemplate>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "load-test".to_string(),
            kind: TestKind::Stress,
            duration_secs: 60,  // one minute of load
            ramp_up_secs: 10,   // admit users across the first ten seconds
            ramp_down_secs: 0,  // advisory only
            target_users: 10,
            max_users: 50,
            think_time_ms: 1_000,
            templates: Vec::new(),
        }
    }
}

impl Scenario {
    /// Create a named plan with default pacing and no templates yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the load profile tag.
    pub fn with_kind(mut self, kind: TestKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the total run duration in seconds.
    pub fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Set the ramp-up window in seconds.
    pub fn with_ramp_up_secs(mut self, secs: u64) -> Self {
        self.ramp_up_secs = secs;
        self
    }

    /// Set the advisory ramp-down window in seconds.
    pub fn with_ramp_down_secs(mut self, secs: u64) -> Self {
        self.ramp_down_secs = secs;
        self
    }

    /// Set the steady-state user count, lifting the ceiling if needed.
    pub fn with_target_users(mut self, users: u32) -> Self {
        self.target_users = users;
        self.max_users = self.max_users.max(users);
        self
    }

    /// Set the user ceiling.
    pub fn with_max_users(mut self, users: u32) -> Self {
        self.max_users = users;
        self
    }

    /// Set the pause between a user's consecutive requests.
    pub fn with_think_time_ms(mut self, millis: u64) -> Self {
        self.think_time_ms = millis;
        self
    }

    /// Append a request template to the pool.
    pub fn with_template(mut self, template: RequestTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Total run duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Ramp-up window as a [`Duration`].
    pub fn ramp_up(&self) -> Duration {
        Duration::from_secs(self.ramp_up_secs)
    }

    /// Think-time pause as a [`Duration`].
    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_time_ms)
    }

    /// Check the plan before any user is scheduled.
    ///
    /// Rejects empty template pools, zero duration, a target above the
    /// ceiling, and non-positive or non-finite template weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates.is_empty() {
            return Err(ConfigError::NoTemplates(self.name.clone()));
        }
        if self.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration(self.name.clone()));
        }
        if self.target_users > self.max_users {
            return Err(ConfigError::TargetExceedsMax {
                target: self.target_users,
                max: self.max_users,
            });
        }
        for (index, template) in self.templates.iter().enumerate() {
            if !(template.weight.is_finite() && template.weight > 0.0) {
                return Err(ConfigError::InvalidWeight {
                    index,
                    url: template.url.clone(),
                    weight: template.weight,
                });
            }
        }
        Ok(())
    }
}
