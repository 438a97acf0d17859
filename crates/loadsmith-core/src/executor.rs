//! The measurement seam: executors carry out request templates.
//!
//! The engine never opens sockets itself. Whatever actually performs a
//! request (an HTTP client, a stub, anything) is injected behind the
//! [`RequestExecutor`] trait and owns transport details including timeout
//! enforcement.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scenario::RequestTemplate;

/// Errors an executor raises instead of producing a response.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The attempt exceeded its timeout budget
    #[error("request timed out after {limit_ms}ms")]
    Timeout {
        /// The budget that was exceeded
        limit_ms: u64,
    },

    /// The target could not be reached
    #[error("connection failed: {0}")]
    Connection(String),

    /// Anything else the executor needs to surface
    #[error("executor error: {0}")]
    Other(#[from] anyhow::Error),
}

impl ExecutorError {
    /// Create a timeout error from the exceeded budget.
    pub fn timeout(limit: Duration) -> Self {
        Self::Timeout {
            limit_ms: limit.as_millis() as u64,
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Stable bucket key for error-breakdown reporting.
    pub fn classification(&self) -> &'static str {
        match self {
            ExecutorError::Timeout { .. } => "TIMEOUT",
            ExecutorError::Connection(_) => "CONNECTION",
            ExecutorError::Other(_) => "EXECUTOR_ERROR",
        }
    }
}

/// What an executor reports back for one completed attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorResponse {
    /// Transport-level verdict; `false` marks the attempt failed even when a
    /// status code came back
    pub success: bool,
    /// Measured response time
    pub response_time_ms: u64,
    /// Status code the target answered with
    pub status_code: u16,
    /// Error the executor observed without aborting the attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutorResponse {
    /// A clean response.
    pub fn ok(response_time_ms: u64, status_code: u16) -> Self {
        Self {
            success: true,
            response_time_ms,
            status_code,
            error: None,
        }
    }

    /// A completed-but-failed response carrying an error classification.
    pub fn failed(
        response_time_ms: u64,
        status_code: u16,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            response_time_ms,
            status_code,
            error: Some(error.into()),
        }
    }
}

/// Carries out request templates against a real or simulated target.
///
/// Implementations must honor the timeout budget they are handed; the
/// scheduler enforces nothing beyond it and absorbs whatever comes back.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Perform one request described by `template`.
    async fn execute(
        &self,
        template: &RequestTemplate,
        timeout: Duration,
    ) -> Result<ExecutorResponse, ExecutorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_stable_per_variant() {
        assert_eq!(
            ExecutorError::timeout(Duration::from_millis(250)).classification(),
            "TIMEOUT"
        );
        assert_eq!(
            ExecutorError::connection("refused").classification(),
            "CONNECTION"
        );
        let other = ExecutorError::from(anyhow::anyhow!("boom"));
        assert_eq!(other.classification(), "EXECUTOR_ERROR");
    }

    #[test]
    fn error_messages_carry_context() {
        let err = ExecutorError::timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "request timed out after 250ms");
        let err = ExecutorError::connection("refused");
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn response_constructors() {
        let ok = ExecutorResponse::ok(12, 200);
        assert!(ok.success);
        assert!(ok.error.is_none());

        let failed = ExecutorResponse::failed(40, 502, "BAD_GATEWAY");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("BAD_GATEWAY"));
    }
}
