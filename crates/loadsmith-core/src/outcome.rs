//! Per-request result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The result of one simulated request, as captured by a virtual user.
///
/// Outcomes are appended in completion order, which is not guaranteed to
/// match issue order when users run concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Whether the request counted as a success
    pub success: bool,
    /// Observed response time; for attempts that never produced a response
    /// this is the wall time the attempt took
    pub response_time_ms: u64,
    /// Status code returned, or 0 when no response was ever received
    pub status_code: u16,
    /// Error classification, when the executor reported or raised one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the outcome was captured
    pub recorded_at: DateTime<Utc>,
}

impl RequestOutcome {
    /// Record a successful request.
    pub fn success(response_time_ms: u64, status_code: u16) -> Self {
        Self {
            success: true,
            response_time_ms,
            status_code,
            error: None,
            recorded_at: Utc::now(),
        }
    }

    /// Record a failed request, with an optional error classification.
    pub fn failure(response_time_ms: u64, status_code: u16, error: Option<String>) -> Self {
        Self {
            success: false,
            response_time_ms,
            status_code,
            error,
            recorded_at: Utc::now(),
        }
    }

    /// The bucket this outcome's failure belongs to, or `None` for successes.
    ///
    /// Falls back to `HTTP_<status>` when a failure carries no error string,
    /// so an unexpected status code is still attributable.
    pub fn classification(&self) -> Option<String> {
        if self.success {
            return None;
        }
        Some(match &self.error {
            Some(kind) => kind.clone(),
            None => format!("HTTP_{}", self.status_code),
        })
    }
}
