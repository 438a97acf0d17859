//! Scripted executors: simulated targets for tests, benches, and examples.
//!
//! Nothing here opens a socket. Each executor fakes a target with a fixed
//! personality so the whole engine can be exercised end to end in-process.

use std::time::Duration;

use async_trait::async_trait;
use loadsmith_core::executor::{ExecutorError, ExecutorResponse, RequestExecutor};
use loadsmith_core::scenario::RequestTemplate;
use rand::Rng;

/// Simulates a healthy target: fixed latency, fixed status code.
///
/// Honors the timeout budget it is handed; a simulated latency above the
/// budget sleeps only to the budget and returns a timeout error, the way a
/// real client would.
#[derive(Debug, Clone)]
pub struct StaticExecutor {
    latency: Duration,
    status_code: u16,
}

impl Default for StaticExecutor {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(5),
            status_code: 200,
        }
    }
}

impl StaticExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the simulated response latency.
    pub fn with_latency_ms(mut self, millis: u64) -> Self {
        self.latency = Duration::from_millis(millis);
        self
    }

    /// Set the status code every response carries.
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }
}

#[async_trait]
impl RequestExecutor for StaticExecutor {
    async fn execute(
        &self,
        _template: &RequestTemplate,
        timeout: Duration,
    ) -> Result<ExecutorResponse, ExecutorError> {
        if self.latency > timeout {
            tokio::time::sleep(timeout).await;
            return Err(ExecutorError::timeout(timeout));
        }
        tokio::time::sleep(self.latency).await;
        Ok(ExecutorResponse::ok(
            self.latency.as_millis() as u64,
            self.status_code,
        ))
    }
}

/// Wraps a failure probability around a static response, for error-path
/// coverage.
#[derive(Debug, Clone)]
pub struct FlakyExecutor {
    inner: StaticExecutor,
    failure_rate: f64,
}

impl FlakyExecutor {
    /// `failure_rate` is a probability and gets clamped to `0.0..=1.0`.
    pub fn new(failure_rate: f64) -> Self {
        Self {
            inner: StaticExecutor::new(),
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    /// Set the simulated response latency.
    pub fn with_latency_ms(mut self, millis: u64) -> Self {
        self.inner = self.inner.with_latency_ms(millis);
        self
    }
}

#[async_trait]
impl RequestExecutor for FlakyExecutor {
    async fn execute(
        &self,
        template: &RequestTemplate,
        timeout: Duration,
    ) -> Result<ExecutorResponse, ExecutorError> {
        let roll: f64 = rand::thread_rng().gen();
        if roll < self.failure_rate {
            tokio::time::sleep(self.inner.latency).await;
            return Ok(ExecutorResponse::failed(
                self.inner.latency.as_millis() as u64,
                503,
                "SERVICE_UNAVAILABLE",
            ));
        }
        self.inner.execute(template, timeout).await
    }
}

/// Always refuses; simulates a target that is down.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingExecutor;

impl FailingExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RequestExecutor for FailingExecutor {
    async fn execute(
        &self,
        template: &RequestTemplate,
        _timeout: Duration,
    ) -> Result<ExecutorResponse, ExecutorError> {
        Err(ExecutorError::connection(format!(
            "no route to {}",
            template.url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> RequestTemplate {
        RequestTemplate::get("https://svc.test/ping")
    }

    #[tokio::test]
    async fn static_executor_answers_with_configured_shape() {
        let executor = StaticExecutor::new().with_latency_ms(2).with_status(204);
        let response = executor
            .execute(&template(), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.status_code, 204);
        assert_eq!(response.response_time_ms, 2);
    }

    #[tokio::test]
    async fn static_executor_honors_the_timeout_budget() {
        let executor = StaticExecutor::new().with_latency_ms(250);
        let result = executor
            .execute(&template(), Duration::from_millis(10))
            .await;
        assert!(matches!(result, Err(ExecutorError::Timeout { .. })));
    }

    #[tokio::test]
    async fn failing_executor_always_refuses() {
        let executor = FailingExecutor::new();
        for _ in 0..5 {
            let result = executor.execute(&template(), Duration::from_secs(1)).await;
            match result {
                Err(err) => assert_eq!(err.classification(), "CONNECTION"),
                Ok(_) => panic!("expected a connection error"),
            }
        }
    }

    #[tokio::test]
    async fn flaky_extremes_are_deterministic() {
        let always = FlakyExecutor::new(1.0).with_latency_ms(0);
        for _ in 0..20 {
            let response = always
                .execute(&template(), Duration::from_secs(1))
                .await
                .unwrap();
            assert!(!response.success);
            assert_eq!(response.error.as_deref(), Some("SERVICE_UNAVAILABLE"));
        }

        let never = FlakyExecutor::new(0.0).with_latency_ms(0);
        for _ in 0..20 {
            let response = never
                .execute(&template(), Duration::from_secs(1))
                .await
                .unwrap();
            assert!(response.success);
        }
    }

    #[tokio::test]
    async fn flaky_rate_is_clamped() {
        let executor = FlakyExecutor::new(7.5).with_latency_ms(0);
        let response = executor
            .execute(&template(), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(!response.success);
    }
}
