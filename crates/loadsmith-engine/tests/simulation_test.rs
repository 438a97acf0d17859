// Integration tests for the full simulation path
//
// Every run here drives real tokio timers against in-process executors, so
// durations are kept short. Assertions avoid exact request counts where
// scheduling jitter could move them; structural properties (state, error
// buckets, stabilization after stop) are asserted exactly.

use std::sync::Arc;
use std::time::Duration;

use loadsmith_core::thresholds::ThresholdMetric;
use loadsmith_engine::prelude::*;

fn ping_template() -> RequestTemplate {
    RequestTemplate::get("https://svc.test/ping")
}

// =============================================================================
// Happy path: ramp, steady load, deadline, verdict
// =============================================================================

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn test_full_run_produces_passing_report() {
    let scenario = Scenario::new("smoke")
        .with_kind(TestKind::Stress)
        .with_duration_secs(2)
        .with_ramp_up_secs(1)
        .with_target_users(5)
        .with_think_time_ms(500)
        .with_template(RequestTemplate::get("https://svc.test/a").with_weight(3.0))
        .with_template(RequestTemplate::get("https://svc.test/b"));

    let executor = Arc::new(StaticExecutor::new().with_latency_ms(100));
    let scheduler = VirtualUserScheduler::new(scenario, executor).unwrap();
    let report = scheduler.run().await.unwrap();

    assert!(!report.aborted);
    assert_eq!(report.scenario, "smoke");
    assert_eq!(report.kind, TestKind::Stress);
    assert_eq!(scheduler.state(), RunState::Stopped);

    let metrics = &report.metrics;
    assert!(metrics.total_requests > 0);
    assert_eq!(metrics.successful_requests, metrics.total_requests);
    assert_eq!(metrics.errors.total, 0);
    assert_eq!(metrics.errors.rate, 0.0);
    assert!(metrics.errors.by_kind.is_empty());
    assert!(metrics.throughput.requests_per_sec > 0.0);

    // The executor reports a constant 100ms, so the whole distribution sits
    // on it
    assert_eq!(metrics.latency.min_ms, 100.0);
    assert_eq!(metrics.latency.p95_ms, 100.0);

    assert_eq!(metrics.concurrency.peak_users, 5);
    assert!(metrics.concurrency.active_at_end <= 5);
    assert!(metrics.concurrency.average_users > 0.0);
    assert!(metrics.concurrency.average_users <= 5.0);

    let verdict = validate(metrics, &ThresholdSet::relaxed());
    assert!(verdict.passed, "violations: {:?}", verdict.violations);
}

#[test_log::test(tokio::test)]
async fn test_zero_target_users_idles_to_deadline() {
    let scenario = Scenario::new("idle")
        .with_duration_secs(1)
        .with_target_users(0)
        .with_template(ping_template());

    let scheduler =
        VirtualUserScheduler::new(scenario, Arc::new(StaticExecutor::new())).unwrap();
    let report = scheduler.run().await.unwrap();

    assert!(!report.aborted);
    assert_eq!(report.metrics.total_requests, 0);
    assert_eq!(report.metrics.concurrency.peak_users, 0);
    assert_eq!(report.metrics.concurrency.active_at_end, 0);
    assert_eq!(report.metrics.concurrency.average_users, 0.0);
    assert!(validate(&report.metrics, &ThresholdSet::default()).passed);
}

// =============================================================================
// Abort semantics
// =============================================================================

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn test_abort_stops_recording_promptly() {
    let scenario = Scenario::new("aborted")
        .with_duration_secs(10)
        .with_ramp_up_secs(0)
        .with_target_users(4)
        .with_think_time_ms(100)
        .with_template(ping_template());

    let executor = Arc::new(StaticExecutor::new().with_latency_ms(10));
    let scheduler = Arc::new(VirtualUserScheduler::new(scenario, executor).unwrap());
    let abort = scheduler.abort_handle();
    let recorder = scheduler.recorder();

    let runner = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run().await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(recorder.len() > 0, "users should be recording before the abort");
    abort.abort();

    let report = runner.await.unwrap().unwrap();
    assert!(report.aborted);
    assert_eq!(scheduler.state(), RunState::Stopped);
    // Well short of the 10s deadline
    assert!(report.metrics.elapsed_ms < 2_000);

    // Everything in flight at the abort landed in the report, and nothing
    // records afterwards
    let settled = recorder.len();
    assert_eq!(report.metrics.total_requests, settled);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(recorder.len(), settled);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn test_in_flight_request_outlives_the_deadline_and_records() {
    let scenario = Scenario::new("tail")
        .with_duration_secs(1)
        .with_ramp_up_secs(0)
        .with_target_users(1)
        .with_think_time_ms(0)
        .with_template(ping_template());

    // 700ms per request: the second is issued around 0.7s and completes
    // around 1.4s, past the 1s deadline
    let executor = Arc::new(StaticExecutor::new().with_latency_ms(700));
    let scheduler = Arc::new(VirtualUserScheduler::new(scenario, executor).unwrap());
    let recorder = scheduler.recorder();

    let report = scheduler.run().await.unwrap();

    assert!(report.metrics.total_requests >= 2);
    assert_eq!(report.metrics.total_requests, recorder.len());
    // The run waited out the in-flight request instead of dropping it
    assert!(report.metrics.elapsed_ms > 1_000);
    let last = recorder.snapshot().pop().unwrap();
    let after_deadline = last.recorded_at - report.started_at;
    assert!(after_deadline.num_milliseconds() >= 1_000);
}

// =============================================================================
// Failure handling
// =============================================================================

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn test_total_failure_still_produces_a_report() {
    let scenario = Scenario::new("down")
        .with_duration_secs(1)
        .with_ramp_up_secs(0)
        .with_target_users(3)
        .with_think_time_ms(50)
        .with_template(ping_template());

    let scheduler =
        VirtualUserScheduler::new(scenario, Arc::new(FailingExecutor::new())).unwrap();
    let report = scheduler.run().await.unwrap();

    let metrics = &report.metrics;
    assert!(metrics.total_requests > 0);
    assert_eq!(metrics.successful_requests, 0);
    assert_eq!(metrics.errors.rate, 100.0);
    assert_eq!(
        metrics.errors.by_kind.get("CONNECTION"),
        Some(&metrics.total_requests)
    );

    let verdict = validate(metrics, &ThresholdSet::strict());
    assert!(!verdict.passed);
    let metrics_violated: Vec<ThresholdMetric> =
        verdict.violations.iter().map(|v| v.metric).collect();
    assert!(metrics_violated.contains(&ThresholdMetric::ErrorRate));
}

#[test_log::test(tokio::test)]
async fn test_unexpected_status_buckets_under_http_code() {
    let scenario = Scenario::new("bad-gateway")
        .with_duration_secs(1)
        .with_ramp_up_secs(0)
        .with_target_users(2)
        .with_think_time_ms(50)
        .with_template(ping_template());

    // Responds cleanly, but with 500 where the template expects 200
    let executor = Arc::new(StaticExecutor::new().with_latency_ms(5).with_status(500));
    let scheduler = VirtualUserScheduler::new(scenario, executor).unwrap();
    let report = scheduler.run().await.unwrap();

    let metrics = &report.metrics;
    assert!(metrics.total_requests > 0);
    assert_eq!(metrics.errors.total, metrics.total_requests);
    assert_eq!(
        metrics.errors.by_kind.get("HTTP_500"),
        Some(&metrics.total_requests)
    );
    assert_eq!(metrics.errors.by_kind.len(), 1);
}

// =============================================================================
// Progress monitoring
// =============================================================================

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn test_monitor_samples_roughly_once_a_second() {
    let scenario = Scenario::new("watched")
        .with_duration_secs(3)
        .with_ramp_up_secs(1)
        .with_target_users(3)
        .with_think_time_ms(100)
        .with_template(ping_template());

    let monitor = Arc::new(InMemoryMonitor::new());
    let scheduler = VirtualUserScheduler::new(
        scenario,
        Arc::new(StaticExecutor::new().with_latency_ms(10)),
    )
    .unwrap()
    .with_monitor(monitor.clone());

    scheduler.run().await.unwrap();

    let samples = monitor.samples();
    // ~1 Hz over 3 seconds, plus the immediate first tick
    assert!(
        (2..=5).contains(&samples.len()),
        "expected 2..=5 samples, got {}",
        samples.len()
    );
    for window in samples.windows(2) {
        assert!(window[0].elapsed_ms <= window[1].elapsed_ms);
        assert!(window[0].total_requests <= window[1].total_requests);
    }
    let last = samples.last().unwrap();
    assert!(last.total_requests > 0);
    assert!(last.peak_users <= 3);
    assert!(
        last.state == RunState::RampingUp || last.state == RunState::Running,
        "monitor never observes a stopped run"
    );
}

// =============================================================================
// Report artifacts
// =============================================================================

#[test_log::test(tokio::test)]
async fn test_report_round_trips_through_json() {
    let scenario = Scenario::new("artifact")
        .with_duration_secs(1)
        .with_ramp_up_secs(0)
        .with_target_users(2)
        .with_think_time_ms(100)
        .with_template(ping_template());

    let scheduler = VirtualUserScheduler::new(
        scenario,
        Arc::new(StaticExecutor::new().with_latency_ms(5)),
    )
    .unwrap();
    let report = scheduler.run().await.unwrap();

    let encoded = serde_json::to_string_pretty(&report).unwrap();
    let decoded: RunReport = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.run_id, report.run_id);
    assert_eq!(decoded.scenario, report.scenario);
    assert_eq!(decoded.metrics, report.metrics);
}
