//! Static Run Example - Full engine pass against a simulated target
//!
//! Builds a small weighted scenario, drives it with the in-process
//! StaticExecutor, and prints the reduced metrics plus the threshold
//! verdict. No network involved.
//!
//! Run with: cargo run -p loadsmith-engine --example static_run
//! Set RUST_LOG=loadsmith_engine=debug to watch the scheduler work.

use std::sync::Arc;

use loadsmith_engine::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loadsmith_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== loadsmith static run ===\n");

    // 1. Describe the plan: 10 users over 15 seconds, browsing-heavy mix
    let scenario = Scenario::new("storefront-smoke")
        .with_kind(TestKind::Stress)
        .with_duration_secs(15)
        .with_ramp_up_secs(5)
        .with_target_users(10)
        .with_think_time_ms(250)
        .with_template(RequestTemplate::get("https://shop.test/products").with_weight(6.0))
        .with_template(
            RequestTemplate::post("https://shop.test/cart", serde_json::json!({"sku": "A-1"}))
                .with_header("content-type", "application/json")
                .with_weight(3.0),
        )
        .with_template(RequestTemplate::get("https://shop.test/checkout").with_weight(1.0));

    // 2. Wire in a simulated target: constant 40ms responses
    let executor = Arc::new(StaticExecutor::new().with_latency_ms(40));

    // 3. Run with a progress monitor attached
    let monitor = Arc::new(InMemoryMonitor::new());
    let scheduler = VirtualUserScheduler::new(scenario, executor)?.with_monitor(monitor.clone());
    let report = scheduler.run().await?;

    // 4. Show what the monitor saw while the run was live
    for sample in monitor.samples() {
        println!(
            "  t={:>5}ms  state={:<10}  users={:>2}  requests={:>4}  rps={:.1}",
            sample.elapsed_ms,
            sample.state.to_string(),
            sample.active_users,
            sample.total_requests,
            sample.requests_per_sec,
        );
    }

    // 5. The reduced numbers
    let m = &report.metrics;
    println!("\nrun {} ({})", report.run_id, report.scenario);
    println!("  requests : {} total, {} ok", m.total_requests, m.successful_requests);
    println!(
        "  latency  : min {:.0}ms / median {:.0}ms / p95 {:.0}ms / p99 {:.0}ms / max {:.0}ms",
        m.latency.min_ms, m.latency.median_ms, m.latency.p95_ms, m.latency.p99_ms, m.latency.max_ms
    );
    println!(
        "  rate     : {:.1} req/s ({:.1} ok/s)",
        m.throughput.requests_per_sec, m.throughput.transactions_per_sec
    );
    println!(
        "  users    : peak {} / avg {:.1}",
        m.concurrency.peak_users, m.concurrency.average_users
    );

    // 6. Validate against thresholds sized for this plan
    let thresholds = ThresholdSet::relaxed().with_min_requests_per_sec(5.0);
    let verdict = validate(&report.metrics, &thresholds);
    if verdict.passed {
        println!("\nverdict: PASS");
    } else {
        println!("\nverdict: FAIL");
        for violation in &verdict.violations {
            println!(
                "  {} was {:.1}, required {:.1} ({})",
                violation.metric, violation.actual, violation.required, violation.hint
            );
        }
    }

    Ok(())
}
