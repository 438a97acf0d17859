//! Virtual-user scheduling: ramp-up, steady load, deadline, abort.
//!
//! One scheduler owns one run. It admits virtual users on a fixed cadence
//! until the scenario's target is reached, lets each user loop through
//! select/execute/record/think against the injected executor, and stops
//! everything together at the deadline or on an abort:
//!
//! ```text
//! Pending ──> RampingUp ──> Running ──> Stopped
//!                 │                        ^
//!                 └── abort / deadline ────┘
//! ```
//!
//! Users observe the stop flag only at suspension points, so a request that
//! is in flight when the run stops always completes and its outcome is still
//! recorded.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use loadsmith_core::executor::RequestExecutor;
use loadsmith_core::metrics::{ConcurrencyStats, MetricsSnapshot};
use loadsmith_core::outcome::RequestOutcome;
use loadsmith_core::scenario::{ConfigError, RequestTemplate, Scenario, TestKind};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::monitor::{RunMonitor, RunProgress};
use crate::recorder::OutcomeRecorder;
use crate::reducer::reduce;
use crate::select::select_template;

/// Errors from scheduler construction and misuse.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The plan failed validation; nothing was scheduled
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Each scheduler drives exactly one run
    #[error("scheduler already started")]
    AlreadyStarted,
}

/// Lifecycle of one run. States only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Constructed, not yet started
    Pending,
    /// Admitting users on the ramp cadence
    RampingUp,
    /// Every target user admitted
    Running,
    /// Deadline hit or aborted; users are winding down
    Stopped,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Pending => write!(f, "pending"),
            RunState::RampingUp => write!(f, "ramping_up"),
            RunState::Running => write!(f, "running"),
            RunState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Requests an early stop of a run, from any task.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    stop: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    /// Flip the shared stop flag. Idempotent; in-flight requests still
    /// complete and record their outcomes.
    pub fn abort(&self) {
        let _ = self.stop.send(true);
    }
}

/// What a finished run resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Time-ordered id for correlating logs and persisted artifacts
    pub run_id: Uuid,
    /// Name of the scenario that ran
    pub scenario: String,
    /// Load profile tag from the plan
    pub kind: TestKind,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// True when the run stopped before its deadline
    pub aborted: bool,
    /// Reduced metrics over everything recorded
    pub metrics: MetricsSnapshot,
}

/// Live concurrency accounting shared with every user task.
#[derive(Debug, Default)]
struct UserCounters {
    active: AtomicU32,
    peak: AtomicU32,
}

impl UserCounters {
    fn user_started(&self) {
        let now = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        let mut peak = self.peak.load(Ordering::Relaxed);
        while now > peak {
            match self
                .peak
                .compare_exchange_weak(peak, now, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(current) => peak = current,
            }
        }
    }

    fn user_stopped(&self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }

    fn active(&self) -> u32 {
        self.active.load(Ordering::Relaxed)
    }

    fn peak(&self) -> u32 {
        self.peak.load(Ordering::Relaxed)
    }
}

/// Drives one load-test run end to end.
pub struct VirtualUserScheduler {
    scenario: Arc<Scenario>,
    executor: Arc<dyn RequestExecutor>,
    recorder: Arc<OutcomeRecorder>,
    monitor: Option<Arc<dyn RunMonitor>>,
    counters: Arc<UserCounters>,
    state: Arc<RwLock<RunState>>,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
    started: AtomicBool,
}

impl VirtualUserScheduler {
    /// Validate the plan and prepare a run.
    ///
    /// Fails fast on a bad plan; nothing is scheduled until
    /// [`run`](Self::run).
    pub fn new(
        scenario: Scenario,
        executor: Arc<dyn RequestExecutor>,
    ) -> Result<Self, SchedulerError> {
        scenario.validate()?;
        let (stop_tx, stop_rx) = watch::channel(false);
        Ok(Self {
            scenario: Arc::new(scenario),
            executor,
            recorder: Arc::new(OutcomeRecorder::new()),
            monitor: None,
            counters: Arc::new(UserCounters::default()),
            state: Arc::new(RwLock::new(RunState::Pending)),
            stop_tx: Arc::new(stop_tx),
            stop_rx,
            started: AtomicBool::new(false),
        })
    }

    /// Attach a progress observer, sampled roughly once a second.
    pub fn with_monitor(mut self, monitor: Arc<dyn RunMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Current position in the run lifecycle.
    pub fn state(&self) -> RunState {
        *self.state.read()
    }

    /// Users currently inside their request loop.
    pub fn active_users(&self) -> u32 {
        self.counters.active()
    }

    /// Highest concurrency seen so far.
    pub fn peak_users(&self) -> u32 {
        self.counters.peak()
    }

    /// Shared handle to the outcome sink; safe to snapshot mid-run.
    pub fn recorder(&self) -> Arc<OutcomeRecorder> {
        Arc::clone(&self.recorder)
    }

    /// Handle for stopping the run early, usable from any task.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            stop: Arc::clone(&self.stop_tx),
        }
    }

    /// Drive the whole run: ramp users in, hold until the deadline or an
    /// abort, wait for every user to wind down, then reduce the outcomes.
    ///
    /// Never fails on target misbehavior; a run where every request errored
    /// resolves normally with a 100% error rate.
    #[instrument(skip(self), fields(scenario = %self.scenario.name, kind = %self.scenario.kind))]
    pub async fn run(&self) -> Result<RunReport, SchedulerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyStarted);
        }

        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = start + self.scenario.duration();
        let target = self.scenario.target_users;

        info!(
            %run_id,
            duration_secs = self.scenario.duration_secs,
            target_users = target,
            ramp_up_secs = self.scenario.ramp_up_secs,
            "Starting run"
        );

        let mut users = JoinSet::new();
        let mut admitted: u32 = 0;
        let mut admitted_at: Vec<Instant> = Vec::with_capacity(target as usize);

        let cadence = ramp_cadence(self.scenario.ramp_up_secs, target);
        // A zero target ramps to nothing; the run idles to its deadline
        *self.state.write() = if target == 0 {
            RunState::Running
        } else {
            RunState::RampingUp
        };

        if cadence.is_zero() && target > 0 {
            while admitted < target {
                self.counters.user_started();
                admitted_at.push(Instant::now());
                self.spawn_user(&mut users, admitted, deadline);
                admitted += 1;
            }
            *self.state.write() = RunState::Running;
            info!(users = target, "Ramp-up complete");
        }

        // The floor only satisfies interval's nonzero requirement; the
        // admission branch is disabled once everyone is in
        let mut admission_tick = tokio::time::interval(cadence.max(Duration::from_millis(1)));
        let mut monitor_tick = tokio::time::interval(Duration::from_secs(1));
        monitor_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut stop_rx = self.stop_rx.clone();
        let mut aborted = false;

        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    debug!("Deadline reached");
                    break;
                }
                _ = stop_rx.changed() => {
                    if *stop_rx.borrow() {
                        info!(elapsed_ms = start.elapsed().as_millis() as u64, "Abort requested");
                        aborted = true;
                        break;
                    }
                }
                _ = admission_tick.tick(), if admitted < target => {
                    self.counters.user_started();
                    admitted_at.push(Instant::now());
                    self.spawn_user(&mut users, admitted, deadline);
                    admitted += 1;
                    debug!(user = admitted, target, "Admitted virtual user");
                    if admitted == target {
                        *self.state.write() = RunState::Running;
                        info!(users = target, "Ramp-up complete");
                    }
                }
                _ = monitor_tick.tick(), if self.monitor.is_some() => {
                    self.emit_progress(start).await;
                }
            }
        }

        // Broadcast stop, then let in-flight requests finish and record
        let _ = self.stop_tx.send(true);
        let active_at_end = self.counters.active();
        let stop_instant = Instant::now();
        *self.state.write() = RunState::Stopped;
        info!(
            active_at_end,
            recorded = self.recorder.len(),
            "Stopping; waiting for in-flight requests"
        );

        while let Some(joined) = users.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "Virtual user task ended abnormally");
            }
        }

        // Elapsed covers the wind-down tail so late-recorded outcomes stay
        // inside the measured window; the average covers the active window
        let elapsed = start.elapsed();
        let active_window = stop_instant.duration_since(start).as_secs_f64();
        let average_users = if active_window > 0.0 {
            admitted_at
                .iter()
                .map(|t| stop_instant.duration_since(*t).as_secs_f64())
                .sum::<f64>()
                / active_window
        } else {
            0.0
        };

        let concurrency = ConcurrencyStats {
            peak_users: self.counters.peak(),
            active_at_end,
            average_users,
        };
        let outcomes = self.recorder.snapshot();
        let metrics = reduce(&outcomes, elapsed, concurrency);

        info!(
            %run_id,
            total = metrics.total_requests,
            failed = metrics.errors.total,
            rps = metrics.throughput.requests_per_sec,
            aborted,
            "Run complete"
        );

        Ok(RunReport {
            run_id,
            scenario: self.scenario.name.clone(),
            kind: self.scenario.kind,
            started_at,
            aborted,
            metrics,
        })
    }

    fn spawn_user(&self, users: &mut JoinSet<()>, user_id: u32, deadline: Instant) {
        let scenario = Arc::clone(&self.scenario);
        let executor = Arc::clone(&self.executor);
        let recorder = Arc::clone(&self.recorder);
        let counters = Arc::clone(&self.counters);
        let stop_rx = self.stop_rx.clone();
        users.spawn(user_loop(
            user_id, scenario, executor, recorder, counters, stop_rx, deadline,
        ));
    }

    async fn emit_progress(&self, start: Instant) {
        if let Some(monitor) = &self.monitor {
            let elapsed = start.elapsed();
            let secs = elapsed.as_secs_f64();
            let total = self.recorder.len();
            let progress = RunProgress {
                elapsed_ms: elapsed.as_millis() as u64,
                state: self.state(),
                active_users: self.counters.active(),
                peak_users: self.counters.peak(),
                total_requests: total,
                failed_requests: self.recorder.failed(),
                requests_per_sec: if secs > 0.0 { total as f64 / secs } else { 0.0 },
            };
            monitor.on_progress(progress).await;
        }
    }
}

/// Milliseconds between admissions: the ramp window spread evenly across the
/// target users. Zero means admit everyone immediately.
fn ramp_cadence(ramp_up_secs: u64, target_users: u32) -> Duration {
    if target_users == 0 || ramp_up_secs == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(ramp_up_secs * 1_000 / target_users as u64)
}

/// One virtual user: select, execute, record, think, until stop or deadline.
///
/// Executor failures are absorbed into failed outcomes; a user never dies
/// because the target is misbehaving. The stop flag is checked only between
/// awaits, so an in-flight request always completes and records.
async fn user_loop(
    user_id: u32,
    scenario: Arc<Scenario>,
    executor: Arc<dyn RequestExecutor>,
    recorder: Arc<OutcomeRecorder>,
    counters: Arc<UserCounters>,
    mut stop_rx: watch::Receiver<bool>,
    deadline: Instant,
) {
    let think = scenario.think_time();
    debug!(user_id, "Virtual user started");

    loop {
        if *stop_rx.borrow() || Instant::now() >= deadline {
            break;
        }
        let template = select_template(&scenario.templates);
        let outcome = execute_once(executor.as_ref(), template).await;
        if !outcome.success {
            debug!(
                user_id,
                status = outcome.status_code,
                error = ?outcome.error,
                "Request failed"
            );
        }
        recorder.record(outcome);

        if *stop_rx.borrow() || Instant::now() >= deadline {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(think) => {}
            _ = stop_rx.changed() => {}
        }
    }

    counters.user_stopped();
    debug!(user_id, "Virtual user stopped");
}

/// Issue one templated request and normalize whatever happens into an
/// outcome.
///
/// Success requires a clean transport verdict and the expected status code.
/// An executor error becomes a failed outcome carrying the attempt's
/// observed wall time and a zero status code.
async fn execute_once(
    executor: &dyn RequestExecutor,
    template: &RequestTemplate,
) -> RequestOutcome {
    let attempt = Instant::now();
    match executor.execute(template, template.timeout()).await {
        Ok(response) => {
            let expected = response.status_code == template.expected_status;
            if response.success && response.error.is_none() && expected {
                RequestOutcome::success(response.response_time_ms, response.status_code)
            } else {
                RequestOutcome::failure(
                    response.response_time_ms,
                    response.status_code,
                    response.error,
                )
            }
        }
        Err(err) => RequestOutcome::failure(
            attempt.elapsed().as_millis() as u64,
            0,
            Some(err.classification().to_string()),
        ),
    }
}
