//! Polling loop driver shared by the market and portfolio monitors.

use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::constants::schedule;
use crate::error::Result;
use crate::retry::FailureStreak;

/// Result of one polling cycle that did not fail as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing to monitor; the loop waits the idle delay and tries again
    Idle,
    Completed { attempted: usize, succeeded: usize },
}

impl CycleOutcome {
    pub fn made_progress(&self) -> bool {
        matches!(self, CycleOutcome::Completed { succeeded, .. } if *succeeded > 0)
    }
}

/// One unit of periodic work. Per-entity failures are handled inside the
/// cycle; an `Err` means the cycle failed as a whole.
#[async_trait]
pub trait PollingTask: Send {
    fn name(&self) -> &str;

    async fn run_cycle(&mut self) -> Result<CycleOutcome>;
}

/// Extended cooldown after repeated zero-success cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Escalation {
    pub max_failures: u32,
    pub cooldown: Duration,
}

#[derive(Clone, Copy, Debug)]
pub struct Schedule {
    pub interval: Duration,
    pub countdown_step: Duration,
    pub error_cooldown: Duration,
    pub idle_delay: Duration,
    pub escalation: Option<Escalation>,
}

impl Schedule {
    pub fn market(interval: Duration) -> Self {
        Self {
            interval,
            countdown_step: schedule::COUNTDOWN_STEP,
            error_cooldown: schedule::ERROR_COOLDOWN,
            idle_delay: schedule::IDLE_DELAY,
            escalation: None,
        }
    }

    pub fn portfolio(interval: Duration) -> Self {
        Self {
            escalation: Some(Escalation {
                max_failures: schedule::MAX_CONSECUTIVE_FAILURES,
                cooldown: schedule::EXTENDED_COOLDOWN,
            }),
            ..Self::market(interval)
        }
    }
}

/// Drive `task` forever. A failing cycle never ends the loop.
pub async fn run_forever<T: PollingTask>(mut task: T, schedule: Schedule) {
    let mut streak = schedule
        .escalation
        .map(|e| (FailureStreak::new(e.max_failures), e.cooldown));

    info!(
        "⏱️ [{}] Loop started (every {}s)",
        task.name(),
        schedule.interval.as_secs()
    );

    loop {
        match task.run_cycle().await {
            Ok(CycleOutcome::Idle) => {
                warn!("⚠️ [{}] Nothing to monitor", task.name());
                sleep(schedule.idle_delay).await;
                continue;
            }
            Ok(outcome) => {
                if let CycleOutcome::Completed { attempted, succeeded } = outcome {
                    info!("✅ [{}] Cycle done: {}/{} updated", task.name(), succeeded, attempted);
                }
                if let Some((streak, cooldown)) = streak.as_mut() {
                    if streak.record(outcome.made_progress()) {
                        error!(
                            "🚨 [{}] Too many consecutive failed cycles. Pausing {}s",
                            task.name(),
                            cooldown.as_secs()
                        );
                        sleep(*cooldown).await;
                    }
                }
                countdown(task.name(), schedule.interval, schedule.countdown_step).await;
            }
            Err(e) => {
                error!("❌ [{}] Cycle failed: {}", task.name(), e);
                sleep(schedule.error_cooldown).await;
            }
        }
    }
}

/// Sleep `total` in `step` slices, logging the time left before each one.
pub async fn countdown(name: &str, total: Duration, step: Duration) {
    let step = step.max(Duration::from_secs(1));
    let mut remaining = total;
    while !remaining.is_zero() {
        info!("⏳ [{}] Next update in: {}", name, format_mm_ss(remaining));
        let slice = remaining.min(step);
        sleep(slice).await;
        remaining -= slice;
    }
}

pub fn format_mm_ss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Wait for `shutdown` or for any of `tasks` to end, then abort the rest.
///
/// The long-running tasks never return on their own, so one that does has
/// panicked or been cancelled. Its name is returned.
pub async fn supervise<F>(tasks: Vec<(&'static str, JoinHandle<()>)>, shutdown: F) -> Option<&'static str>
where
    F: Future<Output = ()>,
{
    let mut tasks = tasks;
    let first_exit = poll_fn(|cx| {
        for (name, handle) in tasks.iter_mut() {
            if let Poll::Ready(result) = Pin::new(handle).poll(cx) {
                return Poll::Ready((*name, result));
            }
        }
        Poll::Pending
    });

    let stopped = tokio::select! {
        _ = shutdown => {
            info!("Shutdown requested, stopping monitors");
            None
        }
        (name, result) = first_exit => {
            error!("❌ [MAIN] {} task stopped unexpectedly: {:?}", name, result);
            Some(name)
        }
    };

    for (_, handle) in &tasks {
        handle.abort();
    }
    stopped
}
