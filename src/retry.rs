//! Bounded retry and failure-streak bookkeeping shared by the fetchers and
//! the scheduler loops.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Backoff {
    Fixed(Duration),
    /// `base * 2^(retry - 1)`, capped at `max`
    Exponential { base: Duration, max: Duration },
}

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

/// Returned once every attempt has failed; carries the last error seen.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Delay slept before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(retry.saturating_sub(1));
                base.saturating_mul(factor).min(max)
            }
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. The policy sleeps only
    /// between attempts, never after the last one.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            info!("🔁 [RETRY] Attempt {}/{} for {}", attempt, self.max_attempts, label);
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("⚠️ [RETRY] Attempt {} for {} failed: {}", attempt, label, e);
                    if attempt >= self.max_attempts {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                    let delay = self.delay_for(attempt);
                    info!("⏳ [RETRY] Retrying {} in {:.1}s", label, delay.as_secs_f64());
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Counts consecutive unsuccessful cycles and says when to back off.
#[derive(Debug)]
pub struct FailureStreak {
    threshold: u32,
    count: u32,
}

impl FailureStreak {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            count: 0,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Record one cycle. Returns true when the threshold is reached, in
    /// which case the streak is reset.
    pub fn record(&mut self, success: bool) -> bool {
        if success {
            self.count = 0;
            return false;
        }
        self.count += 1;
        if self.count >= self.threshold {
            self.count = 0;
            return true;
        }
        false
    }
}
