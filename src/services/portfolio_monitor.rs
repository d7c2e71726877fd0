use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::constants::{alerts, schedule};
use crate::data::store::{ListStore, Portfolio};
use crate::error::Result;
use crate::sources::traits::PortfolioSource;
use crate::sources::types::PortfolioSnapshot;

use super::market_monitor::escape_html;
use super::notifier::Notifier;
use super::scheduler::{CycleOutcome, PollingTask};

/// Change recorded by one observation of a portfolio's total value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueChange {
    /// None on the first observation
    pub delta: Option<f64>,
    pub cumulative: f64,
}

/// Previous totals and running gain/loss per portfolio name.
#[derive(Debug, Default)]
pub struct PortfolioTracker {
    values: HashMap<String, f64>,
    cumulative: HashMap<String, f64>,
}

impl PortfolioTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first observation starts the running sum at zero; later ones add
    /// their delta.
    pub fn observe(&mut self, name: &str, value: f64) -> ValueChange {
        let delta = self
            .values
            .insert(name.to_string(), value)
            .map(|previous| value - previous);

        let cumulative = self.cumulative.entry(name.to_string()).or_insert(0.0);
        match delta {
            Some(d) => *cumulative += d,
            None => *cumulative = 0.0,
        }

        ValueChange {
            delta,
            cumulative: *cumulative,
        }
    }

    #[cfg(test)]
    pub(crate) fn cumulative(&self, name: &str) -> Option<f64> {
        self.cumulative.get(name).copied()
    }
}

/// " (+50.00)" style suffix; a zero change carries no sign.
fn delta_suffix(delta: Option<f64>) -> String {
    match delta {
        Some(d) if d > 0.0 => format!(" (+{:.2})", d),
        Some(d) => format!(" ({:.2})", d),
        None => String::new(),
    }
}

pub fn render_portfolio_update(
    portfolio_name: &str,
    snapshot: &PortfolioSnapshot,
    change: ValueChange,
    now: DateTime<Local>,
) -> String {
    let mut text = format!(
        "📊 <b>{} Update</b>\n🔗 <b>Portfolio:</b> {}\n\n💰 Current Value: ${:.2}{}\n",
        escape_html(&snapshot.username),
        escape_html(portfolio_name),
        snapshot.total_value,
        delta_suffix(change.delta)
    );

    if let Some(pct) = snapshot.pct_change_24h {
        let marker = if snapshot.money_changed.unwrap_or(0.0) > 0.0 { "📈" } else { "📉" };
        text.push_str(&format!("{} 24h Change: {:.2}%\n", marker, pct));
    }
    if let Some(money) = snapshot.money_changed {
        text.push_str(&format!("💵 Money Changed: ${:.2}\n", money));
    }

    text.push_str(&format!(
        "📊 Total Gain/Loss: ${:.2}\n\n🕒 Updated at: {}",
        change.cumulative,
        now.format("%H:%M")
    ));
    text
}

pub fn render_threshold_alert(
    portfolio_name: &str,
    username: &str,
    total_value: f64,
    threshold: f64,
    now: DateTime<Local>,
) -> String {
    format!(
        "🚀 <b>THRESHOLD ALERT</b>\n\
         👤 <b>User:</b> {}\n\
         📊 <b>Portfolio:</b> {}\n\n\
         💰 Current Value: ${:.2}\n\
         ⚠️ Threshold of ${:.2} reached!\n\
         🕒 Alert time: {}",
        escape_html(username),
        escape_html(portfolio_name),
        total_value,
        threshold,
        now.format("%H:%M")
    )
}

/// Alerts fire when a positive threshold is reached or exceeded.
pub fn should_alert(threshold: f64, total_value: f64) -> bool {
    threshold > 0.0 && total_value >= threshold
}

/// Redundant alert delivery: the same text `repeat` times, paused between.
#[derive(Clone, Copy, Debug)]
pub struct AlertPolicy {
    pub repeat: u32,
    pub pause: Duration,
}

impl AlertPolicy {
    pub fn new(repeat: u32) -> Self {
        Self {
            repeat,
            pause: alerts::REPEAT_PAUSE,
        }
    }

    /// Returns how many sends succeeded.
    pub async fn deliver(&self, notifier: &dyn Notifier, text: &str) -> u32 {
        let mut delivered = 0;
        for i in 0..self.repeat {
            if notifier.send(text).await {
                delivered += 1;
            }
            if i + 1 < self.repeat {
                sleep(self.pause).await;
            }
        }
        delivered
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(alerts::DEFAULT_REPEAT_COUNT)
    }
}

/// Portfolio polling cycle: every stored portfolio, one at a time.
pub struct PortfolioMonitor {
    store: ListStore,
    source: Arc<dyn PortfolioSource>,
    notifier: Arc<dyn Notifier>,
    tracker: PortfolioTracker,
    alerts: AlertPolicy,
    pacing: Duration,
}

impl PortfolioMonitor {
    pub fn new(
        store: ListStore,
        source: Arc<dyn PortfolioSource>,
        notifier: Arc<dyn Notifier>,
        alerts: AlertPolicy,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            tracker: PortfolioTracker::new(),
            alerts,
            pacing: schedule::PORTFOLIO_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    #[cfg(test)]
    pub(crate) fn tracker(&self) -> &PortfolioTracker {
        &self.tracker
    }

    /// Fetch, report and alert for one portfolio. Returns false when the
    /// portfolio could not be read this cycle.
    async fn check(&mut self, portfolio: &Portfolio) -> bool {
        info!("🔍 [PORTFOLIO] Checking portfolio: {}", portfolio.name);
        let snapshot = match self.source.fetch(&portfolio.url).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("⚠️ [PORTFOLIO] Failed to get data for {}: {}", portfolio.name, e);
                return false;
            }
        };

        let change = self.tracker.observe(&portfolio.name, snapshot.total_value);
        if let Err(e) = self.store.record_cumulative(&portfolio.name, change.cumulative) {
            error!("❌ [PORTFOLIO] Could not persist gain/loss for {}: {}", portfolio.name, e);
        }

        let now = Local::now();
        let update = render_portfolio_update(&portfolio.name, &snapshot, change, now);
        self.notifier.send(&update).await;

        if should_alert(portfolio.threshold, snapshot.total_value) {
            info!(
                "🚀 [PORTFOLIO] {} reached threshold {:.2}",
                portfolio.name, portfolio.threshold
            );
            let alert = render_threshold_alert(
                &portfolio.name,
                &snapshot.username,
                snapshot.total_value,
                portfolio.threshold,
                now,
            );
            self.alerts.deliver(self.notifier.as_ref(), &alert).await;
        }
        true
    }
}

#[async_trait]
impl PollingTask for PortfolioMonitor {
    fn name(&self) -> &str {
        "PORTFOLIO"
    }

    async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let portfolios = self.store.load_portfolios();
        if portfolios.is_empty() {
            return Ok(CycleOutcome::Idle);
        }

        let mut succeeded = 0;
        for portfolio in &portfolios {
            if self.check(portfolio).await {
                succeeded += 1;
            }
            sleep(self.pacing).await;
        }

        Ok(CycleOutcome::Completed {
            attempted: portfolios.len(),
            succeeded,
        })
    }
}
