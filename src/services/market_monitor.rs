use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::constants::market::{COIN_PAGE_BASE, SMALL_PRICE_CUTOFF};
use crate::data::store::ListStore;
use crate::error::Result;
use crate::sources::coinmarketcap::fetch_market_reading;
use crate::sources::traits::{MarketDataApi, SentimentApi};
use crate::sources::types::{FearGreedReading, MarketReading, Mover};

use super::notifier::Notifier;
use super::scheduler::{CycleOutcome, PollingTask};

/// Direction of a value against its previous observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// No previous observation
    New,
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn from_delta(delta: Option<f64>) -> Self {
        match delta {
            None => Direction::New,
            Some(d) if d > 0.0 => Direction::Up,
            Some(d) if d < 0.0 => Direction::Down,
            Some(_) => Direction::Flat,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Direction::New => "💰",
            Direction::Up => "📈",
            Direction::Down => "📉",
            Direction::Flat => "➖",
        }
    }
}

/// Previous readings for the market loop. Lives as long as the process.
#[derive(Debug, Default)]
pub struct PriceTracker {
    prices: HashMap<String, f64>,
    last_btc_dominance: Option<f64>,
}

impl PriceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `price` and return the change since the last one, if any.
    pub fn observe_price(&mut self, symbol: &str, price: f64) -> Option<f64> {
        self.prices
            .insert(symbol.to_string(), price)
            .map(|previous| price - previous)
    }

    pub fn observe_btc_dominance(&mut self, value: f64) -> Option<f64> {
        self.last_btc_dominance
            .replace(value)
            .map(|previous| value - previous)
    }

    #[cfg(test)]
    pub(crate) fn last_price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }
}

pub fn format_price(price: f64) -> String {
    if price < SMALL_PRICE_CUTOFF {
        format!("${:.4}", price)
    } else {
        format!("${:.2}", price)
    }
}

/// Signed delta, with precision chosen by the current price.
pub fn format_price_delta(delta: f64, price: f64) -> String {
    if price < SMALL_PRICE_CUTOFF {
        format!("({:+.4})", delta)
    } else {
        format!("({:+.2})", delta)
    }
}

pub fn coin_link(name: &str) -> String {
    format!("{}{}/", COIN_PAGE_BASE, name.to_lowercase().replace(' ', "-"))
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
}

fn mover_anchor(mover: &Mover) -> String {
    format!(
        "<a href='{}'>{} ({})</a>",
        coin_link(&mover.name),
        escape_html(&mover.name),
        escape_html(&mover.symbol)
    )
}

/// Render one market update and advance the tracker.
///
/// Every present price and the BTC dominance are written to `tracker`,
/// whether or not a delta could be shown.
pub fn render_market_update(
    reading: &MarketReading,
    sentiment: Option<&FearGreedReading>,
    tracker: &mut PriceTracker,
    now: DateTime<Local>,
) -> String {
    let coin_lines: Vec<String> = reading
        .per_symbol
        .iter()
        .filter_map(|quote| {
            let price = quote.price?;
            let delta = tracker.observe_price(&quote.symbol, price);
            let delta_text = delta
                .map(|d| format_price_delta(d, price))
                .unwrap_or_default();
            Some(format!(
                "{} <a href='{}'>{} ({})</a>: {} {}",
                Direction::from_delta(delta).marker(),
                coin_link(&quote.name),
                escape_html(&quote.name),
                escape_html(&quote.symbol),
                format_price(price),
                delta_text
            ))
        })
        .collect();

    let gainer = reading
        .top_gainer
        .as_ref()
        .map(|m| format!("🔥 Top Gainer: {} ({:+.2}%)\n", mover_anchor(m), m.change_24h))
        .unwrap_or_default();
    let loser = reading
        .top_loser
        .as_ref()
        .map(|m| format!("❄️ Top Loser: {} ({:.2}%)\n\n", mover_anchor(m), m.change_24h))
        .unwrap_or_default();

    let btc_dominance = match tracker.observe_btc_dominance(reading.btc_dominance) {
        Some(delta) => format!("{:.2} ({:+.2})", reading.btc_dominance, delta),
        None => format!("{:.2}", reading.btc_dominance),
    };

    let (index, label) = sentiment
        .map(|s| (s.index_value.as_str(), s.classification.as_str()))
        .unwrap_or(("N/A", "N/A"));

    format!(
        "📈 <b>Crypto Market Update</b>\n\n\
         {}\n\n\
         {}{}\
         🌐 Total Market Cap: ${:.2}T\n\
         📊 BTC Dominance: {}%\n\
         📊 ETH Dominance: {:.2}%\n\
         📊 Altcoin Dominance: {:.2}%\n\
         😨 Fear & Greed Index: {} ({})\n\n\
         🕒 Sent at: {}",
        coin_lines.join("\n"),
        gainer,
        loser,
        reading.total_market_cap / 1e12,
        btc_dominance,
        reading.eth_dominance,
        reading.alt_dominance,
        escape_html(index),
        escape_html(label),
        now.format("%H:%M")
    )
}

/// Market polling cycle: read tickers, fetch, render, send.
pub struct MarketMonitor {
    store: ListStore,
    market: Arc<dyn MarketDataApi>,
    sentiment: Arc<dyn SentimentApi>,
    notifier: Arc<dyn Notifier>,
    tracker: PriceTracker,
}

impl MarketMonitor {
    pub fn new(
        store: ListStore,
        market: Arc<dyn MarketDataApi>,
        sentiment: Arc<dyn SentimentApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            market,
            sentiment,
            notifier,
            tracker: PriceTracker::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn tracker(&self) -> &PriceTracker {
        &self.tracker
    }
}

#[async_trait]
impl PollingTask for MarketMonitor {
    fn name(&self) -> &str {
        "MARKET"
    }

    async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let symbols = self.store.load_tickers();
        info!("📡 [MARKET] Fetching market data for {} tickers", symbols.len());

        let reading = match fetch_market_reading(self.market.as_ref(), &symbols).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!("⚠️ [MARKET] Skipping update this cycle: {}", e);
                return Ok(CycleOutcome::Completed { attempted: 1, succeeded: 0 });
            }
        };

        let sentiment = match self.sentiment.fear_greed().await {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!("⚠️ [MARKET] Fear & Greed unavailable: {}", e);
                None
            }
        };

        let text = render_market_update(&reading, sentiment.as_ref(), &mut self.tracker, Local::now());
        self.notifier.send(&text).await;
        Ok(CycleOutcome::Completed { attempted: 1, succeeded: 1 })
    }
}
