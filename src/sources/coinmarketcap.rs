//! CoinMarketCap REST client and the pure reduction of its two payloads
//! into a [`MarketReading`].

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::constants::{http, market};
use crate::error::{MonitorError, Result};

use super::traits::MarketDataApi;
use super::types::{
    GlobalMetricsResponse, ListingEntry, ListingsResponse, MarketReading, Mover, SymbolQuote,
};

#[derive(Clone)]
pub struct CoinMarketCapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoinMarketCapClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, market::COINMARKETCAP_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self> {
        let client = Client::builder().timeout(http::REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[MARKET] GET {}", url);
        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .query(query)
            .send()
            .await?;
        read_json(resp).await
    }
}

/// Map non-2xx to [`MonitorError::Http`] and decode the body.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(MonitorError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl MarketDataApi for CoinMarketCapClient {
    async fn global_metrics(&self) -> Result<GlobalMetricsResponse> {
        self.get_json(market::GLOBAL_METRICS_PATH, &[]).await
    }

    async fn listings(&self) -> Result<ListingsResponse> {
        let query = [
            ("start", market::LISTINGS_START.to_string()),
            ("limit", market::LISTINGS_LIMIT.to_string()),
            ("convert", market::QUOTE_CURRENCY.to_string()),
        ];
        self.get_json(market::LISTINGS_PATH, &query).await
    }
}

/// Fetch both payloads and reduce them. No partial result: either read
/// failing fails the whole fetch.
pub async fn fetch_market_reading(api: &dyn MarketDataApi, symbols: &[String]) -> Result<MarketReading> {
    let global = api.global_metrics().await.map_err(|e| {
        error!("❌ [MARKET] Failed to fetch global metrics: {}", e);
        e
    })?;
    let listings = api.listings().await.map_err(|e| {
        error!("❌ [MARKET] Failed to fetch listings: {}", e);
        e
    })?;
    Ok(build_reading(&global, &listings.data, symbols))
}

pub fn alt_dominance(btc: f64, eth: f64) -> f64 {
    (100.0 - btc - eth).clamp(0.0, 100.0)
}

/// Entries with a 24h change, reduced to (gainer, loser).
pub fn top_movers(entries: &[ListingEntry]) -> (Option<Mover>, Option<Mover>) {
    let with_change = entries
        .iter()
        .filter_map(|e| e.quote.usd.percent_change_24h.map(|c| (e, c)));

    let gainer = with_change.clone().max_by(|a, b| a.1.total_cmp(&b.1));
    let loser = with_change.min_by(|a, b| a.1.total_cmp(&b.1));

    let to_mover = |(entry, change): (&ListingEntry, f64)| Mover {
        name: entry.name.clone(),
        symbol: entry.symbol.clone(),
        change_24h: change,
    };
    (gainer.map(to_mover), loser.map(to_mover))
}

pub fn build_reading(
    global: &GlobalMetricsResponse,
    entries: &[ListingEntry],
    symbols: &[String],
) -> MarketReading {
    let (top_gainer, top_loser) = top_movers(entries);

    let mut seen = HashSet::new();
    let per_symbol = symbols
        .iter()
        .filter(|s| seen.insert(*s))
        .filter_map(|symbol| {
            // First exact match wins; unknown symbols are simply left out
            entries.iter().find(|e| &e.symbol == symbol).map(|e| SymbolQuote {
                symbol: symbol.clone(),
                name: e.name.clone(),
                price: e.quote.usd.price,
                change_24h: e.quote.usd.percent_change_24h,
            })
        })
        .collect();

    let data = &global.data;
    MarketReading {
        per_symbol,
        top_gainer,
        top_loser,
        total_market_cap: data.quote.usd.total_market_cap,
        btc_dominance: data.btc_dominance,
        eth_dominance: data.eth_dominance,
        alt_dominance: alt_dominance(data.btc_dominance, data.eth_dominance),
    }
}
