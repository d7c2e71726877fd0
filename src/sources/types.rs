use serde::{Deserialize, Serialize};

/// Quote for one tracked symbol inside a market reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolQuote {
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub change_24h: Option<f64>,
}

/// Top gainer / loser entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub name: String,
    pub symbol: String,
    pub change_24h: f64,
}

/// One market cycle's snapshot. Not persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketReading {
    /// Tracked symbols found in the listing, in the requested order
    pub per_symbol: Vec<SymbolQuote>,
    pub top_gainer: Option<Mover>,
    pub top_loser: Option<Mover>,
    pub total_market_cap: f64,
    pub btc_dominance: f64,
    pub eth_dominance: f64,
    pub alt_dominance: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FearGreedReading {
    pub index_value: String,
    pub classification: String,
}

/// Field texts read off a portfolio page in one browser attempt, before
/// any numeric parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPortfolioPage {
    pub username: Option<String>,
    pub total_value: Option<String>,
    pub pct_change_24h: Option<String>,
    pub money_changed: Option<String>,
}

/// Parsed result of a successful portfolio acquisition.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioSnapshot {
    pub username: String,
    pub total_value: f64,
    pub pct_change_24h: Option<f64>,
    pub money_changed: Option<f64>,
}

// ============= CoinMarketCap wire types =============

#[derive(Clone, Debug, Deserialize)]
pub struct GlobalMetricsResponse {
    pub data: GlobalMetricsData,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GlobalMetricsData {
    pub btc_dominance: f64,
    pub eth_dominance: f64,
    pub quote: UsdQuote<GlobalQuote>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GlobalQuote {
    pub total_market_cap: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UsdQuote<T> {
    #[serde(rename = "USD")]
    pub usd: T,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ListingsResponse {
    pub data: Vec<ListingEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    pub symbol: String,
    pub quote: UsdQuote<CoinQuote>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CoinQuote {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub percent_change_24h: Option<f64>,
}

// ============= alternative.me wire types =============

#[derive(Clone, Debug, Deserialize)]
pub struct FearGreedResponse {
    pub data: Vec<FearGreedEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FearGreedEntry {
    pub value: String,
    pub value_classification: String,
}
