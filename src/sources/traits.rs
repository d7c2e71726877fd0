use async_trait::async_trait;

use crate::error::Result;

use super::types::{
    FearGreedReading, GlobalMetricsResponse, ListingsResponse, PortfolioSnapshot, RawPortfolioPage,
};

/// Market-data endpoints. Either read failing fails the market fetch.
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    async fn global_metrics(&self) -> Result<GlobalMetricsResponse>;
    async fn listings(&self) -> Result<ListingsResponse>;
}

/// Independent sentiment index; its failure never fails the market fetch.
#[async_trait]
pub trait SentimentApi: Send + Sync {
    async fn fear_greed(&self) -> Result<FearGreedReading>;
}

/// One hermetic page read: open a session, read the field texts, tear down.
#[async_trait]
pub trait PageReader: Send + Sync {
    async fn read_page(&self, url: &str) -> Result<RawPortfolioPage>;
}

/// Capability interface the portfolio loop depends on. Errors only after
/// the implementation has spent its own retries.
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    async fn fetch(&self, portfolio_url: &str) -> Result<PortfolioSnapshot>;
}
