use async_trait::async_trait;
use reqwest::Client;

use crate::constants::{http, market};
use crate::error::{MonitorError, Result};

use super::coinmarketcap::read_json;
use super::traits::SentimentApi;
use super::types::{FearGreedReading, FearGreedResponse};

/// alternative.me Fear & Greed index (unauthenticated).
#[derive(Clone)]
pub struct FearGreedClient {
    client: Client,
    url: String,
}

impl FearGreedClient {
    pub fn new() -> Result<Self> {
        Self::with_url(market::FEAR_GREED_URL.to_string())
    }

    pub fn with_url(url: String) -> Result<Self> {
        let client = Client::builder().timeout(http::REQUEST_TIMEOUT).build()?;
        Ok(Self { client, url })
    }
}

pub fn first_reading(resp: FearGreedResponse) -> Result<FearGreedReading> {
    let entry = resp
        .data
        .into_iter()
        .next()
        .ok_or_else(|| MonitorError::MissingField {
            field: "fear_greed.data[0]".to_string(),
        })?;
    Ok(FearGreedReading {
        index_value: entry.value,
        classification: entry.value_classification,
    })
}

#[async_trait]
impl SentimentApi for FearGreedClient {
    async fn fear_greed(&self) -> Result<FearGreedReading> {
        let resp = self.client.get(&self.url).send().await?;
        first_reading(read_json(resp).await?)
    }
}
