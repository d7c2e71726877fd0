use async_trait::async_trait;
use tracing::{error, warn};

use crate::constants::scraper;
use crate::error::{MonitorError, Result};
use crate::retry::RetryPolicy;

use super::selectors::{parse_amount, PortfolioField};
use super::traits::{PageReader, PortfolioSource};
use super::types::{PortfolioSnapshot, RawPortfolioPage};

pub const UNKNOWN_USERNAME: &str = "Unknown";

/// Turn one attempt's raw texts into a snapshot. A missing or unparseable
/// total value fails the attempt; optional fields degrade to `None`.
pub fn parse_page(page: RawPortfolioPage) -> Result<PortfolioSnapshot> {
    let total_label = PortfolioField::TotalValue.label();
    let total_text = page.total_value.ok_or_else(|| MonitorError::MissingField {
        field: total_label.to_string(),
    })?;
    let total_value = parse_amount(&total_text).ok_or_else(|| MonitorError::Parse {
        field: total_label.to_string(),
        text: total_text.clone(),
    })?;

    let optional = |field: PortfolioField, text: Option<String>| {
        let text = text?;
        let parsed = parse_amount(&text);
        if parsed.is_none() {
            warn!("⚠️ [SCRAPER] Failed to parse {} '{}'", field.label(), text);
        }
        parsed
    };

    Ok(PortfolioSnapshot {
        username: page
            .username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
        total_value,
        pct_change_24h: optional(PortfolioField::PctChange24h, page.pct_change_24h),
        money_changed: optional(PortfolioField::MoneyChanged, page.money_changed),
    })
}

/// Portfolio acquisition with bounded whole-session retries.
pub struct PortfolioFetcher<R: PageReader> {
    reader: R,
    policy: RetryPolicy,
}

impl<R: PageReader> PortfolioFetcher<R> {
    pub fn new(reader: R) -> Self {
        Self::with_policy(
            reader,
            RetryPolicy::fixed(scraper::MAX_ATTEMPTS, scraper::RETRY_DELAY),
        )
    }

    pub fn with_policy(reader: R, policy: RetryPolicy) -> Self {
        Self { reader, policy }
    }

    #[cfg(test)]
    pub(crate) fn reader(&self) -> &R {
        &self.reader
    }
}

#[async_trait]
impl<R: PageReader> PortfolioSource for PortfolioFetcher<R> {
    async fn fetch(&self, portfolio_url: &str) -> Result<PortfolioSnapshot> {
        let reader = &self.reader;
        self.policy
            .run(portfolio_url, |_attempt| async move {
                let page = reader.read_page(portfolio_url).await?;
                parse_page(page)
            })
            .await
            .map_err(|exhausted| {
                error!(
                    "❌ [PORTFOLIO] Failed to fetch {} after {} attempts",
                    portfolio_url, exhausted.attempts
                );
                MonitorError::RetriesExhausted {
                    attempts: exhausted.attempts,
                    last_error: exhausted.last_error.to_string(),
                }
            })
    }
}
