//! Data-driven selector fallback lists for the portfolio page, plus the
//! text-to-number parsing applied to the scraped values.
//!
//! Site markup changes without notice, so the lists live in data: the
//! built-in defaults can be replaced per field from a YAML file such as
//!
//! ```yaml
//! total_value:
//!   - query: ".PortfolioPriceInfo_PT-price-info_price__yirGm"
//!   - kind: xpath
//!     query: "//div[@data-testid='portfolio-value']"
//! ```

use std::future::Future;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    #[default]
    Css,
    Xpath,
}

/// One way of locating an element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorStrategy {
    #[serde(default)]
    pub kind: SelectorKind,
    pub query: String,
}

impl SelectorStrategy {
    pub fn css(query: &str) -> Self {
        Self {
            kind: SelectorKind::Css,
            query: query.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortfolioField {
    Username,
    TotalValue,
    PctChange24h,
    MoneyChanged,
}

impl PortfolioField {
    pub fn label(self) -> &'static str {
        match self {
            PortfolioField::Username => "username",
            PortfolioField::TotalValue => "total value",
            PortfolioField::PctChange24h => "percentage change",
            PortfolioField::MoneyChanged => "money changed",
        }
    }

    /// Absence of an essential field fails the whole attempt.
    pub fn is_essential(self) -> bool {
        matches!(self, PortfolioField::TotalValue)
    }
}

/// Ordered strategies per field; earlier entries are tried first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    pub username: Vec<SelectorStrategy>,
    pub total_value: Vec<SelectorStrategy>,
    pub pct_change_24h: Vec<SelectorStrategy>,
    pub money_changed: Vec<SelectorStrategy>,
}

fn css_list(queries: &[&str]) -> Vec<SelectorStrategy> {
    queries.iter().map(|q| SelectorStrategy::css(q)).collect()
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            username: css_list(&[
                ".UserInfoMenuItemWithTitleAndDesc_user-data-with-title-and-desc__c2iGU h1",
                ".UserInfoMenuItemWithTitleAndDesc_user-data-with-title-and-desc__c2iGU span",
                "[class*=\"user-data-with-title\"] h1",
                "[class*=\"user-data-with-title\"] span",
                "h1[class*=\"user\"]",
                ".username",
                "[data-testid=\"username\"]",
            ]),
            total_value: css_list(&[
                ".PortfolioPriceInfo_PT-price-info_price__yirGm",
                ".PortfolioPriceInfo_PT-price-info_price__xjt40",
                "[class^=\"PortfolioPriceInfo_PT-price-info_price__\"]",
                "[class*=\"PT-price-info_price\"]",
                "[class*=\"price-info\"]",
                ".portfolio-value",
                "[data-testid=\"portfolio-value\"]",
            ]),
            pct_change_24h: css_list(&[
                ".PortfolioProfitInfo_percentText__kOZnu",
                ".PortfolioProfitInfo_percentText__3NKUK",
                "[class^=\"PortfolioProfitInfo_percentText__\"]",
                "[class*=\"percentText\"]",
                "[class*=\"percent\"]",
                ".percentage-change",
                "[data-testid=\"percentage-change\"]",
            ]),
            money_changed: css_list(&[
                ".PortfolioProfitInfo_PTProfitInfoPrice__POYqf",
                ".PortfolioProfitInfo_PTProfitInfoPrice__79_kR",
                "[class^=\"PortfolioProfitInfo_PTProfitInfoPrice__\"]",
                "[class*=\"PTProfitInfoPrice\"]",
                "[class*=\"PortfolioProfitInfo\"]",
                "[data-testid=\"money-change\"]",
                ".money-change",
            ]),
        }
    }
}

impl SelectorSet {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Built-in lists, overridden field by field from `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)?;
        let set = Self::from_yaml(&content)?;
        info!("🧭 [SCRAPER] Loaded selector lists from {}", path.display());
        Ok(set)
    }

    pub fn for_field(&self, field: PortfolioField) -> &[SelectorStrategy] {
        match field {
            PortfolioField::Username => &self.username,
            PortfolioField::TotalValue => &self.total_value,
            PortfolioField::PctChange24h => &self.pct_change_24h,
            PortfolioField::MoneyChanged => &self.money_changed,
        }
    }
}

/// Try each strategy in order; the first that yields non-empty text wins.
/// Probe errors count as a miss for that strategy only.
pub async fn first_match<'a, F, Fut>(
    field: PortfolioField,
    strategies: &'a [SelectorStrategy],
    mut probe: F,
) -> Option<String>
where
    F: FnMut(&'a SelectorStrategy) -> Fut,
    Fut: Future<Output = Result<Option<String>>>,
{
    let total = strategies.len();
    for (i, strategy) in strategies.iter().enumerate() {
        debug!(
            "[SCRAPER] Trying {} selector {}/{}: {}",
            field.label(),
            i + 1,
            total,
            strategy.query
        );
        match probe(strategy).await {
            Ok(Some(text)) => {
                let text = text.trim();
                if !text.is_empty() {
                    info!("✅ [SCRAPER] Extracted {}: {}", field.label(), text);
                    return Some(text.to_string());
                }
            }
            Ok(None) => {}
            Err(e) => debug!("[SCRAPER] {} selector {} failed: {}", field.label(), strategy.query, e),
        }
    }
    warn!("⚠️ [SCRAPER] Failed to extract {} with any selector", field.label());
    None
}

/// Parse currency or percentage text: `$`, `%`, `,` and whitespace are
/// dropped and accounting notation `(X)` becomes `-X`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',') && !c.is_whitespace())
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();

    let normalized = if cleaned.len() >= 2 && cleaned.starts_with('(') && cleaned.ends_with(')') {
        format!("-{}", &cleaned[1..cleaned.len() - 1])
    } else {
        cleaned
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}
