//! Headless Chrome page reader over WebDriver.
//!
//! Every call opens a brand-new browser session and closes it before
//! returning, whatever the outcome. Sessions are never pooled.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::BrowserConfig;
use crate::constants::scraper;
use crate::error::{MonitorError, Result};

use super::selectors::{first_match, PortfolioField, SelectorKind, SelectorSet, SelectorStrategy};
use super::traits::PageReader;
use super::types::RawPortfolioPage;

const HIDE_WEBDRIVER_JS: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

pub struct WebDriverReader {
    webdriver_url: String,
    selectors: SelectorSet,
    page_load_delay: Duration,
    element_timeout: Duration,
    // Held so a locally spawned driver lives as long as the reader
    _driver: Option<Child>,
}

impl WebDriverReader {
    /// Spawns the configured chromedriver binary if one is set and exists,
    /// otherwise talks to the WebDriver server at `webdriver_url`.
    pub async fn start(config: &BrowserConfig, selectors: SelectorSet) -> Result<Self> {
        let mut webdriver_url = config.webdriver_url.clone();
        let mut driver = None;

        match &config.chrome_driver_path {
            Some(path) if path.exists() => {
                info!("🌐 [SCRAPER] Using ChromeDriver from environment path: {}", path.display());
                let child = Command::new(path)
                    .arg(format!("--port={}", scraper::SPAWNED_DRIVER_PORT))
                    .kill_on_drop(true)
                    .spawn()
                    .map_err(|e| MonitorError::Browser(format!("failed to spawn chromedriver: {}", e)))?;
                sleep(scraper::DRIVER_STARTUP_DELAY).await;
                webdriver_url = format!("http://localhost:{}", scraper::SPAWNED_DRIVER_PORT);
                driver = Some(child);
            }
            Some(path) => warn!(
                "⚠️ [SCRAPER] CHROME_DRIVER_PATH {} does not exist, using {}",
                path.display(),
                webdriver_url
            ),
            None => info!("🌐 [SCRAPER] No ChromeDriver path set, using {}", webdriver_url),
        }

        Ok(Self {
            webdriver_url,
            selectors,
            page_load_delay: config.page_load_delay,
            element_timeout: config.element_timeout,
            _driver: driver,
        })
    }

    async fn open_session(&self) -> Result<Client> {
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": [
                    "--headless",
                    "--disable-gpu",
                    "--no-sandbox",
                    "--disable-dev-shm-usage",
                    "--disable-search-engine-choice-screen",
                    "--disable-blink-features=AutomationControlled",
                    "--window-size=1920,1080",
                    format!("--user-agent={}", scraper::USER_AGENT),
                ],
                "excludeSwitches": ["enable-automation"],
                "useAutomationExtension": false,
            }),
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.webdriver_url)
            .await?;

        if let Err(e) = client.execute(HIDE_WEBDRIVER_JS, vec![]).await {
            warn!("⚠️ [SCRAPER] Could not mask webdriver flag: {}", e);
        }
        Ok(client)
    }

    async fn read_fields(&self, client: &Client, url: &str) -> Result<RawPortfolioPage> {
        client.goto(url).await?;
        sleep(self.page_load_delay).await;
        client
            .wait()
            .at_most(scraper::BODY_WAIT)
            .for_element(Locator::Css("body"))
            .await?;

        Ok(RawPortfolioPage {
            username: self.extract(client, PortfolioField::Username).await,
            total_value: self.extract(client, PortfolioField::TotalValue).await,
            pct_change_24h: self.extract(client, PortfolioField::PctChange24h).await,
            money_changed: self.extract(client, PortfolioField::MoneyChanged).await,
        })
    }

    async fn extract(&self, client: &Client, field: PortfolioField) -> Option<String> {
        let timeout = self.element_timeout;
        first_match(field, self.selectors.for_field(field), |strategy| {
            element_text(client, strategy, timeout)
        })
        .await
    }
}

/// `title` attribute if present and non-empty, else the visible text.
async fn element_text(client: &Client, strategy: &SelectorStrategy, timeout: Duration) -> Result<Option<String>> {
    let locator = match strategy.kind {
        SelectorKind::Css => Locator::Css(&strategy.query),
        SelectorKind::Xpath => Locator::XPath(&strategy.query),
    };
    let element = client.wait().at_most(timeout).for_element(locator).await?;

    if let Some(title) = element.attr("title").await? {
        if !title.trim().is_empty() {
            return Ok(Some(title));
        }
    }
    Ok(Some(element.text().await?.trim().to_string()))
}

#[async_trait]
impl PageReader for WebDriverReader {
    async fn read_page(&self, url: &str) -> Result<RawPortfolioPage> {
        let client = self.open_session().await?;
        let result = self.read_fields(&client, url).await;

        // Torn down on every path before the caller retries or returns
        if let Err(e) = client.close().await {
            warn!("⚠️ [SCRAPER] Error closing browser session: {}", e);
        }
        result.map_err(|e| match e {
            MonitorError::Browser(msg) => MonitorError::Browser(format!("{}: {}", url, msg)),
            other => other,
        })
    }
}
