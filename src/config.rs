use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{alerts, scraper, store};
use crate::error::{MonitorError, Result};

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Clone, Debug)]
pub struct BrowserConfig {
    /// Local chromedriver binary; spawned once at start-up when present
    pub chrome_driver_path: Option<PathBuf>,
    pub webdriver_url: String,
    pub page_load_delay: Duration,
    pub element_timeout: Duration,
    /// Optional YAML override of the selector fallback lists
    pub selectors_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub coinmarketcap_api_key: String,
    pub browser: BrowserConfig,

    pub crypto_update_interval: Duration,
    pub portfolio_update_interval: Duration,

    pub data_dir: PathBuf,
    pub alert_repeat_count: u32,
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| MonitorError::Config(format!("{} is not set", key)))
        };
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match get(key) {
                Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                    MonitorError::Config(format!("{} must be a whole number of seconds, got '{}'", key, raw))
                }),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let telegram = TelegramConfig {
            bot_token: required("TELEGRAM_BOT_TOKEN")?,
            chat_id: required("CHAT_ID")?,
        };
        let coinmarketcap_api_key = required("COINMARKETCAP_API_KEY")?;

        let element_timeout = match get("ELEMENT_WAIT_TIMEOUT") {
            Some(_) => seconds("ELEMENT_WAIT_TIMEOUT", 15)?,
            None => seconds("SELENIUM_TIMEOUT", 15)?,
        };

        let browser = BrowserConfig {
            chrome_driver_path: get("CHROME_DRIVER_PATH").map(PathBuf::from),
            webdriver_url: get("WEBDRIVER_URL")
                .unwrap_or_else(|| scraper::DEFAULT_WEBDRIVER_URL.to_string()),
            page_load_delay: seconds("PAGE_LOAD_DELAY", 5)?,
            element_timeout,
            selectors_file: get("SELECTORS_FILE").map(PathBuf::from),
        };

        let alert_repeat_count = match get("ALERT_REPEAT_COUNT") {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                MonitorError::Config(format!("ALERT_REPEAT_COUNT must be a whole number, got '{}'", raw))
            })?,
            None => alerts::DEFAULT_REPEAT_COUNT,
        };

        Ok(Self {
            telegram,
            coinmarketcap_api_key,
            browser,
            crypto_update_interval: seconds("CRYPTO_UPDATE_INTERVAL", 1800)?,
            portfolio_update_interval: seconds("PORTFOLIO_UPDATE_INTERVAL", 600)?,
            data_dir: get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(store::DEFAULT_DATA_DIR)),
            alert_repeat_count,
        })
    }
}
