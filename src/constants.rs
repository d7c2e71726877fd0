//! Application-wide constants and magic numbers
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make the codebase easier to tune.

use std::time::Duration;

/// Market data endpoints
pub mod market {
    pub const COINMARKETCAP_BASE_URL: &str = "https://pro-api.coinmarketcap.com";
    pub const GLOBAL_METRICS_PATH: &str = "/v1/global-metrics/quotes/latest";
    pub const LISTINGS_PATH: &str = "/v1/cryptocurrency/listings/latest";

    /// Listing page: first entry, page size, quote currency
    pub const LISTINGS_START: u32 = 1;
    pub const LISTINGS_LIMIT: u32 = 3500;
    pub const QUOTE_CURRENCY: &str = "USD";

    pub const FEAR_GREED_URL: &str = "https://api.alternative.me/fng/";

    pub const COIN_PAGE_BASE: &str = "https://www.coinmarketcap.com/currencies/";

    /// Prices below this are shown with 4 decimals instead of 2
    pub const SMALL_PRICE_CUTOFF: f64 = 1.0;
}

/// HTTP client constants
pub mod http {
    use super::*;

    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

    /// Long-poll timeout handed to getUpdates (seconds)
    pub const LONG_POLL_TIMEOUT_SECS: u64 = 30;

    /// Pause before re-polling after a transport error
    pub const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);
}

/// Browser scraping constants
pub mod scraper {
    use super::*;

    /// Attempts per portfolio fetch, each with a fresh browser session
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Fixed wait between attempts
    pub const RETRY_DELAY: Duration = Duration::from_secs(5);

    /// Bounded wait for <body> after navigation
    pub const BODY_WAIT: Duration = Duration::from_secs(10);

    pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

    /// Port used when the driver binary is spawned locally
    pub const SPAWNED_DRIVER_PORT: u16 = 9516;

    /// Grace period for a spawned driver to start listening
    pub const DRIVER_STARTUP_DELAY: Duration = Duration::from_secs(1);

    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
}

/// Scheduler loop constants
pub mod schedule {
    use super::*;

    /// Granularity of the countdown log between cycles
    pub const COUNTDOWN_STEP: Duration = Duration::from_secs(10);

    /// Cooldown after a cycle fails as a whole
    pub const ERROR_COOLDOWN: Duration = Duration::from_secs(60);

    /// Wait when there is nothing to monitor
    pub const IDLE_DELAY: Duration = Duration::from_secs(60);

    /// Pause after each portfolio inside one cycle
    pub const PORTFOLIO_PACING: Duration = Duration::from_secs(2);

    /// Zero-success cycles tolerated before the extended cooldown
    pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

    pub const EXTENDED_COOLDOWN: Duration = Duration::from_secs(300);
}

/// Alert delivery constants
pub mod alerts {
    use super::*;

    pub const DEFAULT_REPEAT_COUNT: u32 = 3;

    /// Pause between repeated alert messages
    pub const REPEAT_PAUSE: Duration = Duration::from_secs(1);
}

/// Persistent list store constants
pub mod store {
    pub const DEFAULT_DATA_DIR: &str = "data";
    pub const TICKERS_FILE: &str = "tickers.json";
    pub const PORTFOLIOS_FILE: &str = "portfolios.json";
}
