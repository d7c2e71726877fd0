use std::sync::Arc;

use crypto_portfolio_monitor::bot::{self, editor::Editor, telegram::TelegramApi};
use crypto_portfolio_monitor::config::AppConfig;
use crypto_portfolio_monitor::data::store::ListStore;
use crypto_portfolio_monitor::services::market_monitor::MarketMonitor;
use crypto_portfolio_monitor::services::notifier::TelegramNotifier;
use crypto_portfolio_monitor::services::portfolio_monitor::{AlertPolicy, PortfolioMonitor};
use crypto_portfolio_monitor::services::scheduler::{run_forever, supervise, Schedule};
use crypto_portfolio_monitor::sources::browser::WebDriverReader;
use crypto_portfolio_monitor::sources::coinmarketcap::CoinMarketCapClient;
use crypto_portfolio_monitor::sources::fear_greed::FearGreedClient;
use crypto_portfolio_monitor::sources::portfolio::PortfolioFetcher;
use crypto_portfolio_monitor::sources::selectors::SelectorSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Setup Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Crypto Portfolio Monitor...");

    // Load Configuration
    let config = AppConfig::from_env()?;
    info!(
        "Loaded Configuration: market every {}s, portfolios every {}s, data in {}",
        config.crypto_update_interval.as_secs(),
        config.portfolio_update_interval.as_secs(),
        config.data_dir.display()
    );

    let store = ListStore::new(&config.data_dir);
    let telegram = TelegramApi::new(&config.telegram.bot_token)?;
    let notifier = Arc::new(TelegramNotifier::new(
        telegram.clone(),
        config.telegram.chat_id.clone(),
    ));

    // Market loop
    let market = MarketMonitor::new(
        store.clone(),
        Arc::new(CoinMarketCapClient::new(config.coinmarketcap_api_key.clone())?),
        Arc::new(FearGreedClient::new()?),
        notifier.clone(),
    );
    let market_task = tokio::spawn(run_forever(
        market,
        Schedule::market(config.crypto_update_interval),
    ));

    // Portfolio loop
    let selectors = SelectorSet::load(config.browser.selectors_file.as_deref())?;
    let reader = WebDriverReader::start(&config.browser, selectors).await?;
    let portfolio = PortfolioMonitor::new(
        store.clone(),
        Arc::new(PortfolioFetcher::new(reader)),
        notifier,
        AlertPolicy::new(config.alert_repeat_count),
    );
    let portfolio_task = tokio::spawn(run_forever(
        portfolio,
        Schedule::portfolio(config.portfolio_update_interval),
    ));

    // List editor
    let bot_task = tokio::spawn(bot::run_bot(telegram, Editor::new(store)));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("❌ [MAIN] Cannot listen for Ctrl-C: {}", e);
        }
    };
    let tasks = vec![
        ("MARKET", market_task),
        ("PORTFOLIO", portfolio_task),
        ("BOT", bot_task),
    ];
    if let Some(name) = supervise(tasks, shutdown).await {
        return Err(format!("{} task stopped unexpectedly", name).into());
    }

    Ok(())
}
