pub mod market_monitor;
pub mod notifier;
pub mod portfolio_monitor;
pub mod scheduler;
