//! Crypto Portfolio Monitor - market and portfolio updates relayed to Telegram
//!
//! This library provides market polling, headless-browser portfolio
//! scraping with bounded retries, delta tracking and threshold alerts, and
//! a Telegram bot for editing the tracked lists.

pub mod bot;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod retry;
pub mod services;
pub mod sources;

// Re-export commonly used types
pub use config::AppConfig;
pub use data::store::{ListStore, Portfolio};
pub use error::{MonitorError, Result};
