//! Conversational editor for the tracked lists.
//!
//! Pure per-chat state machine: it turns commands, button presses and free
//! text into store mutations plus a reply. It never triggers a fetch; the
//! scheduler loops pick up changes on their next cycle.

use std::collections::HashMap;

use tracing::info;
use url::Url;

use crate::data::store::{normalize_ticker, ListStore, Portfolio};
use crate::error::Result;

use super::keyboards::{self, callback};
use super::telegram::InlineKeyboardMarkup;

pub const APOLOGY: &str = "Sorry, an error occurred. Please try again.";

/// What the chat is waiting for next. Portfolio steps carry the fields
/// collected so far.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    TickerName,
    PortfolioName,
    PortfolioUrl { name: String },
    PortfolioThreshold { name: String, url: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Incoming<'a> {
    Command(&'a str),
    Callback(&'a str),
    Text(&'a str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

pub struct Editor {
    store: ListStore,
    pending: HashMap<i64, Step>,
}

impl Editor {
    pub fn new(store: ListStore) -> Self {
        Self {
            store,
            pending: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn pending(&self, chat_id: i64) -> Option<&Step> {
        self.pending.get(&chat_id)
    }

    pub fn handle(&mut self, chat_id: i64, input: Incoming<'_>) -> Result<Reply> {
        match input {
            Incoming::Command(cmd) => Ok(self.on_command(chat_id, cmd)),
            Incoming::Callback(data) => self.on_callback(chat_id, data),
            Incoming::Text(text) => self.on_text(chat_id, text),
        }
    }

    fn on_command(&mut self, chat_id: i64, command: &str) -> Reply {
        // "/commands@my_bot" -> "/commands"
        let command = command.split('@').next().unwrap_or(command);
        match command {
            "/start" => Reply::text("Welcome! Use /commands to access the menu."),
            "/commands" => {
                self.pending.remove(&chat_id);
                Reply::with_keyboard("Choose an option:", keyboards::main_menu())
            }
            _ => Reply::text("Unknown command. Use /commands to see the menu."),
        }
    }

    fn on_callback(&mut self, chat_id: i64, data: &str) -> Result<Reply> {
        if let Some(ticker) = data.strip_prefix(callback::REMOVE_PREFIX) {
            let reply = if self.store.remove_ticker(ticker)? {
                format!("Ticker '{}' removed successfully!", ticker)
            } else {
                format!("Ticker '{}' not found.", ticker)
            };
            return Ok(Reply::with_keyboard(reply, keyboards::back_only()));
        }

        let reply = match data {
            callback::ADD_TICKER => {
                self.pending.insert(chat_id, Step::TickerName);
                Reply::with_keyboard(
                    "Please enter the name of the ticker to add:",
                    keyboards::cancel_only(),
                )
            }
            callback::ADD_PORTFOLIO => {
                self.pending.insert(chat_id, Step::PortfolioName);
                Reply::with_keyboard(
                    "Add Portfolio - please enter the portfolio name:",
                    keyboards::cancel_only(),
                )
            }
            callback::REMOVE_TICKER => {
                let tickers = self.store.load_tickers();
                if tickers.is_empty() {
                    Reply::with_keyboard("No tickers are being tracked.", keyboards::back_only())
                } else {
                    Reply::with_keyboard("Select a ticker to remove:", keyboards::ticker_removal(&tickers))
                }
            }
            callback::BACK => {
                self.pending.remove(&chat_id);
                Reply::with_keyboard("Choose an option:", keyboards::main_menu())
            }
            callback::CANCEL => {
                self.pending.remove(&chat_id);
                Reply::with_keyboard("Cancelled. Choose an option:", keyboards::main_menu())
            }
            _ => Reply::text("Unknown option. Use /commands to open the menu."),
        };
        Ok(reply)
    }

    fn on_text(&mut self, chat_id: i64, text: &str) -> Result<Reply> {
        let text = text.trim();
        let Some(step) = self.pending.remove(&chat_id) else {
            return Ok(Reply::text("Use /commands to open the menu."));
        };

        let (next, reply) = match step {
            Step::TickerName => {
                let ticker = normalize_ticker(text);
                if ticker.is_empty() {
                    (Some(Step::TickerName), Reply::text("Please enter the name of the ticker to add:"))
                } else {
                    let reply = if self.store.add_ticker(&ticker)? {
                        format!("Ticker '{}' added successfully!", ticker)
                    } else {
                        format!("Ticker '{}' already exists.", ticker)
                    };
                    (None, Reply::text(reply))
                }
            }
            Step::PortfolioName => {
                if text.is_empty() {
                    (Some(Step::PortfolioName), Reply::text("Please enter the portfolio name:"))
                } else if self.store.has_portfolio(text) {
                    (
                        Some(Step::PortfolioName),
                        Reply::text(format!(
                            "A portfolio named '{}' already exists. Please enter a different name:",
                            text
                        )),
                    )
                } else {
                    (
                        Some(Step::PortfolioUrl { name: text.to_string() }),
                        Reply::with_keyboard(
                            format!("Portfolio name set to: {}\nPlease enter the portfolio URL:", text),
                            keyboards::cancel_only(),
                        ),
                    )
                }
            }
            Step::PortfolioUrl { name } => match parse_portfolio_url(text) {
                Some(url) => (
                    Some(Step::PortfolioThreshold { name, url: url.clone() }),
                    Reply::with_keyboard(
                        format!(
                            "Portfolio URL set to: {}\nPlease enter the portfolio threshold (0 disables alerts):",
                            url
                        ),
                        keyboards::cancel_only(),
                    ),
                ),
                None => (
                    Some(Step::PortfolioUrl { name }),
                    Reply::text("Invalid URL. Please enter a full http(s) address:"),
                ),
            },
            Step::PortfolioThreshold { name, url } => match parse_threshold(text) {
                Some(threshold) => {
                    self.store
                        .add_portfolio(Portfolio::new(name.clone(), url, threshold))?;
                    info!("🤖 [BOT] Chat {} added portfolio {}", chat_id, name);
                    (
                        None,
                        Reply::with_keyboard(
                            format!("Portfolio '{}' added successfully!", name),
                            keyboards::main_menu(),
                        ),
                    )
                }
                None => (
                    Some(Step::PortfolioThreshold { name, url }),
                    Reply::text("Invalid threshold value. Please enter a number."),
                ),
            },
        };

        if let Some(next) = next {
            self.pending.insert(chat_id, next);
        }
        Ok(reply)
    }
}

/// Absolute http(s) URL, normalised.
pub fn parse_portfolio_url(text: &str) -> Option<String> {
    let url = Url::parse(text.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Some(url.to_string()),
        _ => None,
    }
}

/// Finite, non-negative number.
pub fn parse_threshold(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
