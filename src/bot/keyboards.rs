use super::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Callback payloads carried by inline buttons
pub mod callback {
    pub const ADD_PORTFOLIO: &str = "add_portfolio";
    pub const ADD_TICKER: &str = "add_ticker";
    pub const REMOVE_TICKER: &str = "remove_ticker";
    pub const BACK: &str = "back";
    pub const CANCEL: &str = "cancel";

    /// Prefix for "remove this ticker" buttons, followed by the symbol
    pub const REMOVE_PREFIX: &str = "remove:";
}

pub fn button(text: &str, callback_data: &str) -> InlineKeyboardButton {
    InlineKeyboardButton {
        text: text.to_string(),
        callback_data: callback_data.to_string(),
    }
}

/// One button per row.
pub fn column(buttons: Vec<InlineKeyboardButton>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
    }
}

pub fn main_menu() -> InlineKeyboardMarkup {
    column(vec![
        button("Add Portfolio", callback::ADD_PORTFOLIO),
        button("Add Ticker", callback::ADD_TICKER),
        button("Remove Ticker", callback::REMOVE_TICKER),
    ])
}

pub fn cancel_only() -> InlineKeyboardMarkup {
    column(vec![button("Cancel", callback::CANCEL)])
}

pub fn back_only() -> InlineKeyboardMarkup {
    column(vec![button("Back", callback::BACK)])
}

pub fn ticker_removal(tickers: &[String]) -> InlineKeyboardMarkup {
    let mut buttons: Vec<_> = tickers
        .iter()
        .map(|t| button(t, &format!("{}{}", callback::REMOVE_PREFIX, t)))
        .collect();
    buttons.push(button("Back", callback::BACK));
    column(buttons)
}
