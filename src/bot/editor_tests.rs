//! Unit tests for the conversational list editor.

#[cfg(test)]
mod editor_tests {
    use crate::bot::editor::*;
    use crate::bot::keyboards::{self, callback};
    use crate::data::store::ListStore;
    use std::fs;
    use std::path::PathBuf;

    const CHAT: i64 = 42;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("portfolio-editor-{}", uuid::Uuid::new_v4()))
    }

    fn editor() -> (Editor, ListStore, PathBuf) {
        let dir = temp_dir();
        let store = ListStore::new(&dir);
        (Editor::new(store.clone()), store, dir)
    }

    #[test]
    fn test_start_and_menu() {
        let (mut ed, _, _) = editor();

        let reply = ed.handle(CHAT, Incoming::Command("/start")).unwrap();
        assert_eq!(reply.text, "Welcome! Use /commands to access the menu.");

        let reply = ed.handle(CHAT, Incoming::Command("/commands@monitor_bot")).unwrap();
        assert_eq!(reply.text, "Choose an option:");
        assert_eq!(reply.keyboard, Some(keyboards::main_menu()));
    }

    #[test]
    fn test_add_ticker_flow() {
        let (mut ed, store, dir) = editor();

        let reply = ed.handle(CHAT, Incoming::Callback(callback::ADD_TICKER)).unwrap();
        assert_eq!(reply.text, "Please enter the name of the ticker to add:");
        assert_eq!(ed.pending(CHAT), Some(&Step::TickerName));

        let reply = ed.handle(CHAT, Incoming::Text("  sol ")).unwrap();
        assert_eq!(reply.text, "Ticker 'SOL' added successfully!");
        assert_eq!(ed.pending(CHAT), None);
        assert_eq!(store.load_tickers(), vec!["SOL".to_string()]);

        ed.handle(CHAT, Incoming::Callback(callback::ADD_TICKER)).unwrap();
        let reply = ed.handle(CHAT, Incoming::Text("SOL")).unwrap();
        assert_eq!(reply.text, "Ticker 'SOL' already exists.");
        assert_eq!(store.load_tickers().len(), 1);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_remove_ticker_flow() {
        let (mut ed, store, dir) = editor();
        store.add_ticker("BTC").unwrap();
        store.add_ticker("ETH").unwrap();

        let reply = ed.handle(CHAT, Incoming::Callback(callback::REMOVE_TICKER)).unwrap();
        let kb = reply.keyboard.unwrap();
        // one row per ticker plus Back
        assert_eq!(kb.inline_keyboard.len(), 3);
        assert_eq!(kb.inline_keyboard[0][0].callback_data, "remove:BTC");

        let reply = ed.handle(CHAT, Incoming::Callback("remove:BTC")).unwrap();
        assert_eq!(reply.text, "Ticker 'BTC' removed successfully!");

        let reply = ed.handle(CHAT, Incoming::Callback("remove:BTC")).unwrap();
        assert_eq!(reply.text, "Ticker 'BTC' not found.");
        assert_eq!(store.load_tickers(), vec!["ETH".to_string()]);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_remove_ticker_with_empty_list() {
        let (mut ed, _, _) = editor();
        let reply = ed.handle(CHAT, Incoming::Callback(callback::REMOVE_TICKER)).unwrap();
        assert_eq!(reply.text, "No tickers are being tracked.");
    }

    #[test]
    fn test_add_portfolio_flow_with_reprompts() {
        let (mut ed, store, dir) = editor();

        ed.handle(CHAT, Incoming::Callback(callback::ADD_PORTFOLIO)).unwrap();
        assert_eq!(ed.pending(CHAT), Some(&Step::PortfolioName));

        ed.handle(CHAT, Incoming::Text("main")).unwrap();
        assert_eq!(
            ed.pending(CHAT),
            Some(&Step::PortfolioUrl { name: "main".to_string() })
        );

        let reply = ed.handle(CHAT, Incoming::Text("not a url")).unwrap();
        assert!(reply.text.starts_with("Invalid URL"));
        assert!(matches!(ed.pending(CHAT), Some(Step::PortfolioUrl { .. })));

        ed.handle(CHAT, Incoming::Text("https://example.com/p/1")).unwrap();
        assert!(matches!(ed.pending(CHAT), Some(Step::PortfolioThreshold { .. })));

        let reply = ed.handle(CHAT, Incoming::Text("lots")).unwrap();
        assert_eq!(reply.text, "Invalid threshold value. Please enter a number.");
        assert!(matches!(ed.pending(CHAT), Some(Step::PortfolioThreshold { .. })));

        let reply = ed.handle(CHAT, Incoming::Text("5000")).unwrap();
        assert_eq!(reply.text, "Portfolio 'main' added successfully!");
        assert_eq!(ed.pending(CHAT), None);

        let portfolios = store.load_portfolios();
        assert_eq!(portfolios.len(), 1);
        assert_eq!(portfolios[0].url, "https://example.com/p/1");
        assert_eq!(portfolios[0].threshold, 5000.0);
        assert_eq!(portfolios[0].cumulative_gain_loss, 0.0);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_duplicate_portfolio_name_is_rejected() {
        let (mut ed, store, dir) = editor();
        store
            .add_portfolio(crate::data::store::Portfolio::new(
                "main".into(),
                "https://example.com".into(),
                0.0,
            ))
            .unwrap();

        ed.handle(CHAT, Incoming::Callback(callback::ADD_PORTFOLIO)).unwrap();
        let reply = ed.handle(CHAT, Incoming::Text("main")).unwrap();

        assert!(reply.text.contains("already exists"));
        assert_eq!(ed.pending(CHAT), Some(&Step::PortfolioName));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_cancel_clears_pending_step() {
        let (mut ed, _, _) = editor();
        ed.handle(CHAT, Incoming::Callback(callback::ADD_PORTFOLIO)).unwrap();

        let reply = ed.handle(CHAT, Incoming::Callback(callback::CANCEL)).unwrap();
        assert_eq!(reply.keyboard, Some(keyboards::main_menu()));
        assert_eq!(ed.pending(CHAT), None);
    }

    #[test]
    fn test_chats_are_independent() {
        let (mut ed, _, _) = editor();
        ed.handle(1, Incoming::Callback(callback::ADD_TICKER)).unwrap();

        assert_eq!(ed.pending(1), Some(&Step::TickerName));
        assert_eq!(ed.pending(2), None);
        let reply = ed.handle(2, Incoming::Text("BTC")).unwrap();
        assert_eq!(reply.text, "Use /commands to open the menu.");
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(
            parse_portfolio_url(" https://example.com/x "),
            Some("https://example.com/x".to_string())
        );
        assert_eq!(parse_portfolio_url("ftp://example.com"), None);
        assert_eq!(parse_portfolio_url("example.com"), None);

        assert_eq!(parse_threshold("0"), Some(0.0));
        assert_eq!(parse_threshold(" 1250.5 "), Some(1250.5));
        assert_eq!(parse_threshold("-1"), None);
        assert_eq!(parse_threshold("NaN"), None);
        assert_eq!(parse_threshold("inf"), None);
    }
}
