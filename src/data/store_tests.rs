//! Unit tests for ListStore - the flat-file ticker and portfolio lists.

#[cfg(test)]
mod store_tests {
    use crate::data::store::{normalize_ticker, ListStore, Portfolio};
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("portfolio-monitor-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_files_load_empty() {
        let store = ListStore::new(temp_dir());
        assert!(store.load_tickers().is_empty());
        assert!(store.load_portfolios().is_empty());
    }

    #[test]
    fn test_corrupt_files_load_empty() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let store = ListStore::new(&dir);
        fs::write(store.tickers_path(), "[\"BTC\", ").unwrap();
        fs::write(store.portfolios_path(), "{not json").unwrap();

        assert!(store.load_tickers().is_empty());
        assert!(store.load_portfolios().is_empty());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_save_writes_both_documents() {
        let dir = temp_dir();
        let store = ListStore::new(&dir);
        let portfolios = vec![Portfolio::new(
            "main".to_string(),
            "https://example.com/p/1".to_string(),
            5000.0,
        )];
        let tickers = vec!["BTC".to_string(), "ETH".to_string()];

        store.save(&portfolios, &tickers).unwrap();

        assert_eq!(store.load_tickers(), tickers);
        assert_eq!(store.load_portfolios(), portfolios);

        let raw = fs::read_to_string(store.tickers_path()).unwrap();
        assert!(raw.contains("\n    \"BTC\""), "expected 4-space indent: {}", raw);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_add_ticker_normalizes_and_dedupes() {
        let dir = temp_dir();
        let store = ListStore::new(&dir);

        assert!(store.add_ticker(" btc ").unwrap());
        assert!(!store.add_ticker("BTC").unwrap());
        assert!(!store.add_ticker("   ").unwrap());
        assert!(store.add_ticker("sol").unwrap());

        assert_eq!(store.load_tickers(), vec!["BTC".to_string(), "SOL".to_string()]);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_remove_ticker() {
        let dir = temp_dir();
        let store = ListStore::new(&dir);
        store.add_ticker("BTC").unwrap();
        store.add_ticker("ETH").unwrap();

        assert!(store.remove_ticker("BTC").unwrap());
        assert!(!store.remove_ticker("DOGE").unwrap());
        assert_eq!(store.load_tickers(), vec!["ETH".to_string()]);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_ticker_edits_preserve_portfolios() {
        let dir = temp_dir();
        let store = ListStore::new(&dir);
        store
            .add_portfolio(Portfolio::new("p".into(), "https://example.com".into(), 0.0))
            .unwrap();

        store.add_ticker("ADA").unwrap();

        assert_eq!(store.load_portfolios().len(), 1);
        assert!(store.has_portfolio("p"));
        assert!(!store.has_portfolio("q"));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_record_cumulative_updates_matching_record() {
        let dir = temp_dir();
        let store = ListStore::new(&dir);
        store
            .add_portfolio(Portfolio::new("a".into(), "https://example.com/a".into(), 0.0))
            .unwrap();
        store
            .add_portfolio(Portfolio::new("b".into(), "https://example.com/b".into(), 0.0))
            .unwrap();

        store.record_cumulative("b", 20.0).unwrap();
        store.record_cumulative("missing", 99.0).unwrap();

        let portfolios = store.load_portfolios();
        assert_eq!(portfolios[0].cumulative_gain_loss, 0.0);
        assert_eq!(portfolios[1].cumulative_gain_loss, 20.0);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_legacy_record_shape_loads() {
        let json = r#"[{
            "name": "old",
            "url": "https://example.com/old",
            "threshold": 1500,
            "totalLostOrGainedSinceTheStartOfTheScript": 12.5
        }, {
            "name": "bare",
            "url": "https://example.com/bare"
        }]"#;
        let portfolios: Vec<Portfolio> = serde_json::from_str(json).unwrap();

        assert_eq!(portfolios[0].threshold, 1500.0);
        assert_eq!(portfolios[0].cumulative_gain_loss, 12.5);
        assert_eq!(portfolios[1].threshold, 0.0);
        assert_eq!(portfolios[1].cumulative_gain_loss, 0.0);
    }

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker("  eth\n"), "ETH");
        assert_eq!(normalize_ticker("Pepe"), "PEPE");
    }

    // ---- concurrent writers ----

    #[test]
    fn test_concurrent_writers_lose_no_updates() {
        let dir = temp_dir();
        let store = ListStore::new(&dir);
        store
            .add_portfolio(Portfolio::new("p".to_string(), "https://example.com/p".to_string(), 0.0))
            .unwrap();

        // Portfolio loop persisting cumulative values while the editor adds tickers
        let writer = store.clone();
        let cumulative = std::thread::spawn(move || {
            for i in 0..2000 {
                writer.record_cumulative("p", i as f64).unwrap();
            }
        });
        for i in 0..300 {
            assert!(store.add_ticker(&format!("T{}", i)).unwrap());
        }
        cumulative.join().unwrap();

        let portfolios = store.load_portfolios();
        assert_eq!(portfolios.len(), 1);
        assert_eq!(portfolios[0].cumulative_gain_loss, 1999.0);
        assert_eq!(store.load_tickers().len(), 300);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = temp_dir();
        let store = ListStore::new(&dir);
        store.add_ticker("btc").unwrap();
        store.record_cumulative("missing", 1.0).unwrap();

        let mut names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        let mut expected = vec![
            store.portfolios_path().file_name().unwrap().to_string_lossy().into_owned(),
            store.tickers_path().file_name().unwrap().to_string_lossy().into_owned(),
        ];
        expected.sort();
        assert_eq!(names, expected);
        fs::remove_dir_all(dir).ok();
    }
}
