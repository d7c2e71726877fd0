//! Unit tests for market payload reduction and sentiment parsing.

#[cfg(test)]
mod coinmarketcap_tests {
    use crate::error::{MonitorError, Result};
    use crate::sources::coinmarketcap::*;
    use crate::sources::fear_greed::first_reading;
    use crate::sources::traits::MarketDataApi;
    use crate::sources::types::*;
    use async_trait::async_trait;

    fn global(btc: f64, eth: f64, cap: f64) -> GlobalMetricsResponse {
        serde_json::from_value(serde_json::json!({
            "data": {
                "btc_dominance": btc,
                "eth_dominance": eth,
                "quote": { "USD": { "total_market_cap": cap } }
            }
        }))
        .unwrap()
    }

    fn listings() -> ListingsResponse {
        serde_json::from_str(
            r#"{"data": [
                {"name": "Bitcoin", "symbol": "BTC", "quote": {"USD": {"price": 65000.5, "percent_change_24h": 1.2}}},
                {"name": "Ethereum", "symbol": "ETH", "quote": {"USD": {"price": 3100.0, "percent_change_24h": -2.5}}},
                {"name": "Pepe", "symbol": "PEPE", "quote": {"USD": {"price": 0.0000081, "percent_change_24h": 18.4}}},
                {"name": "Dead Coin", "symbol": "DEAD", "quote": {"USD": {"price": null, "percent_change_24h": null}}},
                {"name": "Sinking", "symbol": "SNK", "quote": {"USD": {"price": 0.4, "percent_change_24h": -30.1}}},
                {"name": "Bitcoin Clone", "symbol": "BTC", "quote": {"USD": {"price": 1.0, "percent_change_24h": 0.0}}}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_alt_dominance() {
        assert!((alt_dominance(52.0, 17.5) - 30.5).abs() < 1e-9);
        assert_eq!(alt_dominance(0.0, 0.0), 100.0);
    }

    #[test]
    fn test_alt_dominance_clamped_when_inputs_exceed_100() {
        assert_eq!(alt_dominance(83.0, 17.2), 0.0);
    }

    #[test]
    fn test_top_movers_skip_absent_change() {
        let (gainer, loser) = top_movers(&listings().data);
        let gainer = gainer.unwrap();
        let loser = loser.unwrap();
        assert_eq!(gainer.symbol, "PEPE");
        assert_eq!(gainer.change_24h, 18.4);
        assert_eq!(loser.symbol, "SNK");
        assert_eq!(loser.change_24h, -30.1);
    }

    #[test]
    fn test_top_movers_all_absent() {
        let data: ListingsResponse = serde_json::from_str(
            r#"{"data": [
                {"name": "A", "symbol": "A", "quote": {"USD": {"price": 1.0}}},
                {"name": "B", "symbol": "B", "quote": {"USD": {}}}
            ]}"#,
        )
        .unwrap();
        let (gainer, loser) = top_movers(&data.data);
        assert!(gainer.is_none());
        assert!(loser.is_none());
        assert_eq!(top_movers(&[]), (None, None));
    }

    #[test]
    fn test_build_reading_filters_and_orders_symbols() {
        let symbols = vec![
            "ETH".to_string(),
            "NOPE".to_string(),
            "BTC".to_string(),
            "ETH".to_string(),
        ];
        let reading = build_reading(&global(54.0, 16.0, 2.4e12), &listings().data, &symbols);

        let found: Vec<&str> = reading.per_symbol.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(found, vec!["ETH", "BTC"]);
        // First exact match, not the clone further down
        assert_eq!(reading.per_symbol[1].name, "Bitcoin");
        assert_eq!(reading.per_symbol[1].price, Some(65000.5));
        assert_eq!(reading.total_market_cap, 2.4e12);
        assert!((reading.alt_dominance - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_symbol_with_null_price_is_kept() {
        let reading = build_reading(&global(50.0, 15.0, 1e12), &listings().data, &["DEAD".to_string()]);
        assert_eq!(reading.per_symbol.len(), 1);
        assert_eq!(reading.per_symbol[0].price, None);
    }

    struct FakeApi {
        global_ok: bool,
        listings_ok: bool,
    }

    #[async_trait]
    impl MarketDataApi for FakeApi {
        async fn global_metrics(&self) -> Result<GlobalMetricsResponse> {
            if self.global_ok {
                Ok(global(50.0, 15.0, 1e12))
            } else {
                Err(MonitorError::Http { status: 500, body: "down".into() })
            }
        }

        async fn listings(&self) -> Result<ListingsResponse> {
            if self.listings_ok {
                Ok(listings())
            } else {
                Err(MonitorError::Http { status: 429, body: "slow down".into() })
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_fails_when_either_read_fails() {
        let symbols = vec!["BTC".to_string()];

        let ok = FakeApi { global_ok: true, listings_ok: true };
        assert!(fetch_market_reading(&ok, &symbols).await.is_ok());

        let no_global = FakeApi { global_ok: false, listings_ok: true };
        assert!(fetch_market_reading(&no_global, &symbols).await.is_err());

        let no_listings = FakeApi { global_ok: true, listings_ok: false };
        assert!(matches!(
            fetch_market_reading(&no_listings, &symbols).await,
            Err(MonitorError::Http { status: 429, .. })
        ));
    }

    #[test]
    fn test_fear_greed_first_entry() {
        let resp: FearGreedResponse = serde_json::from_str(
            r#"{"name": "Fear and Greed Index", "data": [
                {"value": "72", "value_classification": "Greed", "timestamp": "1700000000"}
            ]}"#,
        )
        .unwrap();
        let reading = first_reading(resp).unwrap();
        assert_eq!(reading.index_value, "72");
        assert_eq!(reading.classification, "Greed");
    }

    #[test]
    fn test_fear_greed_empty_data() {
        let resp = FearGreedResponse { data: vec![] };
        assert!(matches!(first_reading(resp), Err(MonitorError::MissingField { .. })));
    }
}
