//! Integration tests for the Redis state store.
//!
//! Requires a reachable Redis; set `MARKET_TEST_REDIS_URL` to run them.

use market_core::ConnectionStatus;
use market_state::{RedisStateStore, StateStore, StatusRecord, WRITE_TIMESTAMP_FIELD};

fn redis_url() -> Option<String> {
    std::env::var("MARKET_TEST_REDIS_URL").ok()
}

#[tokio::test]
async fn test_status_record_round_trip_through_redis() {
    let Some(url) = redis_url() else {
        eprintln!("Skipping test: MARKET_TEST_REDIS_URL not set");
        return;
    };

    let store = RedisStateStore::connect(&url, "market_state_test")
        .await
        .expect("Failed to connect to Redis");
    assert!(store.health_check().await.unwrap());

    let limited = StatusRecord {
        status: ConnectionStatus::RateLimited,
        reconnect_attempts: 2,
        rate_limit_reset_at: Some(1_700_000_010_000),
        sandbox: true,
        has_credentials: false,
    };
    store
        .upsert_merge("binance", limited.to_fields().unwrap())
        .await
        .unwrap();

    let recovered = StatusRecord {
        status: ConnectionStatus::Connected,
        reconnect_attempts: 0,
        rate_limit_reset_at: None,
        ..limited.clone()
    };
    store
        .upsert_merge("binance", recovered.to_fields().unwrap())
        .await
        .unwrap();

    let doc = store.load("binance").await.unwrap().expect("document exists");
    assert!(doc[WRITE_TIMESTAMP_FIELD].as_i64().is_some());
    assert!(!doc.contains_key("rate_limit_reset_at"));
    assert_eq!(StatusRecord::from_fields(&doc).unwrap(), recovered);
}
