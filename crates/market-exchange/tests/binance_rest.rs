//! Binance REST 어댑터 테스트 (mockito 서버 사용).

use chrono::Utc;
use market_core::ConnectionStatus;
use market_exchange::{
    BinanceConfig, BinanceVenue, FailureKind, ResilientFetcher, RetryPolicy, VenueAdapter,
    VenueError,
};
use mockito::{Matcher, Server};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

const DEPTH_BODY: &str = r#"{
    "lastUpdateId": 1027024,
    "bids": [["4.00000000", "431.00000000"], ["3.99000000", "9.00000000"]],
    "asks": [["4.00000200", "12.00000000"]]
}"#;

fn venue(server: &Server) -> BinanceVenue {
    BinanceVenue::new(BinanceConfig::new().with_base_url(server.url())).unwrap()
}

fn depth_query(symbol: &str, limit: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("symbol".into(), symbol.into()),
        Matcher::UrlEncoded("limit".into(), limit.into()),
    ])
}

#[tokio::test]
async fn fetches_and_parses_depth() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/depth")
        .match_query(depth_query("BTCUSDT", "5"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DEPTH_BODY)
        .create_async()
        .await;

    let book = venue(&server).fetch_order_book("BTC/USDT", 5).await.unwrap();

    mock.assert_async().await;
    let bids = book.bids.unwrap();
    let asks = book.asks.unwrap();
    assert_eq!(bids.len(), 2);
    assert_eq!(bids[0].price, dec!(4.00000000));
    assert_eq!(bids[0].quantity, dec!(431));
    assert_eq!(asks[0].price, dec!(4.000002));
    assert_eq!(book.timestamp, None);
}

#[tokio::test]
async fn sends_api_key_header_when_configured() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/depth")
        .match_query(Matcher::Any)
        .match_header("x-mbx-apikey", "public-key")
        .with_status(200)
        .with_body(DEPTH_BODY)
        .create_async()
        .await;

    let venue = BinanceVenue::new(
        BinanceConfig::new()
            .with_base_url(server.url())
            .with_api_key("public-key"),
    )
    .unwrap();

    assert!(venue.has_credentials());
    venue.fetch_order_book("ETH/USDT", 10).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_asks_key_is_reported_as_none() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v3/depth")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"lastUpdateId": 1, "bids": []}"#)
        .create_async()
        .await;

    let book = venue(&server).fetch_order_book("BTC/USDT", 5).await.unwrap();
    assert_eq!(book.bids, Some(vec![]));
    assert_eq!(book.asks, None);
}

#[tokio::test]
async fn maps_http_status_to_venue_errors() {
    let cases = [
        (503, VenueError::Unavailable(String::new())),
        (504, VenueError::RequestTimeout(String::new())),
        (500, VenueError::Unavailable(String::new())),
        (502, VenueError::Unavailable(String::new())),
        (404, VenueError::Other(String::new())),
    ];

    for (status, expected) in cases {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v3/depth")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body("upstream error")
            .create_async()
            .await;

        let err = venue(&server)
            .fetch_order_book("BTC/USDT", 5)
            .await
            .unwrap_err();
        assert_eq!(
            std::mem::discriminant(&err),
            std::mem::discriminant(&expected),
            "status {} mapped to {:?}",
            status,
            err
        );
    }
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    // 1번 포트에는 리스너가 없어 연결이 즉시 거부됨
    let venue = BinanceVenue::new(
        BinanceConfig::new()
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(5)),
    )
    .unwrap();

    let err = venue.fetch_order_book("BTC/USDT", 5).await.unwrap_err();
    assert!(matches!(err, VenueError::Unavailable(_)), "got {:?}", err);
}

#[tokio::test]
async fn fetcher_over_http_marks_server_error_as_maintenance() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/depth")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create_async()
        .await;

    let fetcher = ResilientFetcher::new(
        "binance",
        Arc::new(venue(&server)),
        None,
        RetryPolicy::scaled(Duration::from_millis(1)),
    );

    let err = fetcher
        .fetch_order_book_with_attempts("BTC/USDT", 5, 1)
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.reason(), Some(FailureKind::Unavailable));
    assert_eq!(fetcher.state().status(), ConnectionStatus::Maintenance);
}

#[tokio::test]
async fn rate_limit_reads_reset_headers() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v3/depth")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("x-ratelimit-reset", "1700000042")
        .with_body(r#"{"code":-1003,"msg":"Too many requests."}"#)
        .create_async()
        .await;

    let err = venue(&server)
        .fetch_order_book("BTC/USDT", 5)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        VenueError::RateLimitExceeded {
            reset_hint: Some(1_700_000_042)
        }
    );
}

#[tokio::test]
async fn ip_ban_with_retry_after_is_rate_limit() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v3/depth")
        .match_query(Matcher::Any)
        .with_status(418)
        .with_header("retry-after", "120")
        .create_async()
        .await;

    let before = Utc::now().timestamp();
    let err = venue(&server)
        .fetch_order_book("BTC/USDT", 5)
        .await
        .unwrap_err();

    match err {
        VenueError::RateLimitExceeded {
            reset_hint: Some(hint),
        } => assert!(hint >= before + 120 && hint <= before + 122),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn fetcher_over_http_records_rate_limit() {
    let mut server = Server::new_async().await;
    let hint = Utc::now().timestamp() + 30;
    let mock = server
        .mock("GET", "/api/v3/depth")
        .match_query(depth_query("BTCUSDT", "5"))
        .with_status(429)
        .with_header("x-ratelimit-reset", &hint.to_string())
        .expect(2)
        .create_async()
        .await;

    let fetcher = ResilientFetcher::new(
        "binance",
        Arc::new(venue(&server)),
        None,
        RetryPolicy::scaled(Duration::from_millis(1)),
    );

    let err = fetcher
        .fetch_order_book_with_attempts("BTC/USDT", 5, 2)
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.reason(), Some(FailureKind::RateLimited));
    let state = fetcher.state();
    assert_eq!(state.status(), ConnectionStatus::RateLimited);
    assert_eq!(state.rate_limit_reset_at().map(|t| t.timestamp()), Some(hint));
}
