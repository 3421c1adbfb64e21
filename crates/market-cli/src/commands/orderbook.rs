//! 호가창 단건 조회.

use anyhow::{Context, Result};
use market_core::FeedConfig;
use market_exchange::build_fetcher;
use tracing::info;

use super::open_store;

/// 호가창을 조회하여 stdout에 JSON으로 출력합니다.
pub async fn run(config: &FeedConfig, symbol: &str, depth: u32, attempts: Option<u32>) -> Result<()> {
    let store = open_store(&config.store).await;
    let fetcher = build_fetcher(config, store)
        .await
        .context("failed to build fetcher")?;

    let attempts = attempts.unwrap_or(fetcher.policy().max_attempts);
    let snapshot = fetcher
        .fetch_order_book_with_attempts(symbol, depth, attempts)
        .await
        .with_context(|| format!("failed to fetch order book for {}", symbol))?;

    info!(
        symbol = %snapshot.symbol,
        best_bid = ?snapshot.best_bid(),
        best_ask = ?snapshot.best_ask(),
        spread = ?snapshot.spread(),
        "호가창 조회 완료"
    );

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
