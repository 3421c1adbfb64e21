//! 여러 심볼의 호가창을 주기적으로 조회.

use anyhow::{ensure, Context, Result};
use futures::future::join_all;
use market_core::FeedConfig;
use market_exchange::{build_fetcher, ResilientFetcher};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::open_store;

/// 한 번의 폴링 결과 요약.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// 모든 심볼을 동시에 한 번씩 조회합니다.
pub async fn poll_once(fetcher: &ResilientFetcher, symbols: &[String], depth: u32) -> PollSummary {
    let results = join_all(
        symbols
            .iter()
            .map(|symbol| async move { (symbol, fetcher.fetch_order_book(symbol, depth).await) }),
    )
    .await;

    let mut summary = PollSummary::default();
    for (symbol, result) in results {
        match result {
            Ok(snapshot) => {
                summary.succeeded += 1;
                info!(
                    %symbol,
                    best_bid = ?snapshot.best_bid(),
                    best_ask = ?snapshot.best_ask(),
                    mid = ?snapshot.mid_price(),
                    levels = snapshot.bids.len() + snapshot.asks.len(),
                    "호가창"
                );
            }
            Err(e) => {
                summary.failed += 1;
                warn!(%symbol, error = %e, "호가창 조회 실패");
            }
        }
    }
    summary
}

/// Ctrl-C를 받을 때까지 `interval`마다 모든 심볼을 조회합니다.
pub async fn run(config: &FeedConfig, symbols: &[String], depth: u32, interval: Duration) -> Result<()> {
    ensure!(!interval.is_zero(), "interval must be positive");

    let store = open_store(&config.store).await;
    let fetcher = build_fetcher(config, store)
        .await
        .context("failed to build fetcher")?;

    info!(
        venue = fetcher.venue_id(),
        symbols = ?symbols,
        interval_ms = interval.as_millis() as u64,
        "호가창 감시 시작"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
            summary = poll_once(&fetcher, symbols, depth) => {
                let state = fetcher.state();
                info!(
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    status = %state.status(),
                    consecutive_failures = state.consecutive_failures(),
                    "폴링 완료"
                );
            }
        }
    }

    info!(status = %fetcher.state().status(), "종료 신호 수신, 감시 중지");
    Ok(())
}
