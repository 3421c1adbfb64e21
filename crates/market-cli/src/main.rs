//! 호가창 수집 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # BTC/USDT 호가창 10단계 조회
//! market orderbook -s BTC/USDT -d 10
//!
//! # 테스트넷에서 최대 3회 시도
//! market orderbook -s ETH/USDT -a 3 --sandbox
//!
//! # 여러 심볼을 500ms마다 감시 (Ctrl-C로 종료)
//! market watch -s BTC/USDT -s ETH/USDT --interval-ms 500
//!
//! # Redis에 기록된 상태 확인
//! MARKET__STORE__BACKEND=redis market status
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use market_cli::commands::{orderbook, status, watch};
use market_cli::{Cli, Commands};
use market_core::{init_logging, FeedConfig, LogConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = FeedConfig::load(&cli.feed.config)
        .with_context(|| format!("failed to load config from {}", cli.feed.config))?;
    cli.feed.apply(&mut config);
    config.validate()?;

    init_logging(LogConfig::from_settings(&config.logging))?;

    match cli.command {
        Commands::Orderbook {
            symbol,
            depth,
            attempts,
        } => orderbook::run(&config, &symbol, depth, attempts).await,
        Commands::Watch {
            symbols,
            depth,
            interval_ms,
        } => watch::run(&config, &symbols, depth, Duration::from_millis(interval_ms)).await,
        Commands::Status => status::run(&config).await,
    }
}
