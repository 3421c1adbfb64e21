//! 명령줄 인자 정의.

use clap::{Args, Parser, Subcommand};
use market_core::FeedConfig;

#[derive(Debug, Parser)]
#[command(name = "market")]
#[command(about = "Order book fetcher - 원인별 백오프를 적용한 거래소 호가창 조회", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub feed: FeedOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// 모든 명령에 공통인 설정 옵션.
#[derive(Debug, Clone, Args)]
pub struct FeedOptions {
    /// 설정 파일
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    pub config: String,

    /// 거래소 식별자 (binance, simulated). 설정 파일 값보다 우선
    #[arg(long, global = true)]
    pub venue: Option<String>,

    /// 테스트넷 사용
    #[arg(long, global = true, default_value = "false")]
    pub sandbox: bool,
}

impl FeedOptions {
    /// 명령줄 값을 로드된 설정에 덮어씁니다.
    pub fn apply(&self, config: &mut FeedConfig) {
        if let Some(venue) = &self.venue {
            config.venue.id = venue.clone();
        }
        if self.sandbox {
            config.venue.sandbox = true;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 호가창을 한 번 조회하여 JSON으로 출력
    Orderbook {
        /// 심볼 (예: BTC/USDT)
        #[arg(short, long)]
        symbol: String,

        /// 호가 단계 수
        #[arg(short, long, default_value = "10")]
        depth: u32,

        /// 최대 시도 횟수 (기본: retry.max_attempts)
        #[arg(short, long)]
        attempts: Option<u32>,
    },

    /// 여러 심볼을 주기적으로 동시 조회 (Ctrl-C로 종료)
    Watch {
        /// 심볼 (여러 번 지정 가능)
        #[arg(short, long = "symbol", required = true)]
        symbols: Vec<String>,

        /// 호가 단계 수
        #[arg(short, long, default_value = "5")]
        depth: u32,

        /// 조회 주기 (밀리초)
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },

    /// 저장소에 기록된 거래소 상태 출력
    Status,
}
