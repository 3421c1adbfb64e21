//! 설정 기반 거래소/페처 생성.

use market_core::{FeedConfig, VenueConfig};
use market_state::StateStore;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::connector::{BinanceConfig, BinanceVenue};
use crate::error::{ExchangeError, ExchangeResult};
use crate::fetcher::ResilientFetcher;
use crate::retry::RetryPolicy;
use crate::simulated::SimulatedVenue;
use crate::traits::VenueAdapter;

/// 지원하는 거래소 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VenueKind {
    /// Binance Spot REST
    Binance,
    /// 랜덤 워크 시뮬레이션
    Simulated,
}

impl VenueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueKind::Binance => "binance",
            VenueKind::Simulated => "simulated",
        }
    }
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueKind {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" | "binance-spot" | "binance_spot" => Ok(VenueKind::Binance),
            "simulated" => Ok(VenueKind::Simulated),
            _ => Err(ExchangeError::Unsupported(s.to_string())),
        }
    }
}

/// 설정에 맞는 거래소 어댑터를 생성합니다.
///
/// # Errors
/// - 알 수 없는 거래소 식별자: `ExchangeError::Unsupported`
/// - 어댑터 초기화 실패: `ExchangeError::Initialization`
pub fn build_venue(config: &VenueConfig) -> ExchangeResult<Arc<dyn VenueAdapter>> {
    let kind: VenueKind = config.id.parse()?;

    let venue: Arc<dyn VenueAdapter> = match kind {
        VenueKind::Binance => Arc::new(BinanceVenue::new(BinanceConfig::from_venue_config(config))?),
        VenueKind::Simulated => Arc::new(
            SimulatedVenue::new(kind.as_str(), config.simulated.clone())
                .with_sandbox(config.sandbox),
        ),
    };

    info!(
        venue = %kind,
        sandbox = venue.is_sandbox(),
        has_credentials = venue.has_credentials(),
        "거래소 어댑터 생성"
    );
    Ok(venue)
}

/// 설정으로 페처를 생성하고 초기 상태를 저장소에 기록합니다.
///
/// 저장소 기록 실패는 생성 실패로 이어지지 않습니다.
pub async fn build_fetcher(
    config: &FeedConfig,
    store: Option<Arc<dyn StateStore>>,
) -> ExchangeResult<ResilientFetcher> {
    let venue = build_venue(&config.venue)?;
    let policy = RetryPolicy::from(&config.retry);
    let venue_id = config.venue.id.trim().to_lowercase();

    let fetcher = ResilientFetcher::new(venue_id, venue, store, policy);
    fetcher.sync_state().await;
    Ok(fetcher)
}
