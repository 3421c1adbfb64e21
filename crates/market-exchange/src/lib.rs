//! 거래소 호가창 조회와 연결 복원력.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - VenueAdapter trait: 거래소 호가창 조회 인터페이스
//! - 실패 분류 (요청 한도 초과, 타임아웃, 점검, 잘못된 응답)
//! - ConnectionState: 연결 상태 머신
//! - ResilientFetcher: 원인별 백오프를 적용하는 제한된 재시도 루프
//! - Binance REST 커넥터
//! - 시뮬레이션/스크립트 거래소 (데모 및 테스트용)

pub mod connection;
pub mod connector;
pub mod error;
pub mod factory;
pub mod fetcher;
pub mod outcome;
pub mod retry;
pub mod simulated;
pub mod traits;

pub use connection::ConnectionState;
pub use connector::{BinanceConfig, BinanceVenue};
pub use error::*;
pub use factory::{build_fetcher, build_venue, VenueKind};
pub use fetcher::ResilientFetcher;
pub use outcome::FetchOutcome;
pub use retry::RetryPolicy;
pub use simulated::{ScriptedVenue, SimulatedConfig, SimulatedVenue};
pub use traits::*;
