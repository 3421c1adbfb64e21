//! 데모 및 테스트를 위한 시뮬레이션 거래소.
//!
//! - [`SimulatedVenue`]: 랜덤 워크 호가창과 확률적 장애 주입
//! - [`ScriptedVenue`]: 미리 정한 응답을 순서대로 재생하고 호출 횟수를 기록
//!
//! # 예제
//!
//! ```ignore
//! use market_exchange::simulated::ScriptedVenue;
//!
//! let venue = ScriptedVenue::new("binance")
//!     .then_err(VenueError::RequestTimeout("slow".into()))
//!     .then_ok(book);
//!
//! let fetcher = ResilientFetcher::new("binance", Arc::new(venue), None, policy);
//! ```

mod random_walk;
mod scripted;

pub use market_core::SimulatedConfig;
pub use random_walk::SimulatedVenue;
pub use scripted::ScriptedVenue;
