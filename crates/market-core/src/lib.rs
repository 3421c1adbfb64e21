//! # Market Core
//!
//! 호가창 수집 계층 전반에서 공유하는 기본 타입을 제공합니다:
//! - 호가창 스냅샷 및 가격 레벨
//! - 거래소 연결 상태
//! - 심볼 정규화
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
