//! 호가창 수집 CLI.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 호가창 단건 조회 (JSON 출력)
//! - 여러 심볼 동시 감시
//! - 저장된 거래소 상태 조회

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, FeedOptions};
