//! CLI 명령어 구현 모듈.

pub mod orderbook;
pub mod status;
pub mod watch;

use market_core::StoreConfig;
use market_state::{connect_store, StateStore};
use std::sync::Arc;
use tracing::warn;

/// 설정된 상태 저장소를 엽니다.
///
/// 연결에 실패하면 경고만 남기고 저장소 없이 진행합니다.
pub async fn open_store(config: &StoreConfig) -> Option<Arc<dyn StateStore>> {
    match connect_store(config).await {
        Ok(store) => store,
        Err(e) => {
            warn!(backend = ?config.backend, error = %e, "상태 저장소 연결 실패, 저장 없이 진행");
            None
        }
    }
}
