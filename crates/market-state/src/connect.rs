//! 설정 기반 저장소 연결.

use market_core::{StoreBackend, StoreConfig};
use std::sync::Arc;
use tracing::info;

use crate::error::StoreResult;
use crate::memory::MemoryStateStore;
use crate::redis_store::RedisStateStore;
use crate::store::StateStore;

/// 설정에 맞는 저장소를 엽니다. `backend = "none"`이면 `None`을 반환합니다.
pub async fn connect_store(config: &StoreConfig) -> StoreResult<Option<Arc<dyn StateStore>>> {
    let store: Arc<dyn StateStore> = match config.backend {
        StoreBackend::None => {
            info!("상태 저장소 비활성화");
            return Ok(None);
        }
        StoreBackend::Memory => Arc::new(MemoryStateStore::new()),
        StoreBackend::Redis => {
            Arc::new(RedisStateStore::connect(&config.redis_url, config.key_prefix.clone()).await?)
        }
    };

    info!(store = store.name(), "상태 저장소 연결");
    Ok(Some(store))
}
