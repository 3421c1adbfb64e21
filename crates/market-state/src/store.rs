//! 상태 저장소 trait 정의.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreResult;

/// 거래소 식별자를 키로 하는 문서 저장소.
///
/// 쓰기는 병합 의미론을 따릅니다: `fields`에 없는 필드는 그대로 두고,
/// 값이 `null`인 필드는 문서에서 제거합니다. 구현체는 쓰기 시각을
/// [`WRITE_TIMESTAMP_FIELD`](crate::WRITE_TIMESTAMP_FIELD)에 직접 기록합니다.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// 저장소 이름 (로깅용).
    fn name(&self) -> &str;

    /// 문서에 필드를 병합합니다. 문서가 없으면 생성합니다.
    async fn upsert_merge(&self, key: &str, fields: Map<String, Value>) -> StoreResult<()>;

    /// 문서를 조회합니다.
    async fn load(&self, key: &str) -> StoreResult<Option<Map<String, Value>>>;
}
