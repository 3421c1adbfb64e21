//! 프로세스 메모리 상태 저장소.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::record::WRITE_TIMESTAMP_FIELD;
use crate::store::StateStore;

/// 메모리 기반 문서 저장소.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    documents: RwLock<HashMap<String, Map<String, Value>>>,
    writes: AtomicU64,
}

impl MemoryStateStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 성공한 쓰기 횟수.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// 저장된 문서 수.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// 저장소가 비어 있는지 확인합니다.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upsert_merge(&self, key: &str, fields: Map<String, Value>) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        let document = documents.entry(key.to_string()).or_default();

        for (field, value) in fields {
            if value.is_null() {
                document.remove(&field);
            } else {
                document.insert(field, value);
            }
        }
        document.insert(
            WRITE_TIMESTAMP_FIELD.to_string(),
            Value::from(Utc::now().timestamp_millis()),
        );

        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn load(&self, key: &str) -> StoreResult<Option<Map<String, Value>>> {
        Ok(self.documents.read().await.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_merge_keeps_untouched_fields() {
        let store = MemoryStateStore::new();
        store
            .upsert_merge(
                "binance",
                fields(&[("status", "connected".into()), ("sandbox", true.into())]),
            )
            .await
            .unwrap();
        store
            .upsert_merge("binance", fields(&[("status", "maintenance".into())]))
            .await
            .unwrap();

        let doc = store.load("binance").await.unwrap().unwrap();
        assert_eq!(doc["status"], Value::from("maintenance"));
        assert_eq!(doc["sandbox"], Value::Bool(true));
        assert!(doc[WRITE_TIMESTAMP_FIELD].as_i64().is_some());
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_null_removes_field() {
        let store = MemoryStateStore::new();
        store
            .upsert_merge("kraken", fields(&[("rate_limit_reset_at", 10.into())]))
            .await
            .unwrap();
        store
            .upsert_merge("kraken", fields(&[("rate_limit_reset_at", Value::Null)]))
            .await
            .unwrap();

        let doc = store.load("kraken").await.unwrap().unwrap();
        assert!(!doc.contains_key("rate_limit_reset_at"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_missing_key() {
        let store = MemoryStateStore::new();
        assert!(store.load("nope").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
