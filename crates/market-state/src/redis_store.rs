//! Redis 상태 저장소.
//!
//! 거래소마다 `{key_prefix}:{venue_id}` 해시 하나를 사용합니다.
//! `HSET`이 필드 단위로 덮어쓰므로 병합 의미론이 그대로 성립합니다.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::error::StoreResult;
use crate::record::WRITE_TIMESTAMP_FIELD;
use crate::store::StateStore;

/// Redis 해시 기반 상태 저장소.
#[derive(Clone)]
pub struct RedisStateStore {
    connection: ConnectionManager,
    key_prefix: String,
}

impl RedisStateStore {
    /// Redis에 연결합니다.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> StoreResult<Self> {
        info!("Connecting to Redis...");

        let client = Client::open(url)?;
        let connection = client.get_connection_manager().await?;

        info!("Redis connection established");

        Ok(Self {
            connection,
            key_prefix: key_prefix.into(),
        })
    }

    /// Redis 상태를 확인합니다.
    pub async fn health_check(&self) -> StoreResult<bool> {
        let mut conn = self.connection.clone();
        let result: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(result == "PONG")
    }

    fn document_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    /// 서버 시각 (epoch 밀리초).
    async fn server_time_ms(&self) -> StoreResult<i64> {
        let mut conn = self.connection.clone();
        let (secs, micros): (i64, i64) = redis::cmd("TIME").query_async(&mut conn).await?;
        Ok(secs * 1_000 + micros / 1_000)
    }
}

/// JSON 값을 해시 필드 문자열로 변환합니다. 문자열은 따옴표 없이 저장합니다.
fn encode_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 해시 필드 문자열을 JSON 값으로 복원합니다.
fn decode_field(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

/// 병합 필드를 `HSET` 대상과 `HDEL` 대상으로 나눕니다.
fn partition_fields(fields: Map<String, Value>) -> (Vec<(String, String)>, Vec<String>) {
    let mut sets = Vec::with_capacity(fields.len() + 1);
    let mut deletes = Vec::new();

    for (field, value) in fields {
        if value.is_null() {
            deletes.push(field);
        } else {
            sets.push((field, encode_field(&value)));
        }
    }
    (sets, deletes)
}

#[async_trait]
impl StateStore for RedisStateStore {
    fn name(&self) -> &str {
        "redis"
    }

    #[instrument(skip(self, fields))]
    async fn upsert_merge(&self, key: &str, fields: Map<String, Value>) -> StoreResult<()> {
        let document_key = self.document_key(key);
        let written_at = self.server_time_ms().await?;

        let (mut sets, deletes) = partition_fields(fields);
        sets.push((WRITE_TIMESTAMP_FIELD.to_string(), written_at.to_string()));

        let mut pipe = redis::pipe();
        pipe.atomic().hset_multiple(&document_key, &sets).ignore();
        if !deletes.is_empty() {
            pipe.hdel(&document_key, deletes).ignore();
        }

        let mut conn = self.connection.clone();
        let _: () = pipe.query_async(&mut conn).await?;

        debug!(key = %document_key, fields = sets.len(), "State merged");
        Ok(())
    }

    async fn load(&self, key: &str) -> StoreResult<Option<Map<String, Value>>> {
        let mut conn = self.connection.clone();
        let raw: HashMap<String, String> = conn.hgetall(self.document_key(key)).await?;

        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            raw.into_iter()
                .map(|(field, value)| (field, decode_field(value)))
                .collect(),
        ))
    }
}

impl std::fmt::Debug for RedisStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStateStore")
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}
