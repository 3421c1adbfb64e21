//! 저장되는 거래소 상태 레코드.

use market_core::ConnectionStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// 저장소가 쓰기 시각을 기록하는 필드 이름 (epoch 밀리초).
pub const WRITE_TIMESTAMP_FIELD: &str = "timestamp";

/// 거래소 하나의 연결 상태 미러.
///
/// `rate_limit_reset_at`은 쿨다운이 끝나면 `null`로 기록되어
/// 저장소에서 제거됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// 연결 상태
    pub status: ConnectionStatus,
    /// 연속 실패 횟수
    pub reconnect_attempts: u32,
    /// 쿨다운 종료 시각 (epoch 밀리초)
    pub rate_limit_reset_at: Option<i64>,
    /// 테스트넷 사용 여부
    pub sandbox: bool,
    /// API 자격증명 설정 여부
    pub has_credentials: bool,
}

impl StatusRecord {
    /// 병합 쓰기용 필드 맵으로 변환합니다.
    pub fn to_fields(&self) -> StoreResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(StoreError::Serialization(format!(
                "status record serialized to non-object: {}",
                other
            ))),
        }
    }

    /// 저장소 문서에서 레코드를 복원합니다. 쓰기 시각 필드는 무시합니다.
    pub fn from_fields(fields: &Map<String, Value>) -> StoreResult<Self> {
        let mut fields = fields.clone();
        fields.remove(WRITE_TIMESTAMP_FIELD);
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_carry_explicit_null_reset() {
        let record = StatusRecord {
            status: ConnectionStatus::Connected,
            reconnect_attempts: 0,
            rate_limit_reset_at: None,
            sandbox: true,
            has_credentials: false,
        };
        let fields = record.to_fields().unwrap();
        assert_eq!(fields["status"], Value::from("connected"));
        assert_eq!(fields["rate_limit_reset_at"], Value::Null);
        assert_eq!(fields["sandbox"], Value::Bool(true));
        assert!(!fields.contains_key(WRITE_TIMESTAMP_FIELD));
    }

    #[test]
    fn test_from_fields_ignores_write_timestamp() {
        let mut fields = Map::new();
        fields.insert("status".into(), Value::from("rate_limited"));
        fields.insert("reconnect_attempts".into(), Value::from(2));
        fields.insert("rate_limit_reset_at".into(), Value::from(1_700_000_010_000i64));
        fields.insert("sandbox".into(), Value::Bool(false));
        fields.insert("has_credentials".into(), Value::Bool(true));
        fields.insert(WRITE_TIMESTAMP_FIELD.into(), Value::from(1_700_000_000_000i64));

        let record = StatusRecord::from_fields(&fields).unwrap();
        assert_eq!(record.status, ConnectionStatus::RateLimited);
        assert_eq!(record.reconnect_attempts, 2);
        assert_eq!(record.rate_limit_reset_at, Some(1_700_000_010_000));
    }
}
