//! 상태 저장소 에러 타입.

use thiserror::Error;

/// 상태 저장 관련 에러.
///
/// 호출자(페처)는 이 에러를 로그로만 남기고 전파하지 않습니다.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 저장소 백엔드 오류
    #[error("Store backend error: {0}")]
    Backend(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 쓰기 타임아웃
    #[error("Store timeout: {0}")]
    Timeout(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for StoreError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        StoreError::Timeout(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
