//! 코어 크레이트의 에러 타입.

use thiserror::Error;

/// 설정 및 부트스트랩 단계의 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 파일/환경 변수 로드 실패
    #[error("설정 에러: {0}")]
    Config(String),

    /// 로깅 초기화 실패
    #[error("로깅 에러: {0}")]
    Logging(String),
}

/// 코어 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: CoreError = config::ConfigError::Message("missing field".to_string()).into();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(err.to_string().contains("missing field"));
    }
}
