//! 거래소 에러 타입.

use std::fmt;
use thiserror::Error;

/// 거래소 어댑터가 보고하는 실패 신호.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    /// 요청 한도 초과. `reset_hint`는 한도가 풀리는 epoch 초 (없거나 0일 수 있음)
    #[error("Rate limit exceeded (reset hint: {reset_hint:?})")]
    RateLimitExceeded { reset_hint: Option<i64> },

    /// 타임아웃
    #[error("Request timeout: {0}")]
    RequestTimeout(String),

    /// 거래소 점검/장애
    #[error("Venue unavailable: {0}")]
    Unavailable(String),

    /// 분류되지 않은 에러
    #[error("Venue error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for VenueError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VenueError::RequestTimeout(err.to_string())
        } else if err.is_connect() {
            // 연결 거부/DNS 실패는 거래소 장애로 취급
            VenueError::Unavailable(err.to_string())
        } else {
            VenueError::Other(err.to_string())
        }
    }
}

/// 시도 한 번의 실패 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// 요청 한도 초과 - 지수 백오프
    RateLimited,
    /// 타임아웃 - 짧은 고정 대기
    Timeout,
    /// 점검/장애 - 긴 고정 대기
    Unavailable,
    /// 응답에 bids/asks가 없음 - 일시적 실패로 취급
    MalformedResponse,
    /// 분류되지 않은 에러
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RateLimited => write!(f, "rate_limited"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unavailable => write!(f, "unavailable"),
            FailureKind::MalformedResponse => write!(f, "malformed_response"),
            FailureKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// 호가창 조회의 최종 실패.
///
/// 시도별 실패는 재시도 루프 안에서 흡수되고, 시도 횟수를 모두 소진한
/// 경우에만 마지막 실패 분류와 함께 반환됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 시도 횟수 소진
    #[error("Order book fetch failed after {attempts} attempts: {reason} ({detail})")]
    Exhausted {
        reason: FailureKind,
        attempts: u32,
        detail: String,
    },

    /// 잘못된 요청 (거래소를 호출하지 않음)
    #[error("Invalid fetch request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// 마지막 실패 분류.
    pub fn reason(&self) -> Option<FailureKind> {
        match self {
            FetchError::Exhausted { reason, .. } => Some(*reason),
            FetchError::InvalidRequest(_) => None,
        }
    }

    /// 수행한 시도 횟수.
    pub fn attempts(&self) -> u32 {
        match self {
            FetchError::Exhausted { attempts, .. } => *attempts,
            FetchError::InvalidRequest(_) => 0,
        }
    }
}

/// 거래소 생성 단계의 에러. 재시도하지 않습니다.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 지원하지 않는 거래소 식별자
    #[error("Unsupported venue: {0}")]
    Unsupported(String),

    /// 어댑터 초기화 실패
    #[error("Venue initialization failed: {0}")]
    Initialization(String),
}

/// 거래소 생성 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_accessors() {
        let err = FetchError::Exhausted {
            reason: FailureKind::Timeout,
            attempts: 3,
            detail: "deadline".into(),
        };
        assert_eq!(err.reason(), Some(FailureKind::Timeout));
        assert_eq!(err.attempts(), 3);
        assert!(err.to_string().contains("after 3 attempts: timeout"));

        let invalid = FetchError::InvalidRequest("depth must be positive".into());
        assert_eq!(invalid.reason(), None);
        assert_eq!(invalid.attempts(), 0);
    }
}
