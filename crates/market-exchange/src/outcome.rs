//! 시도 결과 분류.

use market_core::OrderBookSnapshot;

use crate::error::{FailureKind, VenueError};
use crate::traits::RawOrderBook;

/// 한 번의 조회 시도 결과.
///
/// 재시도 루프는 이 닫힌 집합에 대해서만 분기합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 양쪽 호가가 모두 있는 응답
    Success(OrderBookSnapshot),
    /// 요청 한도 초과 (리셋 힌트, epoch 초)
    RateLimited { reset_hint: Option<i64> },
    /// 타임아웃
    Timeout(String),
    /// 점검/장애
    Unavailable(String),
    /// 구조가 잘못된 성공 응답
    Malformed(String),
    /// 분류되지 않은 에러
    Unknown(String),
}

impl FetchOutcome {
    /// 어댑터 결과를 분류합니다.
    pub fn classify(
        symbol: &str,
        result: Result<RawOrderBook, VenueError>,
        captured_at_ms: i64,
    ) -> Self {
        match result {
            Ok(raw) => match raw.into_snapshot(symbol, captured_at_ms) {
                Ok(snapshot) => FetchOutcome::Success(snapshot),
                Err(detail) => FetchOutcome::Malformed(detail),
            },
            Err(VenueError::RateLimitExceeded { reset_hint }) => {
                FetchOutcome::RateLimited { reset_hint }
            }
            Err(VenueError::RequestTimeout(detail)) => FetchOutcome::Timeout(detail),
            Err(VenueError::Unavailable(detail)) => FetchOutcome::Unavailable(detail),
            Err(VenueError::Other(detail)) => FetchOutcome::Unknown(detail),
        }
    }

    /// 실패 분류 (성공이면 `None`).
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::RateLimited { .. } => Some(FailureKind::RateLimited),
            FetchOutcome::Timeout(_) => Some(FailureKind::Timeout),
            FetchOutcome::Unavailable(_) => Some(FailureKind::Unavailable),
            FetchOutcome::Malformed(_) => Some(FailureKind::MalformedResponse),
            FetchOutcome::Unknown(_) => Some(FailureKind::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::OrderBookLevel;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classify_success() {
        let raw = RawOrderBook::new(vec![OrderBookLevel::new(dec!(1), dec!(1))], vec![]);
        let outcome = FetchOutcome::classify("BTC/USDT", Ok(raw), 7);
        assert!(matches!(outcome, FetchOutcome::Success(ref s) if s.timestamp == 7));
        assert_eq!(outcome.failure_kind(), None);
    }

    #[test]
    fn test_classify_missing_side_as_malformed() {
        let raw = RawOrderBook {
            bids: Some(vec![]),
            asks: None,
            timestamp: None,
        };
        let outcome = FetchOutcome::classify("BTC/USDT", Ok(raw), 0);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::MalformedResponse));
    }

    #[test]
    fn test_classify_venue_errors() {
        let cases = [
            (
                VenueError::RateLimitExceeded {
                    reset_hint: Some(10),
                },
                FailureKind::RateLimited,
            ),
            (VenueError::RequestTimeout("t".into()), FailureKind::Timeout),
            (VenueError::Unavailable("u".into()), FailureKind::Unavailable),
            (VenueError::Other("o".into()), FailureKind::Unknown),
        ];

        for (err, kind) in cases {
            let outcome = FetchOutcome::classify("BTC/USDT", Err(err), 0);
            assert_eq!(outcome.failure_kind(), Some(kind));
        }
    }
}
