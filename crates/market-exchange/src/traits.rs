//! 거래소 어댑터 trait 정의.

use async_trait::async_trait;
use market_core::{OrderBookLevel, OrderBookSnapshot};

use crate::error::VenueError;

/// 거래소 조회 작업을 위한 Result 타입.
pub type VenueResult<T> = Result<T, VenueError>;

/// 검증 전 호가창 응답.
///
/// 거래소 응답에 `bids`/`asks` 키가 없으면 해당 필드는 `None`입니다.
/// 빈 목록(`Some(vec![])`)과는 구분됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOrderBook {
    /// 매수 호가
    pub bids: Option<Vec<OrderBookLevel>>,
    /// 매도 호가
    pub asks: Option<Vec<OrderBookLevel>>,
    /// 거래소 타임스탬프 (epoch 밀리초)
    pub timestamp: Option<i64>,
}

impl RawOrderBook {
    /// 양쪽 호가가 모두 있는 응답을 생성합니다.
    pub fn new(bids: Vec<OrderBookLevel>, asks: Vec<OrderBookLevel>) -> Self {
        Self {
            bids: Some(bids),
            asks: Some(asks),
            timestamp: None,
        }
    }

    /// 거래소 타임스탬프를 설정합니다.
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    /// 구조를 검증하여 스냅샷으로 변환합니다.
    ///
    /// 한쪽 호가라도 없으면 누락된 키 이름을 담은 에러를 반환합니다.
    pub fn into_snapshot(
        self,
        symbol: &str,
        captured_at_ms: i64,
    ) -> Result<OrderBookSnapshot, String> {
        match (self.bids, self.asks) {
            (Some(bids), Some(asks)) => Ok(OrderBookSnapshot {
                symbol: symbol.to_string(),
                bids,
                asks,
                timestamp: self.timestamp.unwrap_or(captured_at_ms),
            }),
            (None, None) => Err("response missing 'bids' and 'asks'".to_string()),
            (None, Some(_)) => Err("response missing 'bids'".to_string()),
            (Some(_), None) => Err("response missing 'asks'".to_string()),
        }
    }
}

/// 거래소 호가창 조회 인터페이스.
///
/// 구현체는 네트워크 호출만 담당하고, 재시도와 상태 관리는
/// [`ResilientFetcher`](crate::ResilientFetcher)가 맡습니다.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// 거래소 식별자 반환.
    fn id(&self) -> &str;

    /// 테스트넷 사용 여부.
    fn is_sandbox(&self) -> bool {
        false
    }

    /// API 자격증명 설정 여부.
    fn has_credentials(&self) -> bool {
        false
    }

    /// 심볼의 호가창을 `depth` 단계까지 조회.
    async fn fetch_order_book(&self, symbol: &str, depth: u32) -> VenueResult<RawOrderBook>;
}
