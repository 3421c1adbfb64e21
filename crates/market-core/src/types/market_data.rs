//! 호가창 데이터 구조체.
//!
//! - `OrderBookLevel` - 호가 한 단계 (가격, 수량)
//! - `OrderBookSnapshot` - 한 번의 조회로 얻은 호가창 스냅샷

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 가격 타입.
pub type Price = Decimal;

/// 수량 타입.
pub type Quantity = Decimal;

/// 호가창 가격 레벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    /// 가격
    pub price: Price,
    /// 수량
    pub quantity: Quantity,
}

impl OrderBookLevel {
    /// 새 가격 레벨을 생성합니다.
    pub fn new(price: Price, quantity: Quantity) -> Self {
        Self { price, quantity }
    }
}

/// 검증을 통과한 호가창 스냅샷.
///
/// 매수/매도 호가는 거래소가 보낸 순서(최우선 → 후순위)를 그대로 유지합니다.
/// 양쪽 모두 항상 존재하며, 비어 있을 수는 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// 거래 심볼 (예: "BTC/USDT")
    pub symbol: String,
    /// 매수 호가
    pub bids: Vec<OrderBookLevel>,
    /// 매도 호가
    pub asks: Vec<OrderBookLevel>,
    /// epoch 밀리초 (거래소 제공값, 없으면 수신 시각)
    pub timestamp: i64,
}

impl OrderBookSnapshot {
    /// 최우선 매수 호가를 반환합니다.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|l| l.price)
    }

    /// 최우선 매도 호가를 반환합니다.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|l| l.price)
    }

    /// 스프레드를 반환합니다.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// 중간 가격을 반환합니다.
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        }
    }

    /// 양쪽 호가가 모두 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// 스냅샷 타임스탬프를 `DateTime`으로 변환합니다.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
