//! 랜덤 워크 호가창을 생성하는 시뮬레이션 거래소.

use async_trait::async_trait;
use chrono::Utc;
use market_core::{OrderBookLevel, SimulatedConfig};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::VenueError;
use crate::traits::{RawOrderBook, VenueAdapter, VenueResult};

/// 랜덤 워크 시뮬레이션 거래소.
#[derive(Debug)]
pub struct SimulatedVenue {
    id: String,
    config: SimulatedConfig,
    sandbox: bool,
    /// 심볼별 현재 중간가
    prices: Mutex<HashMap<String, Decimal>>,
}

impl SimulatedVenue {
    /// 새 시뮬레이션 거래소를 생성합니다.
    pub fn new(id: impl Into<String>, config: SimulatedConfig) -> Self {
        Self {
            id: id.into(),
            config,
            sandbox: false,
            prices: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// 다음 응답을 생성합니다. 난수 생성기는 이 함수 밖으로 나가지 않습니다.
    fn next_response(&self, symbol: &str, depth: u32) -> VenueResult<RawOrderBook> {
        let mut rng = rand::thread_rng();
        let roll: f64 = rng.gen();

        let mut threshold = self.config.rate_limit_probability;
        if roll < threshold {
            return Err(VenueError::RateLimitExceeded {
                reset_hint: Some(Utc::now().timestamp() + self.config.rate_limit_reset_secs),
            });
        }
        threshold += self.config.timeout_probability;
        if roll < threshold {
            return Err(VenueError::RequestTimeout("simulated timeout".to_string()));
        }
        threshold += self.config.unavailable_probability;
        if roll < threshold {
            return Err(VenueError::Unavailable("simulated maintenance".to_string()));
        }

        let mid = self.step_price(symbol, &mut rng);
        let (bids, asks) = self.build_levels(mid, depth, &mut rng);

        threshold += self.config.malformed_probability;
        if roll < threshold {
            return Ok(RawOrderBook {
                bids: Some(bids),
                asks: None,
                timestamp: None,
            });
        }

        Ok(RawOrderBook::new(bids, asks).with_timestamp(Utc::now().timestamp_millis()))
    }

    fn step_price(&self, symbol: &str, rng: &mut impl Rng) -> Decimal {
        let mut prices = self.prices.lock().unwrap_or_else(PoisonError::into_inner);
        let price = prices
            .entry(symbol.to_string())
            .or_insert(self.config.initial_price);

        let change_pct = (rng.gen::<f64>() - 0.5) * 2.0 * self.config.volatility;
        let change = *price * Decimal::from_f64(change_pct).unwrap_or_default();
        let next = (*price + change).max(self.config.tick_size);
        *price = next.round_dp(self.config.tick_size.scale());
        *price
    }

    fn build_levels(
        &self,
        mid: Decimal,
        depth: u32,
        rng: &mut impl Rng,
    ) -> (Vec<OrderBookLevel>, Vec<OrderBookLevel>) {
        let tick = self.config.tick_size;
        let mut bids = Vec::with_capacity(depth as usize);
        let mut asks = Vec::with_capacity(depth as usize);

        for level in 1..=depth {
            let offset = tick * Decimal::from(level);
            let bid_qty = Decimal::from_f64(rng.gen_range(0.01..5.0))
                .unwrap_or(dec!(1))
                .round_dp(4);
            let ask_qty = Decimal::from_f64(rng.gen_range(0.01..5.0))
                .unwrap_or(dec!(1))
                .round_dp(4);

            let bid_price = mid - offset;
            if bid_price > Decimal::ZERO {
                bids.push(OrderBookLevel::new(bid_price, bid_qty));
            }
            asks.push(OrderBookLevel::new(mid + offset, ask_qty));
        }

        (bids, asks)
    }
}

#[async_trait]
impl VenueAdapter for SimulatedVenue {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    async fn fetch_order_book(&self, symbol: &str, depth: u32) -> VenueResult<RawOrderBook> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        self.next_response(symbol, depth)
    }
}
