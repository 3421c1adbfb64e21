//! 거래소 연결 상태 머신.
//!
//! # 상태 전이
//!
//! | 이벤트              | 다음 상태      | 연속 실패 | 쿨다운 종료 시각 |
//! |---------------------|----------------|-----------|------------------|
//! | 성공                | `Connected`    | 0         | 해제             |
//! | 요청 한도 초과      | `RateLimited`  | +1        | 설정             |
//! | 점검/장애           | `Maintenance`  | +1        | 해제             |
//! | 타임아웃/기타       | 변경 없음      | +1        | 변경 없음        |
//! | 쿨다운 만료 확인    | `Connected`    | 변경 없음 | 해제             |
//!
//! 타임아웃과 분류되지 않은 에러는 상태를 바꾸지 않고 연속 실패 횟수만
//! 증가시킵니다. `rate_limit_reset_at`은 `RateLimited` 상태일 때만 존재합니다.

use chrono::{DateTime, Utc};
use market_core::ConnectionStatus;
use std::time::Duration;

/// 거래소 하나의 연결 건전성.
///
/// [`ResilientFetcher`](crate::ResilientFetcher)만 변경합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    status: ConnectionStatus,
    consecutive_failures: u32,
    rate_limit_reset_at: Option<DateTime<Utc>>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    /// `Disconnected` 상태로 생성합니다.
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            consecutive_failures: 0,
            rate_limit_reset_at: None,
        }
    }

    /// 현재 상태.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// 연속 실패 횟수.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// 쿨다운 종료 시각.
    pub fn rate_limit_reset_at(&self) -> Option<DateTime<Utc>> {
        self.rate_limit_reset_at
    }

    /// 성공 기록: 연결됨, 실패 횟수 초기화, 쿨다운 해제.
    pub fn record_success(&mut self) {
        self.status = ConnectionStatus::Connected;
        self.consecutive_failures = 0;
        self.rate_limit_reset_at = None;
    }

    /// 요청 한도 초과 기록.
    pub fn record_rate_limit(&mut self, reset_at: DateTime<Utc>) {
        self.status = ConnectionStatus::RateLimited;
        self.rate_limit_reset_at = Some(reset_at);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// 점검/장애 기록.
    pub fn record_maintenance(&mut self) {
        self.status = ConnectionStatus::Maintenance;
        self.rate_limit_reset_at = None;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// 타임아웃/분류되지 않은 실패 기록. 상태는 바꾸지 않습니다.
    pub fn record_transient_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// `now`가 쿨다운 구간 안에 있는지 확인합니다.
    pub fn is_cooling_down(&self, now: DateTime<Utc>) -> bool {
        match (self.status, self.rate_limit_reset_at) {
            (ConnectionStatus::RateLimited, Some(reset_at)) => now < reset_at,
            _ => false,
        }
    }

    /// 쿨다운이 끝났으면 `Connected`로 되돌립니다.
    ///
    /// 상태가 바뀌었으면 `true`를 반환합니다. 여러 번 호출해도 안전합니다.
    pub fn clear_cool_down_if_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != ConnectionStatus::RateLimited {
            return false;
        }
        match self.rate_limit_reset_at {
            Some(reset_at) if now < reset_at => false,
            _ => {
                self.status = ConnectionStatus::Connected;
                self.rate_limit_reset_at = None;
                true
            }
        }
    }

    /// 남은 쿨다운 시간 (쿨다운 중이 아니면 `None`).
    pub fn remaining_cool_down(&self, now: DateTime<Utc>) -> Option<Duration> {
        if !self.is_cooling_down(now) {
            return None;
        }
        self.rate_limit_reset_at
            .and_then(|reset_at| (reset_at - now).to_std().ok())
    }
}
