//! 원인별 재시도 정책.
//!
//! - **요청 한도 초과**: `base_delay * 2^attempt` 지수 백오프
//! - **타임아웃**: 짧은 고정 대기 (기본 1초)
//! - **점검/장애**: 긴 고정 대기 (기본 30초)
//! - **잘못된 응답/기타**: 최소 대기 (기본 250ms, 0이면 즉시 재시도)

use chrono::{DateTime, TimeDelta, Utc};
use market_core::RetryConfig;
use std::time::Duration;

use crate::error::FailureKind;

/// 재시도 정책.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 호출당 기본 최대 시도 횟수
    pub max_attempts: u32,
    /// 지수 백오프 기본 단위
    pub base_delay: Duration,
    /// 타임아웃 후 대기
    pub timeout_delay: Duration,
    /// 점검/장애 후 대기
    pub maintenance_delay: Duration,
    /// 잘못된 응답/분류되지 않은 에러 후 대기
    pub unknown_delay: Duration,
    /// 리셋 힌트가 없을 때의 쿨다운
    pub default_rate_limit_window: Duration,
    /// 상태 저장 타임아웃
    pub persist_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            timeout_delay: Duration::from_millis(config.timeout_delay_ms),
            maintenance_delay: Duration::from_millis(config.maintenance_delay_ms),
            unknown_delay: Duration::from_millis(config.unknown_delay_ms),
            default_rate_limit_window: Duration::from_secs(config.default_rate_limit_window_secs),
            persist_timeout: Duration::from_millis(config.persist_timeout_ms),
        }
    }
}

impl RetryPolicy {
    /// 모든 대기를 `unit` 기준으로 비례 축소한 정책 (테스트/데모용).
    ///
    /// 타임아웃 1단위, 점검 30단위, 기본 쿨다운 60단위를 유지합니다.
    pub fn scaled(unit: Duration) -> Self {
        Self {
            base_delay: unit,
            timeout_delay: unit,
            maintenance_delay: unit * 30,
            unknown_delay: unit / 4,
            default_rate_limit_window: unit * 60,
            ..Self::default()
        }
    }

    /// 최대 시도 횟수를 설정합니다.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// 분류되지 않은 에러 후 대기를 설정합니다.
    pub fn with_unknown_delay(mut self, delay: Duration) -> Self {
        self.unknown_delay = delay;
        self
    }

    /// 요청 한도 초과 시 `attempt`번째(0부터) 백오프.
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// 실패 분류별 대기 시간.
    pub fn delay_for(&self, kind: FailureKind, attempt: u32) -> Duration {
        match kind {
            FailureKind::RateLimited => self.rate_limit_backoff(attempt),
            FailureKind::Timeout => self.timeout_delay,
            FailureKind::Unavailable => self.maintenance_delay,
            FailureKind::MalformedResponse | FailureKind::Unknown => self.unknown_delay,
        }
    }

    /// 쿨다운 종료 시각을 결정합니다.
    ///
    /// 거래소 힌트(epoch 초)가 `now` 이후이면 그대로 쓰고, 없거나 0이거나
    /// 이미 지난 시각이면 `now + default_rate_limit_window`를 사용합니다.
    pub fn resolve_reset_at(&self, reset_hint: Option<i64>, now: DateTime<Utc>) -> DateTime<Utc> {
        reset_hint
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .filter(|reset_at| *reset_at > now)
            .unwrap_or_else(|| {
                let window = TimeDelta::from_std(self.default_rate_limit_window)
                    .unwrap_or(TimeDelta::seconds(60));
                now + window
            })
    }
}
