//! Binance 거래소 커넥터.
//!
//! Binance Spot 공개 REST API로 호가창을 조회합니다.
//! 메인넷과 테스트넷 모두 지원.

use async_trait::async_trait;
use chrono::Utc;
use market_core::{compact_symbol, mask_api_key, OrderBookLevel, VenueConfig};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ExchangeError, ExchangeResult, VenueError};
use crate::traits::{RawOrderBook, VenueAdapter, VenueResult};

const MAINNET_REST_URL: &str = "https://api.binance.com";
const TESTNET_REST_URL: &str = "https://testnet.binance.vision";
const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";
const API_KEY_HEADER: &str = "X-MBX-APIKEY";

// ============================================================================
// 설정
// ============================================================================

/// Binance 클라이언트 설정.
///
/// # 보안
/// - `Debug` 구현은 `api_key`를 마스킹합니다.
#[derive(Clone)]
pub struct BinanceConfig {
    /// API 키 (공개 엔드포인트에는 선택)
    pub api_key: Option<String>,
    /// 테스트넷 사용
    pub testnet: bool,
    /// 요청 타임아웃
    pub timeout: Duration,
    /// REST 기본 URL 오버라이드 (테스트/프록시용)
    pub base_url: Option<String>,
}

impl fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_key = self.api_key.as_deref().map(mask_api_key);

        f.debug_struct("BinanceConfig")
            .field("api_key", &masked_key)
            .field("testnet", &self.testnet)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            testnet: false,
            timeout: Duration::from_secs(10),
            base_url: None,
        }
    }
}

impl BinanceConfig {
    /// 새 설정 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 테스트넷 사용.
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// API 키 설정. 빈 문자열은 무시합니다.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }

    /// 요청 타임아웃 설정.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// REST 기본 URL 오버라이드.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// 거래소 설정에서 생성.
    pub fn from_venue_config(config: &VenueConfig) -> Self {
        let mut binance = Self::new()
            .with_testnet(config.sandbox)
            .with_timeout(config.request_timeout());
        if let Some(key) = &config.api_key {
            binance = binance.with_api_key(key.clone());
        }
        binance.base_url = config.rest_base_url.clone();
        binance
    }

    /// REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.testnet => TESTNET_REST_URL,
            None => MAINNET_REST_URL,
        }
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

/// `/api/v3/depth` 응답. 키가 빠지면 `None`으로 남습니다.
#[derive(Debug, Deserialize)]
struct BinanceDepth {
    #[serde(default)]
    bids: Option<Vec<[String; 2]>>,
    #[serde(default)]
    asks: Option<Vec<[String; 2]>>,
}

#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    code: i32,
    msg: String,
}

// ============================================================================
// 클라이언트
// ============================================================================

/// Binance Spot 호가창 어댑터.
pub struct BinanceVenue {
    config: BinanceConfig,
    client: Client,
}

impl fmt::Debug for BinanceVenue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceVenue")
            .field("config", &self.config)
            .finish()
    }
}

impl BinanceVenue {
    /// 새 Binance 어댑터 생성.
    ///
    /// # Errors
    /// 기본 URL이 잘못되었거나 HTTP 클라이언트 생성에 실패하면
    /// `ExchangeError::Initialization`을 반환합니다.
    pub fn new(config: BinanceConfig) -> ExchangeResult<Self> {
        let base_url = config.rest_base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ExchangeError::Initialization(format!(
                "invalid REST base URL: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ExchangeError::Initialization(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// 설정 반환.
    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    fn parse_levels(side: &str, raw: Vec<[String; 2]>) -> VenueResult<Vec<OrderBookLevel>> {
        raw.into_iter()
            .map(|[price, qty]| {
                let price = Decimal::from_str(&price).map_err(|e| {
                    VenueError::Other(format!("invalid {} price '{}': {}", side, price, e))
                })?;
                let quantity = Decimal::from_str(&qty).map_err(|e| {
                    VenueError::Other(format!("invalid {} quantity '{}': {}", side, qty, e))
                })?;
                Ok(OrderBookLevel::new(price, quantity))
            })
            .collect()
    }

    /// 성공이 아닌 HTTP 상태를 거래소 에러로 매핑.
    fn map_status(status: StatusCode, headers: &HeaderMap, body: &str) -> VenueError {
        let message = serde_json::from_str::<BinanceErrorBody>(body)
            .map(|e| format!("{} ({})", e.msg, e.code))
            .unwrap_or_else(|_| format!("HTTP {}: {}", status.as_u16(), body));

        match status {
            StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT => {
                VenueError::RateLimitExceeded {
                    reset_hint: rate_limit_reset_hint(headers, Utc::now().timestamp()),
                }
            }
            StatusCode::GATEWAY_TIMEOUT => VenueError::RequestTimeout(message),
            // 504를 제외한 5xx는 거래소 측 장애
            s if s.is_server_error() => VenueError::Unavailable(message),
            _ => VenueError::Other(message),
        }
    }
}

/// 요청 한도 리셋 시각(epoch 초)을 헤더에서 추출합니다.
///
/// `x-ratelimit-reset`은 절대 시각, `Retry-After`는 `now_secs` 기준 상대 초입니다.
fn rate_limit_reset_hint(headers: &HeaderMap, now_secs: i64) -> Option<i64> {
    let header_i64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    header_i64(RATE_LIMIT_RESET_HEADER)
        .or_else(|| header_i64(RETRY_AFTER.as_str()).map(|secs| now_secs + secs))
}

#[async_trait]
impl VenueAdapter for BinanceVenue {
    fn id(&self) -> &str {
        "binance"
    }

    fn is_sandbox(&self) -> bool {
        self.config.testnet
    }

    fn has_credentials(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn fetch_order_book(&self, symbol: &str, depth: u32) -> VenueResult<RawOrderBook> {
        let url = format!("{}/api/v3/depth", self.config.rest_base_url());
        let binance_symbol = compact_symbol(symbol);

        debug!(%url, symbol = %binance_symbol, limit = depth, "GET depth");

        let mut request = self
            .client
            .get(&url)
            .query(&[("symbol", binance_symbol), ("limit", depth.to_string())]);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            let err = Self::map_status(status, &headers, &body);
            warn!(status = status.as_u16(), error = %err, "Binance depth request failed");
            return Err(err);
        }

        let depth: BinanceDepth = serde_json::from_str(&body)
            .map_err(|e| VenueError::Other(format!("failed to parse depth response: {}", e)))?;

        let bids = depth
            .bids
            .map(|raw| Self::parse_levels("bid", raw))
            .transpose()?;
        let asks = depth
            .asks
            .map(|raw| Self::parse_levels("ask", raw))
            .transpose()?;

        // depth 응답에는 타임스탬프가 없어 수신 시각을 사용
        Ok(RawOrderBook {
            bids,
            asks,
            timestamp: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_config_base_url() {
        assert_eq!(BinanceConfig::new().rest_base_url(), MAINNET_REST_URL);
        assert_eq!(
            BinanceConfig::new().with_testnet(true).rest_base_url(),
            TESTNET_REST_URL
        );
        assert_eq!(
            BinanceConfig::new()
                .with_base_url("http://127.0.0.1:1234/")
                .rest_base_url(),
            "http://127.0.0.1:1234"
        );
    }

    #[test]
    fn test_config_debug_masks_api_key() {
        let config = BinanceConfig::new().with_api_key("abcd1234efgh5678");
        let debug = format!("{:?}", config);
        assert!(debug.contains("abcd...5678"));
        assert!(!debug.contains("abcd1234efgh5678"));
    }

    #[test]
    fn test_config_debug_masks_multibyte_api_key() {
        let config = BinanceConfig::new().with_api_key("키키키키abcdef키키");
        let debug = format!("{:?}", config);
        assert!(debug.contains("키키키키...ef키키"));
        assert!(!debug.contains("abcdef"));

        let short = BinanceConfig::new().with_api_key("키키키키키");
        assert!(format!("{:?}", short).contains("***REDACTED***"));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = BinanceConfig::new().with_api_key("  ");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_from_venue_config() {
        let venue = VenueConfig {
            sandbox: true,
            api_key: Some("key".to_string()),
            request_timeout_ms: 500,
            ..Default::default()
        };
        let config = BinanceConfig::from_venue_config(&venue);
        assert!(config.testnet);
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_base_url_fails_initialization() {
        let result = BinanceVenue::new(BinanceConfig::new().with_base_url("not a url"));
        assert!(matches!(result, Err(ExchangeError::Initialization(_))));
    }

    #[test]
    fn test_rate_limit_reset_hint() {
        let mut headers = HeaderMap::new();
        assert_eq!(rate_limit_reset_hint(&headers, 100), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(rate_limit_reset_hint(&headers, 100), Some(130));

        headers.insert(RATE_LIMIT_RESET_HEADER, HeaderValue::from_static("1700000000"));
        assert_eq!(rate_limit_reset_hint(&headers, 100), Some(1_700_000_000));
    }

    #[test]
    fn test_map_status() {
        let headers = HeaderMap::new();
        assert!(matches!(
            BinanceVenue::map_status(StatusCode::TOO_MANY_REQUESTS, &headers, ""),
            VenueError::RateLimitExceeded { reset_hint: None }
        ));
        assert!(matches!(
            BinanceVenue::map_status(StatusCode::IM_A_TEAPOT, &headers, ""),
            VenueError::RateLimitExceeded { .. }
        ));
        assert!(matches!(
            BinanceVenue::map_status(StatusCode::SERVICE_UNAVAILABLE, &headers, ""),
            VenueError::Unavailable(_)
        ));
        assert!(matches!(
            BinanceVenue::map_status(StatusCode::GATEWAY_TIMEOUT, &headers, ""),
            VenueError::RequestTimeout(_)
        ));
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::HTTP_VERSION_NOT_SUPPORTED,
        ] {
            assert!(matches!(
                BinanceVenue::map_status(status, &headers, "upstream error"),
                VenueError::Unavailable(_)
            ));
        }
        assert!(matches!(
            BinanceVenue::map_status(StatusCode::NOT_FOUND, &headers, ""),
            VenueError::Other(_)
        ));

        let body = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
        match BinanceVenue::map_status(StatusCode::BAD_REQUEST, &headers, body) {
            VenueError::Other(msg) => assert!(msg.contains("Invalid symbol.")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
