//! 제한된 재시도로 호가창을 조회하는 페처.
//!
//! 한 번의 조회는 다음 순서로 진행됩니다:
//!
//! 1. 쿨다운이 끝났으면 해제하고, 아직 쿨다운 중이면 남은 시간만큼 한 번 대기
//! 2. 최대 `max_attempts`번 거래소를 호출하고 결과를 [`FetchOutcome`]으로 분류
//! 3. 분류에 따라 상태를 갱신하고, 상태가 바뀌었으면 저장소에 미러링
//! 4. 원인별 대기 후 다음 시도, 성공하면 즉시 반환
//!
//! 여러 조회가 같은 페처를 동시에 사용할 수 있습니다. 상태 변경은 짧은
//! 임계 구역 안에서만 일어나며 `.await` 동안 잠금을 잡지 않습니다.
//! 저장소 기록은 임계 구역 안에서 순번을 받고, 쓰기 시점에 더 새로운
//! 기록이 이미 나갔다면 버려지므로 저장소가 과거 상태로 되돌아가지 않습니다.

use chrono::Utc;
use market_core::{fetch_span, OrderBookSnapshot};
use market_state::{StateStore, StatusRecord, StoreError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn, Instrument};

use crate::connection::ConnectionState;
use crate::error::{FailureKind, FetchError};
use crate::outcome::FetchOutcome;
use crate::retry::RetryPolicy;
use crate::traits::VenueAdapter;

/// 원인별 백오프를 적용하는 호가창 페처.
///
/// # Example
///
/// ```ignore
/// let fetcher = ResilientFetcher::new("binance", adapter, Some(store), RetryPolicy::default());
/// fetcher.sync_state().await;
///
/// let book = fetcher.fetch_order_book("BTC/USDT", 10).await?;
/// println!("best bid: {:?}", book.best_bid());
/// ```
pub struct ResilientFetcher {
    /// 저장소 키로도 쓰이는 거래소 식별자
    venue_id: String,
    adapter: Arc<dyn VenueAdapter>,
    store: Option<Arc<dyn StateStore>>,
    policy: RetryPolicy,
    state: Mutex<ConnectionState>,
    /// 상태 기록 순번 (상태 잠금 안에서 증가)
    revision: AtomicU64,
    /// 마지막으로 저장소에 보낸 순번
    persisted_revision: AsyncMutex<u64>,
}

/// 상태 잠금 안에서 만든 저장용 기록.
struct Captured {
    revision: u64,
    record: StatusRecord,
}

impl ResilientFetcher {
    /// 새 페처 생성. 상태는 `Disconnected`에서 시작합니다.
    pub fn new(
        venue_id: impl Into<String>,
        adapter: Arc<dyn VenueAdapter>,
        store: Option<Arc<dyn StateStore>>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            venue_id: venue_id.into(),
            adapter,
            store,
            policy,
            state: Mutex::new(ConnectionState::new()),
            revision: AtomicU64::new(0),
            persisted_revision: AsyncMutex::new(0),
        }
    }

    /// 거래소 식별자 반환.
    pub fn venue_id(&self) -> &str {
        &self.venue_id
    }

    /// 재시도 정책 반환.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 현재 연결 상태의 복사본.
    pub fn state(&self) -> ConnectionState {
        self.with_state(|state| state.clone())
    }

    /// 저장소에 기록되는 형태의 현재 상태.
    pub fn status_record(&self) -> StatusRecord {
        self.with_state(|state| self.record_for(state))
    }

    /// 현재 상태를 저장소에 기록합니다 (실패는 로그만 남김).
    pub async fn sync_state(&self) {
        let captured = self.with_state(|state| self.capture(state));
        self.persist(captured).await;
    }

    /// 기본 시도 횟수로 호가창을 조회합니다.
    pub async fn fetch_order_book(
        &self,
        symbol: &str,
        depth: u32,
    ) -> Result<OrderBookSnapshot, FetchError> {
        self.fetch_order_book_with_attempts(symbol, depth, self.policy.max_attempts)
            .await
    }

    /// 최대 `max_attempts`번 시도하여 호가창을 조회합니다.
    ///
    /// 시도별 실패는 모두 내부에서 흡수되며, 시도 횟수를 소진하면
    /// 마지막 실패 분류를 담은 [`FetchError::Exhausted`]를 반환합니다.
    pub async fn fetch_order_book_with_attempts(
        &self,
        symbol: &str,
        depth: u32,
        max_attempts: u32,
    ) -> Result<OrderBookSnapshot, FetchError> {
        if symbol.trim().is_empty() {
            return Err(FetchError::InvalidRequest(
                "symbol must not be empty".to_string(),
            ));
        }
        if depth == 0 {
            return Err(FetchError::InvalidRequest(
                "depth must be positive".to_string(),
            ));
        }
        if max_attempts == 0 {
            return Err(FetchError::InvalidRequest(
                "max_attempts must be positive".to_string(),
            ));
        }

        let span = fetch_span!("fetch_order_book", self.venue_id, symbol, depth);
        self.run_attempts(symbol, depth, max_attempts)
            .instrument(span)
            .await
    }

    async fn run_attempts(
        &self,
        symbol: &str,
        depth: u32,
        max_attempts: u32,
    ) -> Result<OrderBookSnapshot, FetchError> {
        self.wait_out_cool_down().await;

        let mut last_failure = (FailureKind::Unknown, String::new());

        for attempt in 0..max_attempts {
            let result = self.adapter.fetch_order_book(symbol, depth).await;
            let now = Utc::now();

            let outcome = FetchOutcome::classify(symbol, result, now.timestamp_millis());
            let kind = outcome.failure_kind();

            let (detail, record) = match outcome {
                FetchOutcome::Success(snapshot) => {
                    let record = self.with_state(|state| {
                        state.record_success();
                        self.capture(state)
                    });
                    debug!(
                        attempt = attempt + 1,
                        bids = snapshot.bids.len(),
                        asks = snapshot.asks.len(),
                        "호가창 조회 성공"
                    );
                    self.persist(record).await;
                    return Ok(snapshot);
                }
                FetchOutcome::RateLimited { reset_hint } => {
                    let reset_at = self.policy.resolve_reset_at(reset_hint, now);
                    let record = self.with_state(|state| {
                        state.record_rate_limit(reset_at);
                        self.capture(state)
                    });
                    warn!(attempt = attempt + 1, %reset_at, "Rate limit exceeded");
                    (format!("rate limited until {}", reset_at), Some(record))
                }
                FetchOutcome::Timeout(detail) => {
                    self.with_state(ConnectionState::record_transient_failure);
                    warn!(attempt = attempt + 1, %detail, "Request timeout");
                    (detail, None)
                }
                FetchOutcome::Unavailable(detail) => {
                    let record = self.with_state(|state| {
                        state.record_maintenance();
                        self.capture(state)
                    });
                    warn!(attempt = attempt + 1, %detail, "거래소 점검/장애");
                    (detail, Some(record))
                }
                FetchOutcome::Malformed(detail) => {
                    self.with_state(ConnectionState::record_transient_failure);
                    warn!(attempt = attempt + 1, %detail, "잘못된 호가창 응답");
                    (detail, None)
                }
                FetchOutcome::Unknown(detail) => {
                    self.with_state(ConnectionState::record_transient_failure);
                    error!(attempt = attempt + 1, %detail, "호가창 조회 실패");
                    (detail, None)
                }
            };
            // 성공은 위에서 반환되므로 여기서는 항상 Some
            let kind = kind.unwrap_or(FailureKind::Unknown);

            if let Some(record) = record {
                self.persist(record).await;
            }

            let is_last = attempt + 1 == max_attempts;
            let delay = self.policy.delay_for(kind, attempt);
            last_failure = (kind, detail);

            if !is_last && !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, "재시도 대기");
                tokio::time::sleep(delay).await;
            }
        }

        let (reason, detail) = last_failure;
        error!(
            attempts = max_attempts,
            %reason,
            failures = self.state().consecutive_failures(),
            "호가창 조회 재시도 소진"
        );
        Err(FetchError::Exhausted {
            reason,
            attempts: max_attempts,
            detail,
        })
    }

    /// 쿨다운이 남아 있으면 한 번만 대기합니다.
    ///
    /// 대기 후에도 거래소가 요청을 받아준다는 보장은 없습니다.
    async fn wait_out_cool_down(&self) {
        let now = Utc::now();
        let (cleared, remaining) = self.with_state(|state| {
            let cleared = state.clear_cool_down_if_expired(now);
            (cleared.then(|| self.capture(state)), state.remaining_cool_down(now))
        });

        if let Some(record) = cleared {
            info!("요청 한도 쿨다운 종료");
            self.persist(record).await;
        }

        let Some(wait) = remaining else {
            return;
        };

        warn!(wait_ms = wait.as_millis() as u64, "Rate limited, waiting for cool-down");
        tokio::time::sleep(wait).await;

        let now = Utc::now();
        let cleared = self.with_state(|state| {
            state
                .clear_cool_down_if_expired(now)
                .then(|| self.capture(state))
        });
        if let Some(record) = cleared {
            info!("요청 한도 쿨다운 종료");
            self.persist(record).await;
        }
    }

    /// 상태를 저장소에 미러링합니다. 실패는 전파하지 않습니다.
    ///
    /// 쓰기는 한 번에 하나씩 진행되며, 이미 더 새로운 기록을 쓴 뒤에
    /// 도착한 오래된 기록은 버립니다.
    async fn persist(&self, captured: Captured) {
        let Some(store) = &self.store else {
            return;
        };
        let Captured { revision, record } = captured;

        let mut persisted = self.persisted_revision.lock().await;
        if revision <= *persisted {
            debug!(revision, latest = *persisted, "오래된 상태 기록 건너뜀");
            return;
        }
        *persisted = revision;

        let fields = match record.to_fields() {
            Ok(fields) => fields,
            Err(e) => {
                warn!(error = %e, "State persistence failed");
                return;
            }
        };

        let write = store.upsert_merge(&self.venue_id, fields);
        let result = match tokio::time::timeout(self.policy.persist_timeout, write).await {
            Ok(result) => result,
            Err(elapsed) => Err(StoreError::from(elapsed)),
        };

        match result {
            Ok(()) => debug!(store = store.name(), status = %record.status, "상태 저장 완료"),
            Err(e) => warn!(store = store.name(), error = %e, "State persistence failed"),
        }
    }

    /// 상태 잠금 안에서만 호출합니다. 순번은 상태 변경 순서를 따릅니다.
    fn capture(&self, state: &ConnectionState) -> Captured {
        Captured {
            revision: self.revision.fetch_add(1, Ordering::Relaxed) + 1,
            record: self.record_for(state),
        }
    }

    fn record_for(&self, state: &ConnectionState) -> StatusRecord {
        StatusRecord {
            status: state.status(),
            reconnect_attempts: state.consecutive_failures(),
            rate_limit_reset_at: state.rate_limit_reset_at().map(|t| t.timestamp_millis()),
            sandbox: self.adapter.is_sandbox(),
            has_credentials: self.adapter.has_credentials(),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ConnectionState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl std::fmt::Debug for ResilientFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientFetcher")
            .field("venue_id", &self.venue_id)
            .field("adapter", &self.adapter.id())
            .field("store", &self.store.as_ref().map(|s| s.name().to_string()))
            .field("policy", &self.policy)
            .field("state", &self.state())
            .finish()
    }
}
