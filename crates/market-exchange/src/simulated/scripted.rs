//! 스크립트 재생 거래소.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::VenueError;
use crate::traits::{RawOrderBook, VenueAdapter, VenueResult};

/// 정해진 응답을 순서대로 돌려주는 거래소.
///
/// 스크립트가 끝나면 반복 응답(`repeat_*`)을 돌려주고, 그것도 없으면
/// `VenueError::Other`를 반환합니다.
#[derive(Debug)]
pub struct ScriptedVenue {
    id: String,
    script: Mutex<VecDeque<VenueResult<RawOrderBook>>>,
    fallback: Option<VenueResult<RawOrderBook>>,
    latency: Duration,
    sandbox: bool,
    credentials: bool,
    calls: AtomicU32,
}

impl ScriptedVenue {
    /// 빈 스크립트로 생성합니다.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            latency: Duration::ZERO,
            sandbox: false,
            credentials: false,
            calls: AtomicU32::new(0),
        }
    }

    /// 다음 응답으로 호가창을 추가합니다.
    pub fn then_ok(self, book: RawOrderBook) -> Self {
        self.then(Ok(book))
    }

    /// 다음 응답으로 에러를 추가합니다.
    pub fn then_err(self, err: VenueError) -> Self {
        self.then(Err(err))
    }

    /// 다음 응답을 추가합니다.
    pub fn then(self, response: VenueResult<RawOrderBook>) -> Self {
        self.lock_script().push_back(response);
        self
    }

    /// 스크립트 소진 후 항상 이 호가창을 반환합니다.
    pub fn repeat_ok(mut self, book: RawOrderBook) -> Self {
        self.fallback = Some(Ok(book));
        self
    }

    /// 스크립트 소진 후 항상 이 에러를 반환합니다.
    pub fn repeat_err(mut self, err: VenueError) -> Self {
        self.fallback = Some(Err(err));
        self
    }

    /// 호출마다 지연을 추가합니다.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_credentials(mut self, credentials: bool) -> Self {
        self.credentials = credentials;
        self
    }

    /// 지금까지의 `fetch_order_book` 호출 횟수.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// 아직 재생되지 않은 응답 수.
    pub fn remaining(&self) -> usize {
        self.lock_script().len()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<VenueResult<RawOrderBook>>> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_response(&self) -> VenueResult<RawOrderBook> {
        self.lock_script()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Err(VenueError::Other("script exhausted".to_string())))
    }
}

#[async_trait]
impl VenueAdapter for ScriptedVenue {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    fn has_credentials(&self) -> bool {
        self.credentials
    }

    async fn fetch_order_book(&self, _symbol: &str, _depth: u32) -> VenueResult<RawOrderBook> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.next_response()
    }
}
