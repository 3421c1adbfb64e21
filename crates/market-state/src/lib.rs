//! 거래소 연결 상태의 외부 저장.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `StateStore` trait: 거래소 식별자를 키로 하는 병합(upsert-merge) 문서 저장소
//! - `StatusRecord`: 저장되는 상태 레코드
//! - 메모리 저장소 (테스트 및 단일 프로세스용)
//! - Redis 저장소

pub mod connect;
pub mod error;
pub mod memory;
pub mod record;
pub mod redis_store;
pub mod store;

pub use connect::connect_store;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStateStore;
pub use record::{StatusRecord, WRITE_TIMESTAMP_FIELD};
pub use redis_store::RedisStateStore;
pub use store::StateStore;
