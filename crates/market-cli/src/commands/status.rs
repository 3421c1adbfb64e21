//! 저장된 거래소 상태 조회.

use anyhow::{bail, Result};
use market_core::FeedConfig;
use market_state::{StateStore, StatusRecord, WRITE_TIMESTAMP_FIELD};
use serde_json::json;

use super::open_store;

/// 저장소의 상태 레코드를 stdout에 JSON으로 출력합니다.
pub async fn run(config: &FeedConfig) -> Result<()> {
    let Some(store) = open_store(&config.store).await else {
        bail!("state store is not available (store.backend = {:?})", config.store.backend);
    };

    let venue_id = config.venue.id.trim().to_lowercase();
    let Some(fields) = store.load(&venue_id).await? else {
        println!("no status recorded for '{}' in {} store", venue_id, store.name());
        return Ok(());
    };

    let record = StatusRecord::from_fields(&fields)?;
    let output = json!({
        "venue": venue_id,
        "record": record,
        "updated_at": fields.get(WRITE_TIMESTAMP_FIELD),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
