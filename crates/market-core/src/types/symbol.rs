//! 심볼 정규화.
//!
//! 호출자는 통합 형식(`BTC/USDT`)을 사용하고, 거래소 커넥터는
//! 각자의 형식(`BTCUSDT` 등)으로 변환합니다.

/// 구분자 없는 거래소 심볼로 변환합니다 ("BTC/USDT" -> "BTCUSDT").
///
/// 이미 구분자가 없는 심볼은 대문자로만 바꿔 그대로 반환합니다.
pub fn compact_symbol(symbol: &str) -> String {
    symbol
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_'))
        .collect::<String>()
        .to_uppercase()
}
