//! 거래소 연결 상태.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 거래소 연결의 상위 수준 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// 정상 응답 중
    Connected,
    /// 아직 성공한 요청이 없음
    #[default]
    Disconnected,
    /// 요청 한도 초과로 쿨다운 중
    RateLimited,
    /// 거래소 점검/장애
    Maintenance,
}

impl ConnectionStatus {
    /// 저장소에 기록되는 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::RateLimited => "rate_limited",
            ConnectionStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "connected" => Ok(Self::Connected),
            "disconnected" => Ok(Self::Disconnected),
            "rate_limited" => Ok(Self::RateLimited),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(format!("Unknown connection status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_forms_agree() {
        for status in [
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
            ConnectionStatus::RateLimited,
            ConnectionStatus::Maintenance,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<ConnectionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_default_is_disconnected() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
        assert!("unknown".parse::<ConnectionStatus>().is_err());
    }
}
