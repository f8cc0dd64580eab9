//! 저장소 스냅샷.

use serde::{Deserialize, Serialize};

use super::ledger::Deposit;
use super::position::Position;
use super::settings::AutoTraderSettings;

/// 자동 매매 엔진을 재구성하는 데 필요한 영속 상태.
///
/// 트리거 상태는 포함되지 않으며 재시작 시 항상 `Idle`에서 시작합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingSnapshot {
    #[serde(default)]
    pub trades: Vec<Position>,
    #[serde(default)]
    pub deposits: Vec<Deposit>,
    /// 저장된 설정 (없으면 설정 파일의 초기값 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AutoTraderSettings>,
}

impl TradingSnapshot {
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty() && self.deposits.is_empty() && self.settings.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_dates_serialize_as_iso8601() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let snapshot = TradingSnapshot {
            deposits: vec![Deposit::new(dec!(1000), at)],
            ..Default::default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"2024-06-01T09:30:00Z\""));

        let parsed: TradingSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.deposits[0].created_at, at);
    }

    #[test]
    fn test_missing_fields_default() {
        let parsed: TradingSnapshot = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }
}
