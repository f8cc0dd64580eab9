//! RSI 알림 레코드.
//!
//! 알림 레코드는 심볼당 최대 하나만 활성 상태로 유지됩니다.
//! 같은 레벨의 반복 돌파는 새 레코드를 만들지 않고 `count`를 올리며,
//! 더 강한 레벨 돌파는 기존 레코드를 교체합니다.
//!
//! 상태 전이 규칙 자체는 `trader-notification`의 `AlertEngine`에 있습니다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 알림 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSide {
    /// 과매도 (RSI ≤ 레벨)
    Oversold,
    /// 과매수 (RSI ≥ 레벨)
    Overbought,
}

impl AlertSide {
    /// RSI가 주어진 레벨을 돌파했는지 확인합니다.
    pub fn breaches(&self, rsi: f64, level: f64) -> bool {
        match self {
            AlertSide::Oversold => rsi <= level,
            AlertSide::Overbought => rsi >= level,
        }
    }

    /// RSI가 회복 임계값을 넘어 중립 쪽으로 돌아왔는지 확인합니다.
    pub fn recovered(&self, rsi: f64, threshold: f64) -> bool {
        match self {
            AlertSide::Oversold => rsi > threshold,
            AlertSide::Overbought => rsi < threshold,
        }
    }
}

impl fmt::Display for AlertSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSide::Oversold => write!(f, "oversold"),
            AlertSide::Overbought => write!(f, "overbought"),
        }
    }
}

/// 알림 강도.
///
/// `Strong`이 `Weak`보다 크게 정렬됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    /// 경고 레벨 (예: RSI 30)
    Weak,
    /// 신호 레벨 (예: RSI 25)
    Strong,
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertTier::Weak => write!(f, "weak"),
            AlertTier::Strong => write!(f, "strong"),
        }
    }
}

/// 집계된 알림 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// 레코드 ID
    pub id: Uuid,
    /// 심볼
    pub symbol: String,
    /// 마지막 돌파 시 RSI
    pub rsi: f64,
    /// 마지막 돌파 시 가격
    pub price: f64,
    /// 방향
    pub side: AlertSide,
    /// 강도
    pub tier: AlertTier,
    /// 돌파한 임계값
    pub level: f64,
    /// 생성 시각 (TTL 기준)
    pub created_at: DateTime<Utc>,
    /// 마지막 돌파 시각
    pub last_triggered_at: DateTime<Utc>,
    /// 누적 돌파 횟수
    pub count: u32,
    /// 회복 임계값을 넘어 리셋되었는지 여부
    pub is_reset: bool,
}

impl AlertRecord {
    /// 첫 돌파로 새 레코드를 생성합니다.
    pub fn new(
        symbol: impl Into<String>,
        side: AlertSide,
        tier: AlertTier,
        level: f64,
        rsi: f64,
        price: f64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            rsi,
            price,
            side,
            tier,
            level,
            created_at: at,
            last_triggered_at: at,
            count: 1,
            is_reset: false,
        }
    }

    /// 같은 레벨의 반복 돌파를 집계합니다.
    pub fn aggregate(&mut self, rsi: f64, price: f64, at: DateTime<Utc>) {
        self.count += 1;
        self.rsi = rsi;
        self.price = price;
        self.last_triggered_at = at;
    }

    /// 생성 후 TTL이 지났는지 확인합니다.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }

    /// 만료되지 않았고 리셋되지 않은 레코드인지 확인합니다.
    pub fn is_active(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.is_reset && !self.is_expired(now, ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_side_breach_and_recovery() {
        assert!(AlertSide::Oversold.breaches(25.0, 25.0));
        assert!(!AlertSide::Oversold.breaches(25.1, 25.0));
        assert!(AlertSide::Overbought.breaches(75.0, 75.0));

        assert!(AlertSide::Oversold.recovered(40.1, 40.0));
        assert!(!AlertSide::Oversold.recovered(40.0, 40.0));
        assert!(AlertSide::Overbought.recovered(59.9, 60.0));
    }

    #[test]
    fn test_tier_ordering() {
        assert!(AlertTier::Strong > AlertTier::Weak);
    }

    #[test]
    fn test_aggregate_keeps_identity() {
        let mut record = AlertRecord::new(
            "BTCUSDT",
            AlertSide::Oversold,
            AlertTier::Weak,
            30.0,
            29.0,
            50000.0,
            at(0),
        );
        let id = record.id;

        record.aggregate(28.5, 49800.0, at(1));

        assert_eq!(record.id, id);
        assert_eq!(record.count, 2);
        assert_eq!(record.created_at, at(0));
        assert_eq!(record.last_triggered_at, at(1));
        assert_eq!(record.rsi, 28.5);
    }

    #[test]
    fn test_expiration_is_measured_from_creation() {
        let mut record = AlertRecord::new(
            "ETHUSDT",
            AlertSide::Oversold,
            AlertTier::Strong,
            25.0,
            24.0,
            3000.0,
            at(0),
        );
        record.aggregate(23.0, 2990.0, at(20));

        let ttl = Duration::hours(24);
        assert!(record.is_active(at(23), ttl));
        assert!(record.is_expired(at(0) + ttl, ttl));
    }
}
