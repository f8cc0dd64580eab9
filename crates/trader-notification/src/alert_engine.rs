//! RSI 알림 엔진.
//!
//! 확정 판독값마다 다음 순서로 처리합니다:
//! 1. TTL이 지난 레코드 제거
//! 2. 회복 임계값을 넘은 레코드를 리셋 표시
//! 3. 돌파 시 레코드 생성, 집계 또는 상향 교체
//!
//! 텔레그램 전송 여부는 알림 레코드와 별개인 `NotificationTracker`가 결정합니다.
//! 같은 레벨의 재돌파(집계)는 메시지를 다시 보내지 않습니다.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use trader_core::{AlertConfig, AlertRecord, AlertSide, AlertTier, IndicatorReading};

use crate::messages::{signal_message, warning_message};
use crate::types::{NotificationError, NotificationResult, NotificationSink};

/// 판독값 하나가 알림 레코드에 준 변화.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChange {
    /// 변화 없음 (잠정/미산출 판독값 포함)
    Unchanged,
    /// 새 레코드 생성
    Created,
    /// 같은 레벨 반복 돌파 집계
    Aggregated,
    /// 더 강한 레벨로 교체
    Upgraded,
    /// 회복으로 리셋 표시
    Reset,
}

/// 심볼별 전송 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    /// 경고 메시지를 보냄
    Warned(AlertSide),
    /// 신호 메시지를 보냄
    Signaled(AlertSide),
}

/// 보내야 할 메시지 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Warning(AlertSide),
    Signal(AlertSide),
}

/// 심볼별 전송 상태 맵.
#[derive(Debug, Default)]
pub struct NotificationTracker {
    states: HashMap<String, NotificationState>,
}

impl NotificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 판독값을 반영하고, 보내야 할 메시지가 있으면 반환합니다.
    pub fn observe(
        &mut self,
        config: &AlertConfig,
        symbol: &str,
        rsi: f64,
    ) -> Option<NotificationKind> {
        if let Some(state) = self.states.get(symbol).copied() {
            let (side, tier) = match state {
                NotificationState::Warned(side) => (side, AlertTier::Weak),
                NotificationState::Signaled(side) => (side, AlertTier::Strong),
            };
            let zone = match side {
                AlertSide::Oversold => &config.oversold,
                AlertSide::Overbought => &config.overbought,
            };
            if side.recovered(rsi, zone.notify_reset(tier)) {
                debug!(symbol, rsi, ?state, "전송 상태 리셋");
                self.states.remove(symbol);
            }
        }

        let (side, tier) = breach(config, rsi)?;
        let current = self.states.get(symbol).copied();
        let kind = match tier {
            AlertTier::Strong if current != Some(NotificationState::Signaled(side)) => {
                self.states
                    .insert(symbol.to_string(), NotificationState::Signaled(side));
                NotificationKind::Signal(side)
            }
            AlertTier::Weak if current.is_none() => {
                self.states
                    .insert(symbol.to_string(), NotificationState::Warned(side));
                NotificationKind::Warning(side)
            }
            _ => return None,
        };
        Some(kind)
    }

    /// 심볼의 현재 전송 상태.
    pub fn state(&self, symbol: &str) -> Option<NotificationState> {
        self.states.get(symbol).copied()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

/// 활성 구간 중 RSI가 돌파한 가장 강한 (방향, 강도).
fn breach(config: &AlertConfig, rsi: f64) -> Option<(AlertSide, AlertTier)> {
    [AlertSide::Oversold, AlertSide::Overbought]
        .into_iter()
        .find_map(|side| {
            config
                .zone(side)
                .and_then(|zone| zone.breach(side, rsi))
                .map(|tier| (side, tier))
        })
}

/// RSI 알림 엔진.
pub struct AlertEngine {
    config: AlertConfig,
    records: HashMap<String, AlertRecord>,
    tracker: NotificationTracker,
    sink: Box<dyn NotificationSink>,
}

impl AlertEngine {
    /// 검증된 설정과 sink로 엔진을 생성합니다.
    pub fn new(config: AlertConfig, sink: Box<dyn NotificationSink>) -> NotificationResult<Self> {
        config
            .validate()
            .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            config,
            records: HashMap::new(),
            tracker: NotificationTracker::new(),
            sink,
        })
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// 확정 판독값을 처리합니다.
    ///
    /// 잠정 판독값이나 RSI가 없는 판독값은 무시합니다.
    pub fn on_reading(&mut self, reading: &IndicatorReading) -> AlertChange {
        let rsi = match reading.rsi {
            Some(rsi) if !reading.provisional => rsi,
            _ => return AlertChange::Unchanged,
        };
        let now = reading.timestamp;
        let symbol = reading.symbol.as_str();

        self.purge_expired(now);
        let mut change = self.apply_reset(symbol, rsi);
        if let Some((side, tier)) = breach(&self.config, rsi) {
            change = self.apply_breach(reading, side, tier, rsi);
        }

        if let Some(kind) = self.tracker.observe(&self.config, symbol, rsi) {
            let message = match kind {
                NotificationKind::Signal(side) => signal_message(side, symbol, reading.price, rsi),
                NotificationKind::Warning(side) => {
                    warning_message(side, symbol, reading.price, rsi)
                }
            };
            info!(symbol, rsi, ?kind, "알림 전송");
            if let Err(e) = self.sink.notify(&message) {
                warn!(symbol, error = %e, "알림 sink 실패, 무시");
            }
        }
        change
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.config.ttl();
        self.records.retain(|symbol, record| {
            let keep = !record.is_expired(now, ttl);
            if !keep {
                debug!(symbol = %symbol, id = %record.id, "만료된 알림 제거");
            }
            keep
        });
    }

    fn apply_reset(&mut self, symbol: &str, rsi: f64) -> AlertChange {
        let Some(record) = self.records.get_mut(symbol) else {
            return AlertChange::Unchanged;
        };
        if record.is_reset {
            return AlertChange::Unchanged;
        }
        let zone = match record.side {
            AlertSide::Oversold => &self.config.oversold,
            AlertSide::Overbought => &self.config.overbought,
        };
        if record.side.recovered(rsi, zone.recovery(record.tier)) {
            record.is_reset = true;
            debug!(symbol, rsi, level = record.level, "알림 리셋");
            AlertChange::Reset
        } else {
            AlertChange::Unchanged
        }
    }

    fn apply_breach(
        &mut self,
        reading: &IndicatorReading,
        side: AlertSide,
        tier: AlertTier,
        rsi: f64,
    ) -> AlertChange {
        let symbol = reading.symbol.as_str();
        let now = reading.timestamp;

        let change = match self.records.get_mut(symbol) {
            Some(record) if !record.is_reset && record.side == side => {
                if tier == record.tier {
                    record.aggregate(rsi, reading.price, now);
                    debug!(symbol, rsi, count = record.count, "알림 집계");
                    return AlertChange::Aggregated;
                }
                if tier < record.tier {
                    return AlertChange::Unchanged;
                }
                AlertChange::Upgraded
            }
            _ => AlertChange::Created,
        };

        let level = match side {
            AlertSide::Oversold => self.config.oversold.level(tier),
            AlertSide::Overbought => self.config.overbought.level(tier),
        };
        let record = AlertRecord::new(symbol, side, tier, level, rsi, reading.price, now);
        info!(symbol, rsi, %side, %tier, level, ?change, "알림 레코드 생성");
        self.records.insert(symbol.to_string(), record);
        change
    }

    /// 심볼의 레코드 (리셋 포함, 만료 제외).
    pub fn record(&self, symbol: &str, now: DateTime<Utc>) -> Option<&AlertRecord> {
        let ttl = self.config.ttl();
        self.records
            .get(symbol)
            .filter(|record| !record.is_expired(now, ttl))
    }

    /// 리셋되지 않은 활성 레코드.
    pub fn active_alert(&self, symbol: &str, now: DateTime<Utc>) -> Option<&AlertRecord> {
        let ttl = self.config.ttl();
        self.records
            .get(symbol)
            .filter(|record| record.is_active(now, ttl))
    }

    /// 약한 레벨 레코드 (최근 돌파 순).
    pub fn weak_alerts(&self, now: DateTime<Utc>) -> Vec<&AlertRecord> {
        self.alerts_by_tier(AlertTier::Weak, now)
    }

    /// 강한 레벨 레코드 (최근 돌파 순).
    pub fn strong_alerts(&self, now: DateTime<Utc>) -> Vec<&AlertRecord> {
        self.alerts_by_tier(AlertTier::Strong, now)
    }

    fn alerts_by_tier(&self, tier: AlertTier, now: DateTime<Utc>) -> Vec<&AlertRecord> {
        let ttl = self.config.ttl();
        let mut alerts: Vec<&AlertRecord> = self
            .records
            .values()
            .filter(|r| r.tier == tier && !r.is_expired(now, ttl))
            .collect();
        alerts.sort_by(|a, b| b.last_triggered_at.cmp(&a.last_triggered_at));
        alerts
    }

    /// 심볼의 전송 상태.
    pub fn notification_state(&self, symbol: &str) -> Option<NotificationState> {
        self.tracker.state(symbol)
    }

    /// 전송 상태를 모두 지웁니다. 재시드 후 호출합니다.
    pub fn reset_notifications(&mut self) {
        self.tracker.clear();
    }
}
