//! RSI 기반 모의 자동 매매 엔진.
//!
//! 심볼마다 `Idle`/`Triggered` 트리거 상태를 두고, 판독값 하나를 다음 순서로
//! 끝까지 처리합니다:
//!
//! 1. 해당 심볼의 오픈 포지션 청산 판정 (익절 우선) 및 자본 반환
//! 2. RSI가 회복 임계값을 넘으면 트리거를 `Idle`로 리셋
//! 3. `Idle` 상태에서 RSI가 진입 임계값 이하이면 진입 (자본이 없으면 `Missed`)
//!
//! 같은 판독값으로 연 포지션은 그 판독값에서 청산 판정을 받지 않습니다.
//! 엔진은 내부 잠금이 없는 `&mut self` 상태 머신이며, 호출자가 이벤트를 직렬화합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use trader_core::{
    capital_allocation, derive_stats, period_stats, price_from_f64, AutoTraderConfig,
    AutoTraderSettings, CapitalAllocation, CapitalLedger, Deposit, IndicatorReading, PeriodStats,
    PortfolioStats, Position, RiskConfig, TradingSnapshot,
};
use trader_risk::{PositionSizer, SizingDecision, StopOrderGenerator};

use crate::error::{ExecutionError, ExecutionResult};

/// 심볼별 진입 트리거 상태.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    /// 진입 대기
    #[default]
    Idle,
    /// 진입 완료, 회복 전까지 재진입 없음
    Triggered,
}

/// 엔진 상태 변경 결과. 저장소 기록과 알림에 사용됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TradeEvent {
    /// 포지션 진입
    Opened(Position),
    /// 자본 부족으로 진입 실패
    Missed(Position),
    /// 익절/손절 청산 (청산 후 상태)
    Closed(Position),
    /// 입금 또는 자본 재조정
    Deposited(Deposit),
    /// 설정 변경
    SettingsChanged(AutoTraderSettings),
}

impl TradeEvent {
    /// 이벤트에 포함된 포지션.
    pub fn position(&self) -> Option<&Position> {
        match self {
            TradeEvent::Opened(p) | TradeEvent::Missed(p) | TradeEvent::Closed(p) => Some(p),
            _ => None,
        }
    }
}

/// 모의 자동 매매 엔진.
#[derive(Debug)]
pub struct AutoTrader {
    config: AutoTraderConfig,
    sizer: PositionSizer,
    stops: StopOrderGenerator,
    settings: AutoTraderSettings,
    ledger: CapitalLedger,
    positions: Vec<Position>,
    deposits: Vec<Deposit>,
    triggers: HashMap<String, TriggerState>,
}

impl AutoTrader {
    /// 엔진을 생성합니다. 초기 설정은 `config.settings`이며,
    /// 장부는 `settings.capital`만큼의 초기 입금으로 시작합니다.
    pub fn new(config: AutoTraderConfig, risk: RiskConfig) -> ExecutionResult<Self> {
        config
            .validate()
            .map_err(|e| ExecutionError::InvalidSettings(e.to_string()))?;
        risk.validate()
            .map_err(|e| ExecutionError::InvalidSettings(e.to_string()))?;

        let mut trader = Self {
            settings: config.settings.clone(),
            config,
            sizer: PositionSizer::new(),
            stops: StopOrderGenerator::new(risk),
            ledger: CapitalLedger::new(),
            positions: Vec::new(),
            deposits: Vec::new(),
            triggers: HashMap::new(),
        };
        trader.seed_capital(Utc::now());
        Ok(trader)
    }

    /// 입금 기록이 없으면 `settings.capital`을 초기 입금으로 기록합니다.
    ///
    /// capital이 0이거나 이미 입금 기록이 있으면 아무것도 하지 않습니다.
    fn seed_capital(&mut self, at: DateTime<Utc>) -> Option<Deposit> {
        let capital = self.settings.capital;
        if !self.deposits.is_empty() || capital <= Decimal::ZERO {
            return None;
        }
        self.ledger.deposit(capital).ok()?;
        let deposit = Deposit::new(capital, at);
        self.deposits.push(deposit.clone());
        info!(capital = %capital, "초기 자본 입금");
        Some(deposit)
    }

    /// 저장된 스냅샷으로 상태를 재구성합니다.
    ///
    /// 장부는 포지션과 입금 기록에서 다시 계산되고, 트리거 상태는 모두 `Idle`이 됩니다.
    /// 입금 기록이 없는 스냅샷이면 `settings.capital`로 장부를 시작하고,
    /// 그 초기 입금을 `Deposited` 이벤트로 반환합니다 (저장 대상).
    pub fn restore(&mut self, snapshot: TradingSnapshot) -> ExecutionResult<Vec<TradeEvent>> {
        let settings = snapshot
            .settings
            .unwrap_or_else(|| self.config.settings.clone());
        settings
            .validate()
            .map_err(|e| ExecutionError::InvalidSettings(e.to_string()))?;

        self.ledger = CapitalLedger::from_history(&snapshot.trades, &snapshot.deposits);
        self.positions = snapshot.trades;
        self.deposits = snapshot.deposits;
        self.settings = settings;
        self.triggers.clear();

        let events: Vec<TradeEvent> = self
            .seed_capital(Utc::now())
            .map(TradeEvent::Deposited)
            .into_iter()
            .collect();

        info!(
            trades = self.positions.len(),
            deposits = self.deposits.len(),
            available = %self.ledger.available,
            "자동 매매 상태 복원"
        );
        Ok(events)
    }

    /// 판독값 하나를 처리하고 발생한 이벤트를 반환합니다.
    ///
    /// 가격이 유효하지 않으면 `InvalidInput`을 반환하며 아무것도 변경하지 않습니다.
    /// RSI가 없으면 청산 판정만 수행합니다.
    pub fn on_reading(&mut self, reading: &IndicatorReading) -> ExecutionResult<Vec<TradeEvent>> {
        let price = price_from_f64(reading.price)?;
        let symbol = reading.symbol.as_str();
        let at = reading.timestamp;

        let mut events = self.check_exits(symbol, price, at);

        let Some(rsi) = reading.rsi else {
            return Ok(events);
        };

        let state = self.trigger_state(symbol);
        if state == TriggerState::Triggered && rsi > self.config.recovery_threshold {
            debug!(symbol, rsi, "트리거 리셋");
            self.triggers.insert(symbol.to_string(), TriggerState::Idle);
        }

        if self.settings.is_active
            && self.trigger_state(symbol) == TriggerState::Idle
            && rsi <= self.config.entry_threshold
        {
            events.push(self.enter(symbol, price, rsi, at)?);
        }

        Ok(events)
    }

    /// 오픈 포지션의 청산 판정. 익절이 손절보다 우선합니다.
    fn check_exits(&mut self, symbol: &str, price: Decimal, at: DateTime<Utc>) -> Vec<TradeEvent> {
        let mut events = Vec::new();
        for position in self
            .positions
            .iter_mut()
            .filter(|p| p.is_open() && p.symbol == symbol)
        {
            let Some(reason) = self.stops.check_exit(position, price) else {
                continue;
            };
            let invested = position.invested_amount;
            if let Some(profit) = position.close(reason.status(), price, at) {
                self.ledger.close(invested, profit);
                info!(
                    symbol,
                    position_id = %position.id,
                    status = %position.status,
                    close_price = %price,
                    profit = %profit,
                    "포지션 청산"
                );
                events.push(TradeEvent::Closed(position.clone()));
            }
        }
        events
    }

    fn enter(
        &mut self,
        symbol: &str,
        price: Decimal,
        rsi: f64,
        at: DateTime<Utc>,
    ) -> ExecutionResult<TradeEvent> {
        let levels = self.stops.exit_levels(price);
        let decision = self
            .sizer
            .size(self.ledger.available, self.settings.risk_percent, price);

        let event = match decision {
            SizingDecision::Open { invested, quantity } => {
                self.ledger.open(invested)?;
                let position = Position::open(
                    symbol,
                    price,
                    levels.take_profit,
                    levels.stop_loss,
                    quantity,
                    invested,
                    at,
                );
                info!(
                    symbol,
                    rsi,
                    entry_price = %price,
                    invested = %invested,
                    quantity = %quantity,
                    take_profit = %levels.take_profit,
                    stop_loss = %levels.stop_loss,
                    "포지션 진입"
                );
                self.positions.push(position.clone());
                TradeEvent::Opened(position)
            }
            SizingDecision::Missed => {
                let position =
                    Position::missed(symbol, price, levels.take_profit, levels.stop_loss, at);
                warn!(symbol, rsi, available = %self.ledger.available, "가용 자본 없음, 진입 실패");
                self.positions.push(position.clone());
                TradeEvent::Missed(position)
            }
        };

        self.triggers.insert(symbol.to_string(), TriggerState::Triggered);
        Ok(event)
    }

    /// 입금합니다. 0 이하 금액은 `InvalidInput`입니다.
    pub fn deposit(&mut self, amount: Decimal) -> ExecutionResult<TradeEvent> {
        self.deposit_at(amount, Utc::now())
    }

    /// `deposit`과 같지만 기록 시각을 지정합니다.
    pub fn deposit_at(&mut self, amount: Decimal, at: DateTime<Utc>) -> ExecutionResult<TradeEvent> {
        self.ledger.deposit(amount)?;
        let deposit = Deposit::new(amount, at);
        self.deposits.push(deposit.clone());
        info!(amount = %amount, available = %self.ledger.available, "입금");
        Ok(TradeEvent::Deposited(deposit))
    }

    /// 설정을 변경합니다.
    ///
    /// `reset_capital_on_settings_change`가 켜져 있고 `capital`이 바뀌면 가용 자본을
    /// 새 capital로 재조정하고 그 차액을 `Adjustment` 입금으로 기록합니다.
    pub fn update_settings(&mut self, settings: AutoTraderSettings) -> ExecutionResult<Vec<TradeEvent>> {
        settings
            .validate()
            .map_err(|e| ExecutionError::InvalidSettings(e.to_string()))?;

        let mut events = Vec::new();
        if self.config.reset_capital_on_settings_change && settings.capital != self.settings.capital {
            let delta = self.ledger.rebase(settings.capital);
            if !delta.is_zero() {
                let adjustment = Deposit::adjustment(delta, Utc::now());
                self.deposits.push(adjustment.clone());
                info!(delta = %delta, available = %self.ledger.available, "자본 재조정");
                events.push(TradeEvent::Deposited(adjustment));
            }
        }

        info!(
            capital = %settings.capital,
            risk_percent = settings.risk_percent,
            is_active = settings.is_active,
            "자동 매매 설정 변경"
        );
        self.settings = settings.clone();
        events.push(TradeEvent::SettingsChanged(settings));
        Ok(events)
    }

    /// 모든 심볼의 트리거를 `Idle`로 되돌립니다 (재시드 시 사용).
    pub fn reset_triggers(&mut self) {
        self.triggers.clear();
    }

    pub fn trigger_state(&self, symbol: &str) -> TriggerState {
        self.triggers.get(symbol).copied().unwrap_or_default()
    }

    pub fn settings(&self) -> &AutoTraderSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &CapitalLedger {
        &self.ledger
    }

    /// 모든 포지션 (진입 순).
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// 오픈 포지션.
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_open())
    }

    pub fn deposits(&self) -> &[Deposit] {
        &self.deposits
    }

    /// 포트폴리오 통계.
    pub fn stats(&self) -> PortfolioStats {
        derive_stats(&self.positions, &self.deposits)
    }

    /// 심볼별 자본 배분.
    pub fn allocation(&self) -> CapitalAllocation {
        capital_allocation(&self.positions, &self.deposits)
    }

    /// 기간별 실현 손익.
    pub fn period_stats(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> PeriodStats {
        period_stats(&self.positions, from, to)
    }

    /// 장부 불변식을 검사합니다.
    pub fn check_invariant(&self) -> ExecutionResult<()> {
        self.ledger
            .check_invariant(&self.positions)
            .map_err(|e| ExecutionError::LedgerInvariant(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trader_core::PositionStatus;

    fn trader() -> AutoTrader {
        let config = AutoTraderConfig {
            settings: AutoTraderSettings {
                is_active: true,
                ..Default::default()
            },
            ..Default::default()
        };
        AutoTrader::new(config, RiskConfig::default()).unwrap()
    }

    fn reading(symbol: &str, price: f64, rsi: Option<f64>) -> IndicatorReading {
        IndicatorReading::new(symbol, price, rsi, Utc::now())
    }

    #[test]
    fn test_new_rejects_overlapping_thresholds() {
        let config = AutoTraderConfig {
            entry_threshold: 30.0,
            recovery_threshold: 25.0,
            ..Default::default()
        };
        assert!(matches!(
            AutoTrader::new(config, RiskConfig::default()),
            Err(ExecutionError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_deposit_rejects_non_positive() {
        let mut trader = trader();
        assert!(trader.deposit(dec!(0)).unwrap_err().is_invalid_input());
        assert!(trader.deposit(dec!(-1)).unwrap_err().is_invalid_input());
        assert_eq!(trader.deposits().len(), 1);
        assert_eq!(trader.ledger().deposited_total, dec!(1000));
    }

    #[test]
    fn test_new_seeds_ledger_from_settings_capital() {
        let mut trader = trader();
        assert_eq!(trader.deposits().len(), 1);
        assert_eq!(trader.deposits()[0].amount, dec!(1000));
        assert_eq!(trader.ledger().available, dec!(1000));

        // 입금 없이 첫 진입: 1000의 10%
        let events = trader
            .on_reading(&reading("BTCUSDT", 100.0, Some(20.0)))
            .unwrap();
        match &events[0] {
            TradeEvent::Opened(p) => assert_eq!(p.invested_amount, dec!(100)),
            other => panic!("진입 이벤트여야 한다: {other:?}"),
        }
        assert_eq!(trader.stats().deposited_total, dec!(1000));
        trader.check_invariant().unwrap();
    }

    #[test]
    fn test_zero_capital_starts_with_empty_ledger() {
        let config = AutoTraderConfig {
            settings: AutoTraderSettings {
                capital: Decimal::ZERO,
                ..Default::default()
            },
            ..Default::default()
        };
        let trader = AutoTrader::new(config, RiskConfig::default()).unwrap();
        assert!(trader.deposits().is_empty());
        assert_eq!(trader.ledger().available, Decimal::ZERO);
    }

    #[test]
    fn test_restore_seeds_empty_history_once() {
        let mut trader = trader();
        let snapshot = TradingSnapshot {
            settings: Some(AutoTraderSettings {
                capital: dec!(2500),
                ..Default::default()
            }),
            ..Default::default()
        };

        let events = trader.restore(snapshot).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], TradeEvent::Deposited(ref d) if d.amount == dec!(2500)));
        assert_eq!(trader.deposits().len(), 1);
        assert_eq!(trader.ledger().available, dec!(2500));

        // 기록이 있는 스냅샷은 다시 시드하지 않는다
        let snapshot = TradingSnapshot {
            trades: Vec::new(),
            deposits: trader.deposits().to_vec(),
            settings: Some(trader.settings().clone()),
        };
        assert!(trader.restore(snapshot).unwrap().is_empty());
        assert_eq!(trader.ledger().deposited_total, dec!(2500));
    }

    #[test]
    fn test_invalid_price_is_rejected_without_mutation() {
        let mut trader = trader();
        let err = trader
            .on_reading(&reading("BTCUSDT", f64::NAN, Some(10.0)))
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(trader.positions().is_empty());
        assert_eq!(trader.trigger_state("BTCUSDT"), TriggerState::Idle);
    }

    #[test]
    fn test_null_rsi_is_no_signal() {
        let mut trader = trader();
        let events = trader.on_reading(&reading("BTCUSDT", 100.0, None)).unwrap();
        assert!(events.is_empty());
        assert_eq!(trader.trigger_state("BTCUSDT"), TriggerState::Idle);
    }

    #[test]
    fn test_inactive_trader_skips_entries_but_monitors_exits() {
        let mut trader = trader();
        trader.on_reading(&reading("BTCUSDT", 100.0, Some(20.0))).unwrap();
        assert_eq!(trader.open_positions().count(), 1);

        let mut settings = trader.settings().clone();
        settings.is_active = false;
        trader.update_settings(settings).unwrap();

        // 새 진입 없음
        let events = trader.on_reading(&reading("ETHUSDT", 50.0, Some(10.0))).unwrap();
        assert!(events.is_empty());

        // 기존 포지션은 계속 감시
        let events = trader.on_reading(&reading("BTCUSDT", 102.0, Some(30.0))).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].position().map(|p| p.status),
            Some(PositionStatus::ClosedTp)
        );
        trader.check_invariant().unwrap();
    }

    #[test]
    fn test_close_check_runs_before_entry() {
        let mut trader = trader();
        trader.on_reading(&reading("BTCUSDT", 100.0, Some(20.0))).unwrap();
        trader.on_reading(&reading("BTCUSDT", 100.0, Some(45.0))).unwrap();

        // 손절과 재진입이 같은 판독값에서 발생: 손절로 돌아온 자본으로 사이징
        let events = trader.on_reading(&reading("BTCUSDT", 99.0, Some(20.0))).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TradeEvent::Closed(ref p) if p.status == PositionStatus::ClosedSl));
        match &events[1] {
            TradeEvent::Opened(p) => {
                // 1000 - 1 (손절) = 999 의 10%
                assert_eq!(p.invested_amount, dec!(99.9));
            }
            other => panic!("진입 이벤트여야 한다: {other:?}"),
        }
        trader.check_invariant().unwrap();
    }

    #[test]
    fn test_settings_change_keeps_capital_by_default() {
        let mut trader = trader();
        let events = trader
            .update_settings(AutoTraderSettings {
                capital: dec!(5000),
                risk_percent: 20.0,
                is_active: true,
            })
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(trader.ledger().available, dec!(1000));
        assert_eq!(trader.settings().risk_percent, 20.0);
    }

    #[test]
    fn test_settings_change_rebases_when_enabled() {
        let config = AutoTraderConfig {
            reset_capital_on_settings_change: true,
            ..Default::default()
        };
        let mut trader = AutoTrader::new(config, RiskConfig::default()).unwrap();

        let events = trader
            .update_settings(AutoTraderSettings {
                capital: dec!(400),
                ..Default::default()
            })
            .unwrap();
        assert!(matches!(events[0], TradeEvent::Deposited(ref d) if d.amount == dec!(-600)));
        assert_eq!(trader.ledger().available, dec!(400));
        assert_eq!(trader.stats().deposited_total, dec!(400));
        trader.check_invariant().unwrap();
    }

    #[test]
    fn test_update_settings_rejects_invalid() {
        let mut trader = trader();
        let before = trader.settings().clone();
        let err = trader
            .update_settings(AutoTraderSettings {
                risk_percent: 0.0,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidSettings(_)));
        assert_eq!(trader.settings(), &before);
    }

    #[test]
    fn test_restore_rebuilds_ledger_and_resets_triggers() {
        let mut trader = trader();
        trader.on_reading(&reading("BTCUSDT", 100.0, Some(20.0))).unwrap();
        assert_eq!(trader.trigger_state("BTCUSDT"), TriggerState::Triggered);

        let snapshot = TradingSnapshot {
            trades: trader.positions().to_vec(),
            deposits: trader.deposits().to_vec(),
            settings: Some(trader.settings().clone()),
        };
        let mut restored = AutoTrader::new(AutoTraderConfig::default(), RiskConfig::default()).unwrap();
        assert!(restored.restore(snapshot).unwrap().is_empty());

        assert_eq!(restored.ledger(), trader.ledger());
        assert!(restored.settings().is_active);
        assert_eq!(restored.trigger_state("BTCUSDT"), TriggerState::Idle);
        restored.check_invariant().unwrap();
    }

    #[test]
    fn test_trade_event_serialization() {
        let event = TradeEvent::SettingsChanged(AutoTraderSettings::default());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "settings_changed");
        assert_eq!(json["data"]["capital"], "1000");
    }
}
