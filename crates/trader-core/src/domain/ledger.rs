//! 자본 장부.
//!
//! 불변식: `available + Σ(오픈 포지션 투자금) = deposited_total + Σ(청산 포지션 실현 손익)`
//!
//! 장부는 자동 매매 엔진만 변경합니다. 입금은 `deposited_total`과 `available`을
//! 함께 올리고, 진입은 투자금만큼 `available`을 줄이며, 청산은 투자금과 손익을 돌려줍니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::position::{Position, PositionStatus};
use crate::error::{TraderError, TraderResult};

/// 입금 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositKind {
    /// 사용자 입금 (양수만 허용)
    Deposit,
    /// 설정 변경에 따른 자본 재조정 (음수 가능)
    Adjustment,
}

/// 입금 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: Uuid,
    pub amount: Decimal,
    #[serde(default = "default_deposit_kind")]
    pub kind: DepositKind,
    pub created_at: DateTime<Utc>,
}

fn default_deposit_kind() -> DepositKind {
    DepositKind::Deposit
}

impl Deposit {
    /// 사용자 입금 기록을 생성합니다.
    pub fn new(amount: Decimal, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            kind: DepositKind::Deposit,
            created_at,
        }
    }

    /// 재조정 기록을 생성합니다.
    pub fn adjustment(amount: Decimal, created_at: DateTime<Utc>) -> Self {
        Self {
            kind: DepositKind::Adjustment,
            ..Self::new(amount, created_at)
        }
    }
}

/// 자본 장부.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalLedger {
    /// 누적 입금액
    pub deposited_total: Decimal,
    /// 가용 자본
    pub available: Decimal,
}

impl CapitalLedger {
    /// 빈 장부를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 포지션과 입금 기록에서 장부를 재구성합니다.
    pub fn from_history(positions: &[Position], deposits: &[Deposit]) -> Self {
        let deposited_total: Decimal = deposits.iter().map(|d| d.amount).sum();
        let realized: Decimal = positions
            .iter()
            .filter(|p| p.status.is_closed())
            .filter_map(|p| p.realized_profit)
            .sum();
        let locked: Decimal = positions
            .iter()
            .filter(|p| p.is_open())
            .map(|p| p.invested_amount)
            .sum();

        Self {
            deposited_total,
            available: deposited_total + realized - locked,
        }
    }

    /// 입금을 반영합니다. 0 이하 금액은 거부되며 장부는 변경되지 않습니다.
    pub fn deposit(&mut self, amount: Decimal) -> TraderResult<()> {
        if amount <= Decimal::ZERO {
            return Err(TraderError::InvalidInput(format!(
                "입금액은 0보다 커야 합니다: {amount}"
            )));
        }
        self.deposited_total += amount;
        self.available += amount;
        Ok(())
    }

    /// 가용 자본을 목표 값으로 재조정하고 조정액을 반환합니다.
    ///
    /// 조정액은 `deposited_total`에도 함께 반영되어 불변식이 유지됩니다.
    pub fn rebase(&mut self, target_available: Decimal) -> Decimal {
        let delta = target_available - self.available;
        self.deposited_total += delta;
        self.available += delta;
        delta
    }

    /// 진입 투자금을 차감합니다.
    pub fn open(&mut self, invested: Decimal) -> TraderResult<()> {
        if invested <= Decimal::ZERO {
            return Err(TraderError::InvalidInput(format!(
                "투자 금액은 0보다 커야 합니다: {invested}"
            )));
        }
        if invested > self.available {
            return Err(TraderError::InvalidInput(format!(
                "투자 금액({invested})이 가용 자본({})을 초과합니다",
                self.available
            )));
        }
        self.available -= invested;
        Ok(())
    }

    /// 청산된 포지션의 투자금과 실현 손익을 돌려받습니다.
    pub fn close(&mut self, invested: Decimal, realized_profit: Decimal) {
        self.available += invested + realized_profit;
    }

    /// 포트폴리오 가치 `available + Σ(오픈 포지션 투자금)`.
    pub fn current_value(&self, positions: &[Position]) -> Decimal {
        self.available + open_invested(positions)
    }

    /// 장부 불변식을 검사합니다.
    pub fn check_invariant(&self, positions: &[Position]) -> TraderResult<()> {
        let realized: Decimal = positions
            .iter()
            .filter(|p| p.status.is_closed())
            .filter_map(|p| p.realized_profit)
            .sum();
        let lhs = self.current_value(positions);
        let rhs = self.deposited_total + realized;
        if lhs != rhs {
            return Err(TraderError::Internal(format!(
                "자본 장부 불변식 위반: available+invested={lhs}, deposited+realized={rhs}"
            )));
        }
        Ok(())
    }
}

fn open_invested(positions: &[Position]) -> Decimal {
    positions
        .iter()
        .filter(|p| p.status == PositionStatus::Open)
        .map(|p| p.invested_amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn open_position(invested: Decimal) -> Position {
        Position::open(
            "BTCUSDT",
            dec!(100),
            dec!(102),
            dec!(99),
            invested / dec!(100),
            invested,
            Utc::now(),
        )
    }

    #[test]
    fn test_deposit_rejects_non_positive() {
        let mut ledger = CapitalLedger::new();
        assert!(ledger.deposit(dec!(0)).unwrap_err().is_invalid_input());
        assert!(ledger.deposit(dec!(-10)).is_err());
        assert_eq!(ledger, CapitalLedger::new());

        ledger.deposit(dec!(500)).unwrap();
        assert_eq!(ledger.deposited_total, dec!(500));
        assert_eq!(ledger.available, dec!(500));
    }

    #[test]
    fn test_open_and_close_keep_invariant() {
        let mut ledger = CapitalLedger::new();
        ledger.deposit(dec!(1000)).unwrap();

        let mut position = open_position(dec!(100));
        ledger.open(position.invested_amount).unwrap();
        let positions = vec![position.clone()];
        ledger.check_invariant(&positions).unwrap();
        assert_eq!(ledger.available, dec!(900));

        let profit = position
            .close(PositionStatus::ClosedTp, dec!(102), Utc::now())
            .unwrap();
        ledger.close(position.invested_amount, profit);
        ledger.check_invariant(&[position]).unwrap();
        assert_eq!(ledger.available, dec!(1002));
    }

    #[test]
    fn test_open_rejects_overdraft() {
        let mut ledger = CapitalLedger::new();
        ledger.deposit(dec!(50)).unwrap();
        assert!(ledger.open(dec!(60)).is_err());
        assert_eq!(ledger.available, dec!(50));
    }

    #[test]
    fn test_rebase_records_delta() {
        let mut ledger = CapitalLedger::new();
        ledger.deposit(dec!(1000)).unwrap();
        let position = open_position(dec!(100));
        ledger.open(dec!(100)).unwrap();

        let delta = ledger.rebase(dec!(2000));
        assert_eq!(delta, dec!(1100));
        assert_eq!(ledger.available, dec!(2000));
        ledger.check_invariant(&[position]).unwrap();
    }

    #[test]
    fn test_from_history_matches_incremental() {
        let deposits = vec![
            Deposit::new(dec!(1000), Utc::now()),
            Deposit::adjustment(dec!(-200), Utc::now()),
        ];
        let open = open_position(dec!(80));
        let mut closed = open_position(dec!(100));
        closed.close(PositionStatus::ClosedSl, dec!(99), Utc::now());

        let ledger = CapitalLedger::from_history(&[open.clone(), closed.clone()], &deposits);
        assert_eq!(ledger.deposited_total, dec!(800));
        // 800 - 1 (손절) - 80 (오픈)
        assert_eq!(ledger.available, dec!(719));
        ledger.check_invariant(&[open, closed]).unwrap();
    }
}
