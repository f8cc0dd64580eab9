//! 포트폴리오 통계.
//!
//! 모든 통계는 거래/입금 기록에서 필요할 때 계산되는 순수 함수입니다.
//! `Missed` 포지션은 승/패 집계에 포함되지 않습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ledger::{CapitalLedger, Deposit};
use super::position::{Position, PositionStatus};

/// 포트폴리오 요약 통계.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// 누적 입금액
    pub deposited_total: Decimal,
    /// 현재 포트폴리오 가치 (가용 자본 + 오픈 포지션 투자금)
    pub current_value: Decimal,
    /// 가용 자본
    pub available: Decimal,
    /// 누적 실현 손익
    pub total_realized_pnl: Decimal,
    /// 익절 횟수
    pub wins: usize,
    /// 손절 횟수
    pub losses: usize,
    /// 승률 (0.0 ~ 1.0, 거래가 없으면 0)
    pub win_rate: f64,
}

impl PortfolioStats {
    /// 승률을 백분율로 반환합니다.
    pub fn win_rate_pct(&self) -> f64 {
        self.win_rate * 100.0
    }
}

/// 심볼별 자본 배분.
///
/// `Σ invested + available == total`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalAllocation {
    /// 심볼별 오픈 포지션 투자금
    pub invested: BTreeMap<String, Decimal>,
    /// 가용 자본
    pub available: Decimal,
    /// 합계 (현재 포트폴리오 가치)
    pub total: Decimal,
}

/// 기간별 실현 손익.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// 기간 내 청산된 포지션 수
    pub closed_count: usize,
    pub wins: usize,
    pub losses: usize,
    /// 기간 내 실현 손익 합계
    pub realized_pnl: Decimal,
}

/// 거래와 입금 기록에서 포트폴리오 통계를 계산합니다.
pub fn derive_stats(trades: &[Position], deposits: &[Deposit]) -> PortfolioStats {
    let ledger = CapitalLedger::from_history(trades, deposits);
    let (wins, losses) = count_outcomes(trades.iter());
    let total_realized_pnl = trades
        .iter()
        .filter(|p| p.status.is_closed())
        .filter_map(|p| p.realized_profit)
        .sum();

    PortfolioStats {
        deposited_total: ledger.deposited_total,
        current_value: ledger.current_value(trades),
        available: ledger.available,
        total_realized_pnl,
        wins,
        losses,
        win_rate: win_rate(wins, losses),
    }
}

/// 오픈 포지션의 심볼별 투자금과 가용 자본을 계산합니다.
pub fn capital_allocation(trades: &[Position], deposits: &[Deposit]) -> CapitalAllocation {
    let ledger = CapitalLedger::from_history(trades, deposits);
    let mut invested: BTreeMap<String, Decimal> = BTreeMap::new();
    for position in trades.iter().filter(|p| p.is_open()) {
        *invested.entry(position.symbol.clone()).or_default() += position.invested_amount;
    }
    let total = invested.values().copied().sum::<Decimal>() + ledger.available;

    CapitalAllocation {
        invested,
        available: ledger.available,
        total,
    }
}

/// `[from, to]` 구간에 청산된 포지션의 손익을 집계합니다.
pub fn period_stats(trades: &[Position], from: DateTime<Utc>, to: DateTime<Utc>) -> PeriodStats {
    let closed: Vec<&Position> = trades
        .iter()
        .filter(|p| p.status.is_closed())
        .filter(|p| matches!(p.closed_at, Some(at) if at >= from && at <= to))
        .collect();
    let (wins, losses) = count_outcomes(closed.iter().copied());

    PeriodStats {
        from,
        to,
        closed_count: closed.len(),
        wins,
        losses,
        realized_pnl: closed.iter().filter_map(|p| p.realized_profit).sum(),
    }
}

fn count_outcomes<'a>(trades: impl Iterator<Item = &'a Position>) -> (usize, usize) {
    trades.fold((0, 0), |(wins, losses), p| match p.status {
        PositionStatus::ClosedTp => (wins + 1, losses),
        PositionStatus::ClosedSl => (wins, losses + 1),
        _ => (wins, losses),
    })
}

fn win_rate(wins: usize, losses: usize) -> f64 {
    let total = wins + losses;
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}
