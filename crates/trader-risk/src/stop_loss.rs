//! 손절매 및 이익실현 관리.
//!
//! 제공 기능:
//! - 진입가 기준 고정 익절/손절 가격 계산
//! - 현재가에 대한 청산 판정 (익절 우선)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trader_core::{Position, PositionStatus, Price, RiskConfig};

/// 정수 연산을 사용하여 가격에 백분율 조정을 적용.
/// 예시: apply_pct(50000, -1.0) = 49500 (1% 감소)
/// 예시: apply_pct(50000, 2.0) = 51000 (2% 증가)
pub(crate) fn apply_pct(price: Decimal, pct: f64) -> Decimal {
    // 백분율을 정수로 스케일링 (백분율에서 소수점 4자리까지 지원)
    // 공식: price * (1 + pct/100) = price * (100 + pct) / 100
    let scaled_factor = ((100.0 + pct) * 10000.0).round() as i64;
    (price * Decimal::from(scaled_factor)) / Decimal::from(1_000_000)
}

/// 청산 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// 익절가 도달 (price ≥ take_profit)
    TakeProfit,
    /// 손절가 도달 (price ≤ stop_loss)
    StopLoss,
}

impl ExitReason {
    /// 청산 후 포지션 상태.
    pub fn status(&self) -> PositionStatus {
        match self {
            ExitReason::TakeProfit => PositionStatus::ClosedTp,
            ExitReason::StopLoss => PositionStatus::ClosedSl,
        }
    }
}

/// 진입 시 고정되는 익절/손절 가격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitLevels {
    pub take_profit: Price,
    pub stop_loss: Price,
}

/// 익절/손절 가격 생성 및 청산 판정.
#[derive(Debug, Clone, Copy)]
pub struct StopOrderGenerator {
    config: RiskConfig,
}

impl StopOrderGenerator {
    /// 새 생성기를 만듭니다.
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// 진입가에서 익절/손절 가격을 계산합니다.
    ///
    /// `entry × (1 + tp%/100)`, `entry × (1 − sl%/100)`
    pub fn exit_levels(&self, entry_price: Price) -> ExitLevels {
        ExitLevels {
            take_profit: apply_pct(entry_price, self.config.take_profit_pct),
            stop_loss: apply_pct(entry_price, -self.config.stop_loss_pct),
        }
    }

    /// 오픈 포지션이 현재가에서 청산되어야 하는지 판정합니다.
    ///
    /// 두 조건이 동시에 만족되면 익절이 우선합니다.
    /// 오픈 상태가 아닌 포지션은 항상 `None`입니다.
    pub fn check_exit(&self, position: &Position, price: Price) -> Option<ExitReason> {
        if !position.is_open() {
            return None;
        }
        if price >= position.take_profit_price {
            Some(ExitReason::TakeProfit)
        } else if price <= position.stop_loss_price {
            Some(ExitReason::StopLoss)
        } else {
            None
        }
    }

    /// 손익비 (익절 폭 / 손절 폭).
    pub fn risk_reward(&self) -> f64 {
        self.config.take_profit_pct / self.config.stop_loss_pct
    }
}
