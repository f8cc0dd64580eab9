//! 모의 매매 포지션.
//!
//! 포지션은 진입 트리거 시 생성되고 청산 시 단 한 번만 변경됩니다.
//! `Missed` 포지션은 자본이 없어 진입하지 못한 기록이며 절대 오픈/청산되지 않습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::{Price, Quantity};

/// 포지션 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    /// 보유 중
    Open,
    /// 익절 청산
    ClosedTp,
    /// 손절 청산
    ClosedSl,
    /// 가용 자본 부족으로 진입 실패
    Missed,
}

impl PositionStatus {
    /// 청산된 상태인지 확인합니다.
    pub fn is_closed(&self) -> bool {
        matches!(self, PositionStatus::ClosedTp | PositionStatus::ClosedSl)
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionStatus::Open => write!(f, "OPEN"),
            PositionStatus::ClosedTp => write!(f, "CLOSED_TP"),
            PositionStatus::ClosedSl => write!(f, "CLOSED_SL"),
            PositionStatus::Missed => write!(f, "MISSED"),
        }
    }
}

/// 자동 매매 포지션.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// 포지션 ID
    pub id: Uuid,
    /// 심볼
    pub symbol: String,
    /// 진입 가격
    pub entry_price: Price,
    /// 익절 가격 (진입 시 고정)
    pub take_profit_price: Price,
    /// 손절 가격 (진입 시 고정)
    pub stop_loss_price: Price,
    /// 수량 (8자리 반올림, 손익 계산에는 쓰지 않음)
    pub quantity: Quantity,
    /// 투자 금액
    pub invested_amount: Decimal,
    /// 상태
    pub status: PositionStatus,
    /// 진입 시각
    pub opened_at: DateTime<Utc>,
    /// 청산 시각
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// 청산 가격
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_price: Option<Price>,
    /// 실현 손익
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_profit: Option<Decimal>,
}

impl Position {
    /// 오픈 포지션을 생성합니다.
    pub fn open(
        symbol: impl Into<String>,
        entry_price: Price,
        take_profit_price: Price,
        stop_loss_price: Price,
        quantity: Quantity,
        invested_amount: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            entry_price,
            take_profit_price,
            stop_loss_price,
            quantity,
            invested_amount,
            status: PositionStatus::Open,
            opened_at,
            closed_at: None,
            close_price: None,
            realized_profit: None,
        }
    }

    /// 진입하지 못한 포지션 기록을 생성합니다. 투자 금액과 수량은 0입니다.
    pub fn missed(
        symbol: impl Into<String>,
        entry_price: Price,
        take_profit_price: Price,
        stop_loss_price: Price,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: PositionStatus::Missed,
            ..Self::open(
                symbol,
                entry_price,
                take_profit_price,
                stop_loss_price,
                Decimal::ZERO,
                Decimal::ZERO,
                opened_at,
            )
        }
    }

    /// 포지션이 오픈 상태인지 확인합니다.
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// 주어진 가격에서의 손익 `invested × (price − entry) / entry`.
    ///
    /// 반올림된 `quantity`가 아니라 투자 금액에서 계산합니다.
    pub fn profit_at(&self, price: Price) -> Decimal {
        if self.entry_price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.invested_amount * (price - self.entry_price) / self.entry_price
    }

    /// 오픈 포지션을 청산하고 실현 손익을 반환합니다.
    ///
    /// 오픈 상태가 아니거나 `status`가 청산 상태가 아니면 아무것도 하지 않고 `None`을 반환합니다.
    pub fn close(
        &mut self,
        status: PositionStatus,
        close_price: Price,
        closed_at: DateTime<Utc>,
    ) -> Option<Decimal> {
        if !self.is_open() || !status.is_closed() {
            return None;
        }
        let profit = self.profit_at(close_price);
        self.status = status;
        self.close_price = Some(close_price);
        self.closed_at = Some(closed_at);
        self.realized_profit = Some(profit);
        Some(profit)
    }

    /// 청산 결과를 부분 갱신 레코드로 반환합니다.
    pub fn close_update(&self) -> Option<TradeUpdate> {
        if !self.status.is_closed() {
            return None;
        }
        Some(TradeUpdate {
            status: self.status,
            closed_at: self.closed_at,
            close_price: self.close_price,
            realized_profit: self.realized_profit,
        })
    }

    /// 저장소에서 받은 부분 갱신을 적용합니다.
    pub fn apply_update(&mut self, update: &TradeUpdate) {
        self.status = update.status;
        self.closed_at = update.closed_at;
        self.close_price = update.close_price;
        self.realized_profit = update.realized_profit;
    }
}

/// 포지션의 부분 갱신 필드 (`update_trade`용).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeUpdate {
    pub status: PositionStatus,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub close_price: Option<Price>,
    #[serde(default)]
    pub realized_profit: Option<Decimal>,
}
