//! 저장소 구현.

pub mod json_file;
pub mod memory;

use trader_core::{AutoTraderSettings, Deposit, Position, TradeUpdate, TradingSnapshot};
use uuid::Uuid;

use crate::error::{DataError, Result};

/// 스냅샷에 대한 쓰기 연산. 두 저장소가 같은 규칙을 공유합니다.
pub(crate) enum Mutation<'a> {
    AppendTrade(&'a Position),
    UpdateTrade(Uuid, &'a TradeUpdate),
    SaveSettings(&'a AutoTraderSettings),
    AppendDeposit(&'a Deposit),
}

impl Mutation<'_> {
    /// 스냅샷에 적용합니다. 실패하면 스냅샷은 변경되지 않습니다.
    pub(crate) fn apply(&self, snapshot: &mut TradingSnapshot) -> Result<()> {
        match self {
            Mutation::AppendTrade(trade) => {
                if snapshot.trades.iter().any(|t| t.id == trade.id) {
                    return Err(DataError::DuplicateError(format!("trade {}", trade.id)));
                }
                snapshot.trades.push((*trade).clone());
            }
            Mutation::UpdateTrade(id, update) => {
                let trade = snapshot
                    .trades
                    .iter_mut()
                    .find(|t| t.id == *id)
                    .ok_or_else(|| DataError::trade_not_found(*id))?;
                trade.apply_update(update);
            }
            Mutation::SaveSettings(settings) => {
                snapshot.settings = Some((*settings).clone());
            }
            Mutation::AppendDeposit(deposit) => {
                if snapshot.deposits.iter().any(|d| d.id == deposit.id) {
                    return Err(DataError::DuplicateError(format!("deposit {}", deposit.id)));
                }
                snapshot.deposits.push((*deposit).clone());
            }
        }
        Ok(())
    }
}
