//! 메모리 저장소.
//!
//! 프로세스가 끝나면 기록이 사라집니다. 테스트와 `persistence.backend = "memory"`에서 사용합니다.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use trader_core::{AutoTraderSettings, Deposit, Position, TradeUpdate, TradingSnapshot};
use uuid::Uuid;

use super::Mutation;
use crate::error::Result;
use crate::sink::PersistenceSink;

/// 메모리 저장소.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<TradingSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 주어진 스냅샷으로 시작하는 저장소.
    pub fn with_snapshot(snapshot: TradingSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// 현재 상태의 복사본.
    pub async fn snapshot(&self) -> TradingSnapshot {
        self.state.read().await.clone()
    }

    async fn mutate(&self, mutation: Mutation<'_>) -> Result<()> {
        let mut state = self.state.write().await;
        mutation.apply(&mut state)?;
        debug!(trades = state.trades.len(), deposits = state.deposits.len(), "메모리 저장소 갱신");
        Ok(())
    }
}

#[async_trait]
impl PersistenceSink for MemoryStore {
    async fn load_trades(&self) -> Result<Vec<Position>> {
        Ok(self.state.read().await.trades.clone())
    }

    async fn load_settings(&self) -> Result<Option<AutoTraderSettings>> {
        Ok(self.state.read().await.settings.clone())
    }

    async fn load_deposits(&self) -> Result<Vec<Deposit>> {
        Ok(self.state.read().await.deposits.clone())
    }

    async fn append_trade(&self, trade: &Position) -> Result<()> {
        self.mutate(Mutation::AppendTrade(trade)).await
    }

    async fn update_trade(&self, id: Uuid, update: &TradeUpdate) -> Result<()> {
        self.mutate(Mutation::UpdateTrade(id, update)).await
    }

    async fn save_settings(&self, settings: &AutoTraderSettings) -> Result<()> {
        self.mutate(Mutation::SaveSettings(settings)).await
    }

    async fn append_deposit(&self, deposit: &Deposit) -> Result<()> {
        self.mutate(Mutation::AppendDeposit(deposit)).await
    }

    async fn load_snapshot(&self) -> Result<TradingSnapshot> {
        Ok(self.snapshot().await)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use trader_core::PositionStatus;

    fn position() -> Position {
        Position::open(
            "BTCUSDT",
            dec!(50000),
            dec!(51000),
            dec!(49500),
            dec!(0.002),
            dec!(100),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_append_and_update_trade() {
        let store = MemoryStore::new();
        let mut trade = position();
        store.append_trade(&trade).await.unwrap();

        trade.close(PositionStatus::ClosedTp, dec!(51000), Utc::now());
        let update = trade.close_update().unwrap();
        store.update_trade(trade.id, &update).await.unwrap();

        let trades = store.load_trades().await.unwrap();
        assert_eq!(trades, vec![trade]);
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_ids() {
        let store = MemoryStore::new();
        let trade = position();
        store.append_trade(&trade).await.unwrap();
        assert!(matches!(
            store.append_trade(&trade).await,
            Err(DataError::DuplicateError(_))
        ));

        let update = TradeUpdate {
            status: PositionStatus::ClosedSl,
            closed_at: None,
            close_price: None,
            realized_profit: None,
        };
        assert!(matches!(
            store.update_trade(Uuid::new_v4(), &update).await,
            Err(DataError::NotFound(_))
        ));
        assert_eq!(store.load_trades().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_collects_everything() {
        let store = MemoryStore::new();
        assert!(store.load_snapshot().await.unwrap().is_empty());

        store
            .append_deposit(&Deposit::new(dec!(1000), Utc::now()))
            .await
            .unwrap();
        store
            .save_settings(&AutoTraderSettings::default())
            .await
            .unwrap();

        let snapshot = store.load_snapshot().await.unwrap();
        assert_eq!(snapshot.deposits.len(), 1);
        assert_eq!(snapshot.settings, Some(AutoTraderSettings::default()));
        assert_eq!(store.name(), "memory");
    }
}
