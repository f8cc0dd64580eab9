//! 영속화 인터페이스.
//!
//! 엔진은 저장소 없이도 올바르게 동작합니다. 파이프라인이 엔진 이벤트를 받아
//! 저장소에 기록하고, 실패는 로그만 남깁니다.

use async_trait::async_trait;
use trader_core::{AutoTraderSettings, Deposit, Position, TradeUpdate, TradingSnapshot};
use uuid::Uuid;

use crate::error::Result;

/// 모의 매매 기록 저장소.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// 저장된 모든 포지션.
    async fn load_trades(&self) -> Result<Vec<Position>>;

    /// 저장된 설정.
    async fn load_settings(&self) -> Result<Option<AutoTraderSettings>>;

    /// 저장된 모든 입금 기록.
    async fn load_deposits(&self) -> Result<Vec<Deposit>>;

    /// 새 포지션을 추가합니다. 같은 ID가 있으면 `DuplicateError`입니다.
    async fn append_trade(&self, trade: &Position) -> Result<()>;

    /// 포지션의 청산 필드를 갱신합니다.
    async fn update_trade(&self, id: Uuid, update: &TradeUpdate) -> Result<()>;

    /// 설정을 저장합니다.
    async fn save_settings(&self, settings: &AutoTraderSettings) -> Result<()>;

    /// 입금 기록을 추가합니다.
    async fn append_deposit(&self, deposit: &Deposit) -> Result<()>;

    /// 엔진 복원용 전체 스냅샷.
    async fn load_snapshot(&self) -> Result<TradingSnapshot> {
        Ok(TradingSnapshot {
            trades: self.load_trades().await?,
            deposits: self.load_deposits().await?,
            settings: self.load_settings().await?,
        })
    }

    /// 저장소 이름 (로그용).
    fn name(&self) -> &str;
}
