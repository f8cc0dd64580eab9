//! 모의 자본 입금 명령어.
//!
//! ```bash
//! trader deposit --store data/rsi-watch.json --amount 1000
//! ```
//!
//! 입금은 저장소 파일에만 기록됩니다. 실행 중인 `trader run` 프로세스는 시작할 때
//! 저장소를 복원하므로, 이 명령으로 넣은 입금은 다음 실행부터 가용 자본에 반영됩니다.

use anyhow::{bail, Result};
use rust_decimal::Decimal;
use std::path::Path;
use trader_core::AppConfig;
use trader_data::{JsonFileStore, PersistenceSink};
use trader_execution::AutoTrader;

use crate::pipeline::persist_events;

/// 저장소에 입금을 기록하고 입금 후 가용 자본을 반환합니다.
///
/// 기존 기록으로 엔진을 복원한 뒤 입금하므로 장부 검증을 그대로 거칩니다.
/// 입금 기록이 없는 저장소면 설정의 초기 자본 입금이 먼저 기록됩니다.
pub async fn deposit_to_store(store_path: &Path, config: &AppConfig, amount: Decimal) -> Result<Decimal> {
    let store = JsonFileStore::open(store_path).await?;
    let snapshot = store.load_snapshot().await?;

    let mut trader = AutoTrader::new(config.auto_trader.clone(), config.risk)?;
    let mut events = trader.restore(snapshot)?;
    events.push(trader.deposit(amount)?);

    if persist_events(&store, &events).await > 0 {
        bail!("입금 기록 저장 실패: {}", store_path.display());
    }
    Ok(trader.ledger().available)
}
