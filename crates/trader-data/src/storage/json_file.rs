//! JSON 파일 저장소.
//!
//! 전체 스냅샷을 하나의 JSON 문서로 저장합니다. 쓰기는 임시 파일에 기록한 뒤
//! rename하므로 중간에 중단되어도 이전 파일이 남습니다.
//!
//! 변경할 때마다 파일을 다시 읽어 그 위에 적용하므로, 같은 파일을 연 다른 핸들
//! (예: 실행 중인 `run`과 별도의 `deposit` 명령)의 기록을 덮어쓰지 않습니다.
//! 프로세스 간 파일 잠금은 없으므로 읽기와 rename 사이에 겹친 쓰기는 보호되지 않습니다.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use trader_core::{AutoTraderSettings, Deposit, Position, TradeUpdate, TradingSnapshot};
use uuid::Uuid;

use super::Mutation;
use crate::error::Result;
use crate::sink::PersistenceSink;

/// JSON 파일 저장소.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<TradingSnapshot>,
}

impl JsonFileStore {
    /// 파일을 열어 저장소를 만듭니다. 파일이 없으면 빈 스냅샷으로 시작합니다.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = read_snapshot(&path).await?;
        info!(
            path = %path.display(),
            trades = snapshot.trades.len(),
            deposits = snapshot.deposits.len(),
            "JSON 저장소 열기"
        );
        Ok(Self {
            path,
            state: Mutex::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 현재 파일 내용에 변경을 적용하고 기록합니다.
    /// 기록에 실패하면 메모리 상태도 유지됩니다.
    async fn mutate(&self, mutation: Mutation<'_>) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut next = read_snapshot(&self.path).await?;
        mutation.apply(&mut next)?;
        write_snapshot(&self.path, &next).await?;
        *state = next;
        Ok(())
    }
}

async fn read_snapshot(path: &Path) -> Result<TradingSnapshot> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(TradingSnapshot::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "저장 파일 없음, 빈 스냅샷으로 시작");
            Ok(TradingSnapshot::default())
        }
        Err(e) => Err(e.into()),
    }
}

async fn write_snapshot(path: &Path, snapshot: &TradingSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(snapshot)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!(path = %path.display(), bytes = json.len(), "스냅샷 저장");
    Ok(())
}

#[async_trait]
impl PersistenceSink for JsonFileStore {
    async fn load_trades(&self) -> Result<Vec<Position>> {
        Ok(self.state.lock().await.trades.clone())
    }

    async fn load_settings(&self) -> Result<Option<AutoTraderSettings>> {
        Ok(self.state.lock().await.settings.clone())
    }

    async fn load_deposits(&self) -> Result<Vec<Deposit>> {
        Ok(self.state.lock().await.deposits.clone())
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
        Ok(self.state.lock().await.clone())
    }

    fn name(&self) -> &str {
        "json"
    }
}
