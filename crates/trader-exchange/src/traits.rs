//! 시장 데이터 피드 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use trader_core::Timeframe;

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 피드에서 전달되는 이벤트.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// 실시간 체결가 (미확정)
    Tick {
        symbol: String,
        price: f64,
        at: DateTime<Utc>,
    },
    /// 캔들 마감 종가
    CandleClose {
        symbol: String,
        close: f64,
        at: DateTime<Utc>,
    },
    /// 스트림 연결됨
    Connected,
    /// 스트림 끊김 (재연결 예정)
    Disconnected { reason: String },
}

impl FeedEvent {
    /// 이벤트의 심볼.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            FeedEvent::Tick { symbol, .. } | FeedEvent::CandleClose { symbol, .. } => {
                Some(symbol)
            }
            _ => None,
        }
    }
}

/// 시장 데이터 피드.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// 피드 이름.
    fn name(&self) -> &str;

    /// 최근 `limit`개 캔들의 종가 (오래된 순).
    async fn historical_closes(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ExchangeResult<Vec<f64>>;

    /// 틱과 캔들 마감 이벤트를 구독합니다.
    ///
    /// 수신 측이 drop되면 피드는 종료됩니다.
    async fn subscribe(
        &self,
        symbols: &[String],
        timeframe: Timeframe,
    ) -> ExchangeResult<mpsc::Receiver<FeedEvent>>;
}
