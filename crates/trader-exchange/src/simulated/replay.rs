use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use trader_core::Timeframe;

use crate::traits::{ExchangeResult, FeedEvent, MarketFeed};
use crate::ExchangeError;

/// 히스토리와 이벤트를 재생하는 피드.
#[derive(Debug, Clone, Default)]
pub struct ReplayFeed {
    history: HashMap<String, Vec<f64>>,
    events: Vec<FeedEvent>,
    failing: HashSet<String>,
}

impl ReplayFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// 심볼의 종가 히스토리를 설정합니다 (오래된 순).
    pub fn with_history(mut self, symbol: impl Into<String>, closes: Vec<f64>) -> Self {
        self.history.insert(symbol.into(), closes);
        self
    }

    /// 스냅샷 조회가 실패하는 심볼을 지정합니다.
    pub fn with_failing_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.failing.insert(symbol.into());
        self
    }

    /// 구독 시 재생할 이벤트를 추가합니다.
    pub fn push_event(mut self, event: FeedEvent) -> Self {
        self.events.push(event);
        self
    }

    /// 캔들 마감 이벤트를 `start`부터 `timeframe` 간격으로 추가합니다.
    pub fn push_closes(
        mut self,
        symbol: &str,
        closes: &[f64],
        start: DateTime<Utc>,
        timeframe: Timeframe,
    ) -> Self {
        let step = Duration::seconds(timeframe.duration().as_secs() as i64);
        for (i, close) in closes.iter().enumerate() {
            self.events.push(FeedEvent::CandleClose {
                symbol: symbol.to_string(),
                close: *close,
                at: start + step * (i as i32 + 1) - Duration::milliseconds(1),
            });
        }
        self
    }

    pub fn events(&self) -> &[FeedEvent] {
        &self.events
    }
}

#[async_trait]
impl MarketFeed for ReplayFeed {
    fn name(&self) -> &str {
        "replay"
    }

    async fn historical_closes(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> ExchangeResult<Vec<f64>> {
        if self.failing.contains(symbol) {
            return Err(ExchangeError::NetworkError(format!("{symbol} 스냅샷 실패")));
        }
        let closes = self
            .history
            .get(symbol)
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))?;
        let skip = closes.len().saturating_sub(limit);
        Ok(closes[skip..].to_vec())
    }

    async fn subscribe(
        &self,
        symbols: &[String],
        _timeframe: Timeframe,
    ) -> ExchangeResult<mpsc::Receiver<FeedEvent>> {
        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        let selected = self
            .events
            .iter()
            .filter(|e| e.symbol().map_or(true, |s| symbols.iter().any(|w| w == s)));
        for event in selected {
            tx.try_send(event.clone())
                .map_err(|e| ExchangeError::Unknown(e.to_string()))?;
        }
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_history_is_truncated_to_limit() {
        let feed = ReplayFeed::new().with_history("BTCUSDT", vec![1.0, 2.0, 3.0, 4.0]);
        let closes = feed
            .historical_closes("BTCUSDT", Timeframe::H1, 2)
            .await
            .unwrap();
        assert_eq!(closes, vec![3.0, 4.0]);
        assert!(matches!(
            feed.historical_closes("ETHUSDT", Timeframe::H1, 2).await,
            Err(ExchangeError::SymbolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribe_replays_selected_symbols_then_ends() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let feed = ReplayFeed::new()
            .push_event(FeedEvent::Connected)
            .push_closes("BTCUSDT", &[10.0, 11.0], start, Timeframe::M1)
            .push_closes("ETHUSDT", &[5.0], start, Timeframe::M1);

        let mut rx = feed
            .subscribe(&["BTCUSDT".to_string()], Timeframe::M1)
            .await
            .unwrap();
        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }

        assert_eq!(received.len(), 3);
        assert_eq!(received[0], FeedEvent::Connected);
        assert_eq!(
            received[2],
            FeedEvent::CandleClose {
                symbol: "BTCUSDT".into(),
                close: 11.0,
                at: start + Duration::minutes(2) - Duration::milliseconds(1),
            }
        );
    }
}
