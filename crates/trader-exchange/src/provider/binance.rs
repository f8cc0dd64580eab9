//! Binance `MarketFeed` 구현.

use async_trait::async_trait;
use tokio::sync::mpsc;
use trader_core::{FeedConfig, Timeframe};

use crate::connector::binance::BinanceClient;
use crate::traits::{ExchangeResult, FeedEvent, MarketFeed};
use crate::websocket::BinanceMarketStream;

/// REST 스냅샷과 WebSocket 스트림을 묶은 Binance 피드.
#[derive(Debug, Clone)]
pub struct BinanceFeed {
    client: BinanceClient,
    stream: BinanceMarketStream,
}

impl BinanceFeed {
    /// 피드 설정으로 생성합니다.
    pub fn new(config: &FeedConfig) -> ExchangeResult<Self> {
        Ok(Self {
            client: BinanceClient::new(config)?,
            stream: BinanceMarketStream::new(config),
        })
    }

    pub fn client(&self) -> &BinanceClient {
        &self.client
    }
}

#[async_trait]
impl MarketFeed for BinanceFeed {
    fn name(&self) -> &str {
        "binance"
    }

    async fn historical_closes(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ExchangeResult<Vec<f64>> {
        self.client.closes(symbol, timeframe, limit).await
    }

    async fn subscribe(
        &self,
        symbols: &[String],
        timeframe: Timeframe,
    ) -> ExchangeResult<mpsc::Receiver<FeedEvent>> {
        // 태스크는 수신자가 drop되면 스스로 종료됨
        let (rx, _handle) = self.stream.spawn(symbols, timeframe);
        Ok(rx)
    }
}
