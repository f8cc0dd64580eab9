//! Binance용 WebSocket 스트림 구현.
//!
//! 결합 스트림(`/stream?streams=...`)으로 심볼별 kline과 miniTicker를 받습니다.
//! 마감된 kline만 `CandleClose`가 되고, miniTicker의 종가는 `Tick`이 됩니다.
//! 연결이 끊기면 `Disconnected`를 보내고 대기 후 재연결하여 `Connected`를 보냅니다.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};
use trader_core::{FeedConfig, Timeframe};

use crate::connector::binance::parse_price;
use crate::traits::FeedEvent;

/// 피드 채널 버퍼 크기.
const CHANNEL_CAPACITY: usize = 1000;

// ============================================================================
// WebSocket 메시지 타입
// ============================================================================

/// 결합 스트림 래퍼.
#[derive(Debug, Deserialize)]
struct CombinedMessage {
    #[allow(dead_code)]
    stream: String,
    data: StreamPayload,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "e")]
enum StreamPayload {
    #[serde(rename = "kline")]
    Kline(WsKlineEvent),
    #[serde(rename = "24hrMiniTicker")]
    MiniTicker(WsMiniTicker),
}

/// Binance 캔들(kline) 스트림 이벤트.
#[derive(Debug, Deserialize)]
struct WsKlineEvent {
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "k")]
    kline: WsKline,
}

#[derive(Debug, Deserialize)]
struct WsKline {
    #[serde(rename = "T")]
    close_time: i64,
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "x")]
    is_closed: bool,
}

/// Binance miniTicker 스트림 이벤트.
#[derive(Debug, Deserialize)]
struct WsMiniTicker {
    #[serde(rename = "E")]
    event_time: i64,
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "c")]
    close: String,
}

/// 결합 스트림 메시지를 `FeedEvent`로 파싱합니다.
///
/// 아직 마감되지 않은 kline, 알 수 없는 이벤트, 잘못된 가격은 `None`입니다.
pub fn parse_message(text: &str) -> Option<FeedEvent> {
    let message: CombinedMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "처리하지 않는 메시지");
            return None;
        }
    };

    match message.data {
        StreamPayload::Kline(event) if event.kline.is_closed => {
            let close = parse_price(&event.kline.close).ok()?;
            Some(FeedEvent::CandleClose {
                symbol: event.symbol,
                close,
                at: timestamp(event.kline.close_time),
            })
        }
        StreamPayload::Kline(_) => None,
        StreamPayload::MiniTicker(ticker) => {
            let price = parse_price(&ticker.close).ok()?;
            Some(FeedEvent::Tick {
                symbol: ticker.symbol,
                price,
                at: timestamp(ticker.event_time),
            })
        }
    }
}

fn timestamp(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

// ============================================================================
// Binance 시장 스트림
// ============================================================================

/// Binance WebSocket 시장 데이터 스트림.
#[derive(Debug, Clone)]
pub struct BinanceMarketStream {
    ws_base_url: String,
    reconnect_delay: Duration,
}

impl BinanceMarketStream {
    /// 피드 설정으로 스트림을 생성합니다.
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            ws_base_url: config.ws_base_url.trim_end_matches('/').to_string(),
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
        }
    }

    /// 캔들(kline) 스트림 이름을 반환합니다.
    fn kline_stream(symbol: &str, timeframe: Timeframe) -> String {
        format!(
            "{}@kline_{}",
            symbol.to_lowercase(),
            timeframe.as_binance_interval()
        )
    }

    /// miniTicker 스트림 이름을 반환합니다.
    fn ticker_stream(symbol: &str) -> String {
        format!("{}@miniTicker", symbol.to_lowercase())
    }

    /// 결합 스트림 URL.
    pub fn stream_url(&self, symbols: &[String], timeframe: Timeframe) -> String {
        let streams: Vec<String> = symbols
            .iter()
            .flat_map(|s| [Self::kline_stream(s, timeframe), Self::ticker_stream(s)])
            .collect();
        format!("{}/stream?streams={}", self.ws_base_url, streams.join("/"))
    }

    /// 연결/재연결 루프를 백그라운드 태스크로 시작합니다.
    ///
    /// 수신 측이 drop되면 태스크가 종료됩니다.
    pub fn spawn(
        &self,
        symbols: &[String],
        timeframe: Timeframe,
    ) -> (mpsc::Receiver<FeedEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let url = self.stream_url(symbols, timeframe);
        let handle = tokio::spawn(run(url, self.reconnect_delay, tx));
        (rx, handle)
    }
}

/// 연결이 끊길 때마다 재연결합니다.
async fn run(url: String, reconnect_delay: Duration, tx: mpsc::Sender<FeedEvent>) {
    loop {
        info!(url = %url, "Binance WebSocket 연결 중");
        match connect_async(url.as_str()).await {
            Ok((ws, _)) => {
                info!("Binance WebSocket 연결됨");
                if tx.send(FeedEvent::Connected).await.is_err() {
                    return;
                }
                let Some(reason) = read_until_closed(ws, &tx).await else {
                    debug!("피드 수신자가 종료되어 스트림을 닫습니다");
                    return;
                };
                warn!(reason = %reason, "Binance WebSocket 연결 끊김");
                if tx.send(FeedEvent::Disconnected { reason }).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "Binance WebSocket 연결 실패");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay) => {}
            _ = tx.closed() => return,
        }
    }
}

/// 연결이 끝날 때까지 메시지를 전달합니다.
///
/// 연결이 끊긴 이유를 반환하며, 수신자가 사라졌으면 `None`입니다.
async fn read_until_closed<S>(mut ws: S, tx: &mpsc::Sender<FeedEvent>) -> Option<String>
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        tokio::select! {
            _ = tx.closed() => return None,
            message = ws.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = parse_message(&text) {
                        if tx.send(event).await.is_err() {
                            return None;
                        }
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    return Some(format!("server closed: {:?}", frame));
                }
                // Ping/Pong은 tungstenite에서 자동으로 처리됨
                Some(Ok(_)) => {}
                Some(Err(e)) => return Some(e.to_string()),
                None => return Some("stream ended".to_string()),
            }
        }
    }
}
