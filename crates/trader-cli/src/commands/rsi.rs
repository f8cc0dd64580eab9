//! 단일 심볼 RSI 조회 명령어.
//!
//! ```bash
//! trader rsi -s BTCUSDT -i 1h -l 200
//! ```

use anyhow::{bail, Result};
use trader_analytics::rsi_series;
use trader_core::{AlertConfig, AlertSide, FeedConfig, Timeframe};
use trader_exchange::BinanceClient;

/// RSI 조회 설정.
#[derive(Debug, Clone)]
pub struct RsiQuery {
    pub symbol: String,
    pub interval: Timeframe,
    /// 조회할 캔들 수
    pub limit: usize,
    /// RSI 기간
    pub period: usize,
    /// 출력할 최근 값 개수
    pub tail: usize,
}

/// 최근 종가로 RSI를 계산해 출력합니다.
pub async fn print_rsi(query: RsiQuery, feed: &FeedConfig) -> Result<()> {
    let client = BinanceClient::new(feed)?;
    let closes = client
        .closes(&query.symbol, query.interval, query.limit)
        .await?;
    if closes.is_empty() {
        bail!("{}: 종가 데이터가 없습니다", query.symbol);
    }

    let series = rsi_series(&closes, query.period)?;

    println!("\n📈 {} ({}) RSI({})", query.symbol.to_uppercase(), query.interval, query.period);
    println!("캔들 수: {}", closes.len());

    let skip = closes.len().saturating_sub(query.tail);
    for (close, rsi) in closes.iter().zip(&series).skip(skip) {
        match rsi {
            Some(value) => println!("  {close:>14.4}  RSI {value:>6.2}{}", zone_label(*value)),
            None => println!("  {close:>14.4}  RSI    -"),
        }
    }

    match series.last().copied().flatten() {
        Some(value) => println!("\n현재 RSI: {value:.2}{}", zone_label(value)),
        None => println!("\n⚠️  데이터 부족: RSI를 계산하려면 {}개 이상의 캔들이 필요합니다", query.period + 1),
    }
    Ok(())
}

/// 기본 알림 레벨 기준 구간 표시.
fn zone_label(rsi: f64) -> String {
    let alerts = AlertConfig::default();
    [AlertSide::Oversold, AlertSide::Overbought]
        .into_iter()
        .find_map(|side| {
            let zone = match side {
                AlertSide::Oversold => &alerts.oversold,
                AlertSide::Overbought => &alerts.overbought,
            };
            zone.breach(side, rsi).map(|tier| format!("  ({side}, {tier})"))
        })
        .unwrap_or_default()
}
