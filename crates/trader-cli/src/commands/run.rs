//! 감시 파이프라인 실행 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! trader run -c config/default.toml
//!
//! # 환경 변수로 텔레그램 설정 덮어쓰기
//! TRADER__NOTIFICATIONS__TELEGRAM__ENABLED=true trader run -c config/default.toml
//! ```

use anyhow::Result;
use tracing::info;
use trader_core::AppConfig;
use trader_data::open_store;
use trader_exchange::BinanceFeed;
use trader_notification::{LogSink, NotificationDispatcher, NotificationSink, TelegramSender};

use crate::pipeline::MarketPipeline;

/// Binance 피드로 파이프라인을 실행합니다. Ctrl-C로 종료합니다.
pub async fn run_pipeline(config: AppConfig) -> Result<()> {
    let store = open_store(&config.persistence).await?;

    let mut dispatcher = NotificationDispatcher::new();
    if let Some(sender) = TelegramSender::from_config(&config.notifications.telegram)? {
        dispatcher.add_sender(sender);
    }

    // 전송기가 없으면 로그로만 남김
    let (alert_sink, trade_sink, dispatcher_handle): (
        Box<dyn NotificationSink>,
        Box<dyn NotificationSink>,
        _,
    ) = if dispatcher.enabled_count() > 0 {
        let (sink, handle) = dispatcher.spawn();
        (Box::new(sink.clone()), Box::new(sink), Some(handle))
    } else {
        (Box::new(LogSink), Box::new(LogSink), None)
    };

    let mut pipeline = MarketPipeline::new(&config, store, alert_sink)?;
    if config.notifications.announce_trades {
        pipeline = pipeline.with_trade_announcer(trade_sink);
    }
    pipeline.restore().await?;

    let feed = BinanceFeed::new(&config.feed)?;
    pipeline.bootstrap(&feed).await;

    println!("\n📡 RSI 감시 시작");
    println!("심볼: {}", pipeline.symbols().join(", "));
    println!("타임프레임: {}", config.market.timeframe);
    println!("저장소: {:?}", config.persistence.backend);

    tokio::select! {
        result = pipeline.run(&feed) => result?,
        _ = tokio::signal::ctrl_c() => info!("종료 신호 수신"),
    }

    let stats = pipeline.trader().stats();
    println!("\n총 입금: {}", stats.deposited_total);
    println!("현재 가치: {}", stats.current_value);
    println!("실현 손익: {}", stats.total_realized_pnl);

    // sink가 모두 drop되어야 디스패처가 남은 알림을 보내고 종료됨
    drop(pipeline);
    if let Some(handle) = dispatcher_handle {
        handle.await?;
    }
    Ok(())
}
