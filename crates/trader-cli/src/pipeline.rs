//! 시장 데이터 파이프라인.
//!
//! 피드 이벤트를 한 번에 하나씩 끝까지 처리합니다:
//! 지표 엔진 → 알림 엔진 → 자동 매매 엔진 → 저장소/알림.
//! 엔진은 파이프라인이 단독으로 소유하므로 잠금이 필요 없습니다.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trader_analytics::IndicatorEngine;
use trader_core::{AppConfig, AutoTraderSettings, IndicatorReading, Timeframe, TraderResult};
use trader_data::PersistenceSink;
use trader_exchange::{FeedEvent, MarketFeed};
use trader_execution::{AutoTrader, TradeEvent};
use trader_notification::{position_message, AlertChange, AlertEngine, NotificationSink};

/// 피드 이벤트를 엔진들에 전달하는 단일 작성자 파이프라인.
pub struct MarketPipeline {
    symbols: Vec<String>,
    timeframe: Timeframe,
    history_limit: usize,
    indicators: IndicatorEngine,
    alerts: AlertEngine,
    trader: AutoTrader,
    store: Arc<dyn PersistenceSink>,
    announcer: Option<Box<dyn NotificationSink>>,
    disconnected: bool,
}

impl MarketPipeline {
    /// 설정으로 엔진들을 만들고 파이프라인을 구성합니다.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn PersistenceSink>,
        alert_sink: Box<dyn NotificationSink>,
    ) -> TraderResult<Self> {
        let indicators = IndicatorEngine::new(config.indicator)?;
        let alerts = AlertEngine::new(config.alerts, alert_sink)?;
        let trader = AutoTrader::new(config.auto_trader.clone(), config.risk)?;

        Ok(Self {
            symbols: config
                .market
                .symbols
                .iter()
                .map(|s| s.trim().to_uppercase())
                .collect(),
            timeframe: config.market.timeframe,
            history_limit: config.indicator.history_limit,
            indicators,
            alerts,
            trader,
            store,
            announcer: None,
            disconnected: false,
        })
    }

    /// 모의 매매 이벤트를 알릴 sink를 지정합니다.
    pub fn with_trade_announcer(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.announcer = Some(sink);
        self
    }

    /// 저장소의 거래/입금/설정 기록으로 자동 매매 엔진을 복원합니다.
    ///
    /// 입금 기록이 없는 저장소면 설정의 초기 자본 입금을 함께 기록합니다.
    pub async fn restore(&mut self) -> TraderResult<()> {
        let snapshot = self.store.load_snapshot().await?;
        info!(
            store = self.store.name(),
            trades = snapshot.trades.len(),
            deposits = snapshot.deposits.len(),
            "저장된 기록 복원"
        );
        let events = self.trader.restore(snapshot)?;
        self.record(&events).await;
        Ok(())
    }

    /// 모든 심볼의 가격 윈도우를 스냅샷으로 채웁니다.
    ///
    /// 실패한 심볼은 로그만 남기고 빈 윈도우로 둡니다. 시드된 심볼 수를 반환합니다.
    pub async fn bootstrap(&mut self, feed: &dyn MarketFeed) -> usize {
        let mut seeded = 0;
        for symbol in &self.symbols {
            let history = match feed
                .historical_closes(symbol, self.timeframe, self.history_limit)
                .await
            {
                Ok(history) => history,
                Err(e) => {
                    warn!(symbol = %symbol, feed = feed.name(), error = %e, "히스토리 조회 실패");
                    continue;
                }
            };
            match self.indicators.initialize(symbol, &history) {
                Ok(reading) => {
                    debug!(symbol = %symbol, rsi = ?reading.rsi, "심볼 시드 완료");
                    seeded += 1;
                }
                Err(e) => warn!(symbol = %symbol, error = %e, "히스토리 초기화 실패"),
            }
        }
        info!(seeded, total = self.symbols.len(), "가격 윈도우 시드");
        seeded
    }

    /// 피드 이벤트 하나를 처리하고 발생한 매매 이벤트를 반환합니다.
    pub async fn handle_event(
        &mut self,
        feed: &dyn MarketFeed,
        event: FeedEvent,
    ) -> TraderResult<Vec<TradeEvent>> {
        let events = match event {
            FeedEvent::Tick { symbol, price, at } => {
                let reading = self.indicators.on_live_tick_at(&symbol, price, at)?;
                self.trader.on_reading(&reading)?
            }
            FeedEvent::CandleClose { symbol, close, at } => {
                let reading = self.indicators.on_candle_close_at(&symbol, close, at)?;
                self.on_closed_reading(&reading)?
            }
            FeedEvent::Disconnected { reason } => {
                warn!(reason = %reason, "피드 연결 끊김");
                self.disconnected = true;
                Vec::new()
            }
            FeedEvent::Connected => {
                if self.disconnected {
                    self.reseed(feed).await;
                }
                Vec::new()
            }
        };

        self.record(&events).await;
        Ok(events)
    }

    fn on_closed_reading(&mut self, reading: &IndicatorReading) -> TraderResult<Vec<TradeEvent>> {
        match self.alerts.on_reading(reading) {
            AlertChange::Unchanged => {}
            change => debug!(symbol = %reading.symbol, change = ?change, "알림 상태 변경"),
        }
        Ok(self.trader.on_reading(reading)?)
    }

    /// 재연결 후 전체 상태를 다시 시드합니다.
    async fn reseed(&mut self, feed: &dyn MarketFeed) {
        info!("재연결 감지, 가격 윈도우 재시드");
        self.indicators.clear();
        self.trader.reset_triggers();
        self.alerts.reset_notifications();
        self.bootstrap(feed).await;
        self.disconnected = false;
    }

    /// 구독 스트림이 끝날 때까지 이벤트를 처리합니다.
    pub async fn run(&mut self, feed: &dyn MarketFeed) -> TraderResult<()> {
        let mut rx = feed.subscribe(&self.symbols, self.timeframe).await?;
        info!(feed = feed.name(), symbols = ?self.symbols, timeframe = %self.timeframe, "피드 구독 시작");

        while let Some(event) = rx.recv().await {
            if let Err(e) = self.handle_event(feed, event).await {
                warn!(error = %e, "피드 이벤트 처리 실패");
            }
        }

        info!("피드 스트림 종료");
        Ok(())
    }

    /// 입금을 반영하고 기록합니다.
    pub async fn deposit(&mut self, amount: Decimal) -> TraderResult<()> {
        let event = self.trader.deposit(amount)?;
        self.record(std::slice::from_ref(&event)).await;
        Ok(())
    }

    /// 자동 매매 설정을 바꾸고 기록합니다.
    pub async fn update_settings(&mut self, settings: AutoTraderSettings) -> TraderResult<()> {
        let events = self.trader.update_settings(settings)?;
        self.record(&events).await;
        Ok(())
    }

    async fn record(&self, events: &[TradeEvent]) {
        persist_events(self.store.as_ref(), events).await;
        if let Some(announcer) = &self.announcer {
            for position in events.iter().filter_map(TradeEvent::position) {
                if let Err(e) = announcer.notify(&position_message(position)) {
                    warn!(symbol = %position.symbol, error = %e, "매매 알림 실패");
                }
            }
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn indicators(&self) -> &IndicatorEngine {
        &self.indicators
    }

    pub fn alerts(&self) -> &AlertEngine {
        &self.alerts
    }

    pub fn trader(&self) -> &AutoTrader {
        &self.trader
    }
}

/// 매매 이벤트를 저장소에 기록합니다.
///
/// 엔진 상태는 이미 바뀌었으므로 실패는 로그만 남깁니다. 실패한 기록 수를 반환합니다.
pub async fn persist_events(store: &dyn PersistenceSink, events: &[TradeEvent]) -> usize {
    let mut failures = 0;
    for event in events {
        let result = match event {
            TradeEvent::Opened(position) | TradeEvent::Missed(position) => {
                store.append_trade(position).await
            }
            TradeEvent::Closed(position) => match position.close_update() {
                Some(update) => store.update_trade(position.id, &update).await,
                None => Ok(()),
            },
            TradeEvent::Deposited(deposit) => store.append_deposit(deposit).await,
            TradeEvent::SettingsChanged(settings) => store.save_settings(settings).await,
        };
        if let Err(e) = result {
            warn!(store = store.name(), error = %e, "기록 저장 실패");
            failures += 1;
        }
    }
    failures
}
