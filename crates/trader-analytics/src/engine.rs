//! 심볼별 RSI 지표 엔진.
//!
//! 엔진은 심볼마다 `PriceSeries`를 소유하고, 캔들 마감 시 윈도우를 갱신한 뒤
//! 전체 윈도우에 대해 RSI를 다시 계산합니다. 실시간 틱은 마지막 슬롯만 바꾼
//! 잠정 판독값을 만들며 저장된 히스토리는 건드리지 않습니다.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info};
use trader_core::{IndicatorConfig, IndicatorReading};

use crate::indicators::{IndicatorError, IndicatorResult, MomentumCalculator, RsiParams};
use crate::series::PriceSeries;

/// 심볼별 상태.
#[derive(Debug, Clone)]
struct SymbolState {
    series: PriceSeries,
    latest: Option<IndicatorReading>,
}

/// RSI 지표 엔진.
#[derive(Debug)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
    calculator: MomentumCalculator,
    symbols: HashMap<String, SymbolState>,
}

impl IndicatorEngine {
    /// 검증된 설정으로 엔진을 생성합니다.
    pub fn new(config: IndicatorConfig) -> IndicatorResult<Self> {
        config
            .validate()
            .map_err(|e| IndicatorError::InvalidParameter(e.to_string()))?;
        Ok(Self {
            config,
            calculator: MomentumCalculator::new(RsiParams {
                period: config.period,
            }),
            symbols: HashMap::new(),
        })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// 히스토리로 심볼의 윈도우를 (재)설정하고 마지막 가격의 판독값을 반환합니다.
    ///
    /// 빈 히스토리나 유효하지 않은 가격이 있으면 아무것도 변경하지 않습니다.
    pub fn initialize(&mut self, symbol: &str, history: &[f64]) -> IndicatorResult<IndicatorReading> {
        self.initialize_at(symbol, history, Utc::now())
    }

    /// `initialize`와 같지만 판독 시각을 지정합니다.
    pub fn initialize_at(
        &mut self,
        symbol: &str,
        history: &[f64],
        at: DateTime<Utc>,
    ) -> IndicatorResult<IndicatorReading> {
        if history.is_empty() {
            return Err(IndicatorError::InvalidInput(format!(
                "{symbol}: 초기화 히스토리가 비어 있습니다"
            )));
        }
        if let Some(bad) = history.iter().find(|p| !is_valid_price(**p)) {
            return Err(IndicatorError::InvalidInput(format!(
                "{symbol}: 유효하지 않은 히스토리 가격 {bad}"
            )));
        }

        let series = PriceSeries::seeded(self.config.history_limit, history);
        let rsi = self.calculator.rsi(&series.to_vec())?;
        let price = series.last().unwrap_or_default();
        let reading = IndicatorReading::new(symbol, price, rsi, at);

        info!(symbol, samples = series.len(), rsi = ?rsi, "가격 윈도우 초기화");
        self.symbols.insert(
            symbol.to_string(),
            SymbolState {
                series,
                latest: Some(reading.clone()),
            },
        );
        Ok(reading)
    }

    /// 캔들 마감 가격을 반영하고 새 판독값을 반환합니다.
    ///
    /// 처음 보는 심볼은 빈 윈도우에서 시작합니다.
    pub fn on_candle_close(&mut self, symbol: &str, close: f64) -> IndicatorResult<IndicatorReading> {
        self.on_candle_close_at(symbol, close, Utc::now())
    }

    /// `on_candle_close`와 같지만 판독 시각을 지정합니다.
    pub fn on_candle_close_at(
        &mut self,
        symbol: &str,
        close: f64,
        at: DateTime<Utc>,
    ) -> IndicatorResult<IndicatorReading> {
        ensure_price(symbol, close)?;

        let capacity = self.config.history_limit;
        let state = self
            .symbols
            .entry(symbol.to_string())
            .or_insert_with(|| SymbolState {
                series: PriceSeries::new(capacity),
                latest: None,
            });
        state.series.push(close);

        let rsi = self.calculator.rsi(&state.series.to_vec())?;
        let reading = IndicatorReading::new(symbol, close, rsi, at);
        state.latest = Some(reading.clone());

        debug!(symbol, close, rsi = ?rsi, "캔들 마감");
        Ok(reading)
    }

    /// 실시간 틱에 대한 잠정 판독값을 반환합니다. 저장된 히스토리는 변경되지 않습니다.
    pub fn on_live_tick(&mut self, symbol: &str, price: f64) -> IndicatorResult<IndicatorReading> {
        self.on_live_tick_at(symbol, price, Utc::now())
    }

    /// `on_live_tick`과 같지만 판독 시각을 지정합니다.
    pub fn on_live_tick_at(
        &mut self,
        symbol: &str,
        price: f64,
        at: DateTime<Utc>,
    ) -> IndicatorResult<IndicatorReading> {
        ensure_price(symbol, price)?;

        let rsi = match self.symbols.get(symbol) {
            Some(state) if !state.series.is_empty() => {
                self.calculator.rsi(&state.series.with_last_replaced(price))?
            }
            _ => None,
        };
        let reading = IndicatorReading::new(symbol, price, rsi, at).provisional();

        if let Some(state) = self.symbols.get_mut(symbol) {
            state.latest = Some(reading.clone());
        }
        Ok(reading)
    }

    /// 심볼의 최신 판독값.
    pub fn reading(&self, symbol: &str) -> Option<&IndicatorReading> {
        self.symbols.get(symbol).and_then(|s| s.latest.as_ref())
    }

    /// 모든 심볼의 최신 판독값 (심볼 순).
    pub fn readings(&self) -> Vec<&IndicatorReading> {
        let mut readings: Vec<&IndicatorReading> = self
            .symbols
            .values()
            .filter_map(|s| s.latest.as_ref())
            .collect();
        readings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        readings
    }

    /// 심볼의 저장된 윈도우 길이.
    pub fn window_len(&self, symbol: &str) -> usize {
        self.symbols.get(symbol).map_or(0, |s| s.series.len())
    }

    /// 모든 윈도우를 버립니다. 재연결 후 전체 재시드 전에 호출합니다.
    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn ensure_price(symbol: &str, price: f64) -> IndicatorResult<()> {
    if is_valid_price(price) {
        Ok(())
    } else {
        Err(IndicatorError::InvalidInput(format!(
            "{symbol}: 가격은 유한한 양수여야 합니다: {price}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(period: usize, history_limit: usize) -> IndicatorEngine {
        IndicatorEngine::new(IndicatorConfig {
            period,
            history_limit,
        })
        .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(IndicatorEngine::new(IndicatorConfig {
            period: 14,
            history_limit: 10
        })
        .is_err());
    }

    #[test]
    fn test_initialize_caps_history() {
        let mut engine = engine(3, 5);
        let history: Vec<f64> = (1..=10).map(f64::from).collect();
        let reading = engine.initialize("BTCUSDT", &history).unwrap();

        assert_eq!(engine.window_len("BTCUSDT"), 5);
        assert_eq!(reading.price, 10.0);
        assert_eq!(reading.rsi, Some(100.0));
        assert!(!reading.provisional);
    }

    #[test]
    fn test_initialize_rejects_invalid_without_mutation() {
        let mut engine = engine(3, 5);
        engine.initialize("BTCUSDT", &[1.0, 2.0, 3.0]).unwrap();

        assert!(engine.initialize("BTCUSDT", &[]).is_err());
        assert!(engine.initialize("BTCUSDT", &[1.0, f64::NAN]).is_err());
        assert_eq!(engine.window_len("BTCUSDT"), 3);
        assert!(engine.initialize("ETHUSDT", &[0.0]).is_err());
        assert!(engine.reading("ETHUSDT").is_none());
    }

    #[test]
    fn test_cold_start_null_until_period_plus_one() {
        let mut engine = engine(3, 10);
        let r1 = engine.on_candle_close("ETHUSDT", 10.0).unwrap();
        let r2 = engine.on_candle_close("ETHUSDT", 11.0).unwrap();
        let r3 = engine.on_candle_close("ETHUSDT", 10.5).unwrap();
        assert!(r1.rsi.is_none() && r2.rsi.is_none() && r3.rsi.is_none());

        let r4 = engine.on_candle_close("ETHUSDT", 10.8).unwrap();
        assert!(r4.rsi.is_some());
    }

    #[test]
    fn test_candle_close_rejects_non_finite() {
        let mut engine = engine(3, 10);
        engine.initialize("BTCUSDT", &[1.0, 2.0]).unwrap();
        let err = engine.on_candle_close("BTCUSDT", f64::INFINITY).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidInput(_)));
        assert_eq!(engine.window_len("BTCUSDT"), 2);
    }

    #[test]
    fn test_live_tick_is_provisional_and_non_mutating() {
        let mut engine = engine(3, 10);
        engine
            .initialize("BTCUSDT", &[10.0, 11.0, 12.0, 13.0])
            .unwrap();

        let tick = engine.on_live_tick("BTCUSDT", 9.0).unwrap();
        assert!(tick.provisional);
        let expected = crate::indicators::rsi(&[10.0, 11.0, 12.0, 9.0], 3).unwrap();
        assert_eq!(tick.rsi, expected);
        assert_eq!(engine.window_len("BTCUSDT"), 4);
        assert_eq!(engine.reading("BTCUSDT"), Some(&tick));

        // 틱 이후 캔들 마감은 틱 가격이 아닌 저장된 윈도우 위에서 계산된다
        let close = engine.on_candle_close("BTCUSDT", 14.0).unwrap();
        assert_eq!(close.rsi, Some(100.0));
    }

    #[test]
    fn test_live_tick_on_empty_window() {
        let mut engine = engine(3, 10);
        let tick = engine.on_live_tick("SOLUSDT", 20.0).unwrap();
        assert!(tick.rsi.is_none());
        assert!(engine.reading("SOLUSDT").is_none());
    }

    #[test]
    fn test_clear_drops_windows() {
        let mut engine = engine(3, 10);
        engine.initialize("BTCUSDT", &[1.0, 2.0]).unwrap();
        engine.initialize("ETHUSDT", &[3.0, 4.0]).unwrap();
        assert_eq!(engine.readings().len(), 2);
        assert_eq!(engine.readings()[0].symbol, "BTCUSDT");

        engine.clear();
        assert!(engine.readings().is_empty());
        assert_eq!(engine.window_len("BTCUSDT"), 0);
    }
}
