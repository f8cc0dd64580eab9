//! RSI 지표 계산 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Wilder 평활 RSI ([`indicators::rsi`], [`indicators::rsi_series`])
//! - 심볼별 롤링 가격 윈도우 ([`PriceSeries`])
//! - 캔들 마감/실시간 틱을 판독값으로 바꾸는 상태 엔진 ([`IndicatorEngine`])

pub mod engine;
pub mod indicators;
pub mod series;

pub use engine::IndicatorEngine;
pub use indicators::{rsi, rsi_series, IndicatorError, IndicatorResult, MomentumCalculator, RsiParams};
pub use series::PriceSeries;
