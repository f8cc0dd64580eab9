//! 모의 자동 매매 실행.
//!
//! 이 crate는 다음을 제공합니다:
//! - RSI 진입/회복 트리거 상태 머신
//! - 익절/손절 청산과 `Missed` 포지션을 포함한 포지션 생명주기
//! - 입금 기반 자본 장부와 포트폴리오 통계
//!
//! # 예제
//!
//! ```
//! use chrono::Utc;
//! use rust_decimal_macros::dec;
//! use trader_core::{AutoTraderConfig, IndicatorReading, RiskConfig};
//! use trader_execution::{AutoTrader, TradeEvent};
//!
//! let mut config = AutoTraderConfig::default();
//! config.settings.is_active = true;
//! // 초기 자본은 `settings.capital`(기본 1000)로 입금됩니다
//! let mut trader = AutoTrader::new(config, RiskConfig::default()).unwrap();
//! assert_eq!(trader.ledger().available, dec!(1000));
//!
//! let events = trader
//!     .on_reading(&IndicatorReading::new("BTCUSDT", 50000.0, Some(22.0), Utc::now()))
//!     .unwrap();
//! assert!(matches!(events[0], TradeEvent::Opened(_)));
//! ```

pub mod auto_trader;
pub mod error;

// 주요 타입 재내보내기
pub use auto_trader::{AutoTrader, TradeEvent, TriggerState};
pub use error::{ExecutionError, ExecutionResult};
