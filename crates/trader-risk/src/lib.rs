//! 리스크 관리 시스템.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 가용 자본 기반 포지션 사이징
//! - 진입가 기준 Stop-loss/Take-profit 가격 계산
//! - 현재가에 대한 청산 판정
//!
//! # 예제
//!
//! ```
//! use rust_decimal_macros::dec;
//! use trader_core::RiskConfig;
//! use trader_risk::{PositionSizer, SizingDecision, StopOrderGenerator};
//!
//! let levels = StopOrderGenerator::new(RiskConfig::default()).exit_levels(dec!(50000));
//! assert_eq!(levels.take_profit, dec!(51000));
//!
//! let decision = PositionSizer::new().size(dec!(1000), 10.0, dec!(50000));
//! assert!(matches!(decision, SizingDecision::Open { .. }));
//! ```

pub mod position_sizing;
pub mod stop_loss;

// 주요 타입 재내보내기
pub use position_sizing::{PositionSizer, SizingDecision, AMOUNT_SCALE, QUANTITY_SCALE};
pub use stop_loss::{ExitLevels, ExitReason, StopOrderGenerator};
pub use trader_core::RiskConfig;
