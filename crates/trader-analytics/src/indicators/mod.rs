//! 기술적 지표 모듈.
//!
//! # 지원 지표
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Relative Strength Index, Wilder 평활)
//!
//! # 사용 예시
//!
//! ```
//! use trader_analytics::indicators::rsi;
//!
//! let prices = [44.0, 44.5, 43.9, 44.8, 45.2];
//! let value = rsi(&prices, 3).unwrap();
//! assert!(value.is_some());
//! ```

pub mod momentum;

use thiserror::Error;
use trader_core::TraderError;

pub use momentum::{rsi, rsi_series, MomentumCalculator, RsiParams};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 비유한 값이나 0 이하 가격
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

impl From<IndicatorError> for TraderError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InvalidInput(msg) => TraderError::InvalidInput(msg),
            IndicatorError::InvalidParameter(msg) => TraderError::Config(msg),
        }
    }
}
