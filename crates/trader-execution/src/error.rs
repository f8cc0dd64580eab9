//! 자동 매매 에러 타입.

use thiserror::Error;
use trader_core::TraderError;

/// 자동 매매 엔진 에러.
///
/// 모든 에러는 상태를 변경하기 전에 반환됩니다.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Ledger invariant violated: {0}")]
    LedgerInvariant(String),
}

/// 자동 매매 결과 타입.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

impl ExecutionError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ExecutionError::InvalidInput(_))
    }
}

impl From<TraderError> for ExecutionError {
    fn from(err: TraderError) -> Self {
        match err {
            TraderError::InvalidInput(msg) => ExecutionError::InvalidInput(msg),
            TraderError::Config(msg) => ExecutionError::InvalidSettings(msg),
            other => ExecutionError::LedgerInvariant(other.to_string()),
        }
    }
}

impl From<ExecutionError> for TraderError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::InvalidInput(msg) => TraderError::InvalidInput(msg),
            ExecutionError::InvalidSettings(msg) => TraderError::Config(msg),
            ExecutionError::LedgerInvariant(msg) => TraderError::Internal(msg),
        }
    }
}
