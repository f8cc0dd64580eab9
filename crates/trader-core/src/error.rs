//! RSI 감시 시스템의 에러 타입.
//!
//! 엔진 전반에서 공유하는 에러 분류를 정의합니다.
//! 데이터 부족(RSI 미산출)은 에러가 아니라 `None` 값으로 표현됩니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum TraderError {
    /// 잘못된 입력 (비유한 가격, 0 이하 입금액 등). 상태는 변경되지 않습니다.
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type TraderResult<T> = Result<T, TraderError>;

impl TraderError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TraderError::Network(_))
    }

    /// 호출자 입력 문제로 거부된 에러인지 확인합니다.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, TraderError::InvalidInput(_))
    }
}

impl From<serde_json::Error> for TraderError {
    fn from(err: serde_json::Error) -> Self {
        TraderError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for TraderError {
    fn from(err: config::ConfigError) -> Self {
        TraderError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let network_err = TraderError::Network("timeout".to_string());
        assert!(network_err.is_retryable());

        let input_err = TraderError::InvalidInput("NaN price".to_string());
        assert!(!input_err.is_retryable());
        assert!(input_err.is_invalid_input());
    }

    #[test]
    fn test_error_display() {
        let err = TraderError::InvalidInput("deposit must be positive".to_string());
        assert_eq!(err.to_string(), "잘못된 입력: deposit must be positive");
    }
}
