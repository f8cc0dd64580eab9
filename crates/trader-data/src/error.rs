//! 데이터 모듈 오류 타입.

use thiserror::Error;
use trader_core::TraderError;
use uuid::Uuid;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DataError {
    /// 존재하지 않는 포지션 ID.
    pub fn trade_not_found(id: Uuid) -> Self {
        DataError::NotFound(format!("trade {id}"))
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<DataError> for TraderError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => TraderError::NotFound(msg),
            DataError::SerializationError(msg) => TraderError::Serialization(msg),
            DataError::ConfigError(msg) => TraderError::Config(msg),
            other => TraderError::Data(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
