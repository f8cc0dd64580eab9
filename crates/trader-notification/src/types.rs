//! 알림 타입 및 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trader_core::TraderError;
use uuid::Uuid;

/// 전송할 알림 메시지.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// 고유 알림 ID
    pub id: Uuid,
    /// Markdown 본문
    pub text: String,
    /// 생성 시각
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// 본문으로 새 알림을 생성합니다.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// 알림 작업 결과 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// 전송 실패
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    /// 잘못된 설정
    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    /// 디스패처 채널이 닫힘
    #[error("알림 채널이 닫혔습니다")]
    ChannelClosed,

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<NotificationError> for TraderError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::InvalidConfig(msg) => TraderError::Config(msg),
            NotificationError::NetworkError(e) => TraderError::Network(e.to_string()),
            NotificationError::SerializationError(e) => TraderError::Serialization(e.to_string()),
            other => TraderError::Internal(other.to_string()),
        }
    }
}

/// 엔진에서 호출하는 동기 알림 sink.
///
/// 구현체는 블로킹하면 안 됩니다. 실제 전송은 `ChannelSink`처럼 큐에 넘기고
/// 다른 태스크에서 처리합니다.
pub trait NotificationSink: Send + Sync {
    /// 메시지를 전달합니다.
    fn notify(&self, message: &str) -> NotificationResult<()>;
}

/// 비동기 알림 전송기 trait.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 알림을 전송합니다.
    async fn send(&self, notification: &Notification) -> NotificationResult<()>;

    /// 전송기 활성화 여부.
    fn is_enabled(&self) -> bool;

    /// 전송기 이름.
    fn name(&self) -> &str;
}
