//! 텔레그램 알림 서비스.
//!
//! Telegram Bot API의 `sendMessage`로 Markdown 메시지를 전송합니다.

use crate::types::{Notification, NotificationError, NotificationResult, NotificationSender};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use trader_core::TelegramConfig;

/// Telegram Bot API 기본 주소.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// 429 응답에 `retry_after`가 없을 때 사용하는 대기 시간(초).
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Bot API 응답 본문.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

/// 텔레그램 알림 전송기.
pub struct TelegramSender {
    bot_token: SecretString,
    chat_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl TelegramSender {
    /// 봇 토큰과 채팅 ID로 전송기를 생성합니다.
    pub fn new(bot_token: SecretString, chat_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            bot_token,
            chat_id: chat_id.into(),
            base_url: TELEGRAM_API_URL.to_string(),
            client,
        }
    }

    /// 설정에서 전송기를 생성합니다. 비활성화되어 있으면 `None`입니다.
    pub fn from_config(config: &TelegramConfig) -> NotificationResult<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let token = config
            .bot_token
            .as_ref()
            .ok_or_else(|| NotificationError::InvalidConfig("텔레그램 봇 토큰이 없습니다".into()))?;
        if config.chat_id.is_empty() {
            return Err(NotificationError::InvalidConfig(
                "텔레그램 채팅 ID가 없습니다".into(),
            ));
        }
        let token = SecretString::from(token.expose_secret().to_owned());
        Ok(Some(Self::new(token, config.chat_id.clone())))
    }

    /// API 주소를 바꿉니다 (테스트용 목 서버 등).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// 텔레그램에 원시 메시지를 전송합니다.
    pub async fn send_message(&self, text: &str) -> NotificationResult<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.base_url,
            self.bot_token.expose_secret()
        );

        let params = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        debug!(chat_id = %self.chat_id, "텔레그램 메시지 전송");

        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(|e| NotificationError::NetworkError(e.without_url()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        // 요청 한도 제한 확인
        if status.as_u16() == 429 {
            let retry_after = parsed
                .as_ref()
                .and_then(|r| r.parameters.as_ref())
                .and_then(|p| p.retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!(retry_after, "텔레그램 요청 한도 초과");
            return Err(NotificationError::RateLimited(retry_after));
        }

        match parsed {
            Some(api) if status.is_success() && api.ok => {
                info!("텔레그램 알림 전송 완료");
                Ok(())
            }
            other => {
                let description = other
                    .and_then(|api| api.description)
                    .unwrap_or(body);
                error!(status = %status, description = %description, "텔레그램 전송 실패");
                Err(NotificationError::SendFailed(format!(
                    "HTTP {}: {}",
                    status, description
                )))
            }
        }
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("텔레그램 알림 비활성화, 건너뜀");
            return Ok(());
        }
        self.send_message(&notification.text).await
    }

    fn is_enabled(&self) -> bool {
        !self.bot_token.expose_secret().is_empty() && !self.chat_id.is_empty()
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
