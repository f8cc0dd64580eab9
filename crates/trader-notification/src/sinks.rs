//! 엔진용 알림 sink와 디스패처.
//!
//! 엔진은 동기 `NotificationSink`만 알고, 실제 네트워크 전송은
//! `NotificationDispatcher` 태스크가 채널 너머에서 처리합니다.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::types::{
    Notification, NotificationError, NotificationResult, NotificationSender, NotificationSink,
};

/// 메시지를 로그로만 남기는 sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, message: &str) -> NotificationResult<()> {
        info!(message, "알림");
        Ok(())
    }
}

/// 디스패처 채널에 메시지를 넣는 논블로킹 sink.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// 송신 측으로 sink를 생성합니다.
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, message: &str) -> NotificationResult<()> {
        self.tx
            .send(Notification::new(message))
            .map_err(|_| NotificationError::ChannelClosed)
    }
}

/// 여러 전송기로 알림을 내보내는 디스패처.
#[derive(Default)]
pub struct NotificationDispatcher {
    senders: Vec<Box<dyn NotificationSender>>,
}

impl NotificationDispatcher {
    /// 새 디스패처를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 알림 전송기를 추가합니다.
    pub fn add_sender<S: NotificationSender + 'static>(&mut self, sender: S) {
        self.senders.push(Box::new(sender));
    }

    /// 활성화된 전송기 수.
    pub fn enabled_count(&self) -> usize {
        self.senders.iter().filter(|s| s.is_enabled()).count()
    }

    /// 활성화된 모든 전송기로 알림을 보냅니다.
    ///
    /// 실패는 로그로만 남기고 재시도하지 않습니다. 실패한 전송기 수를 반환합니다.
    pub async fn dispatch(&self, notification: &Notification) -> usize {
        let mut failures = 0;
        for sender in self.senders.iter().filter(|s| s.is_enabled()) {
            if let Err(e) = sender.send(notification).await {
                error!(sender = sender.name(), error = %e, "알림 전송 실패");
                failures += 1;
            }
        }
        failures
    }

    /// 채널을 만들고 수신 루프를 백그라운드 태스크로 실행합니다.
    ///
    /// 반환된 sink가 모두 drop되면 태스크가 종료됩니다.
    pub fn spawn(self) -> (ChannelSink, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(self.run(rx));
        (ChannelSink::new(tx), handle)
    }

    /// 채널이 닫힐 때까지 알림을 전달합니다.
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<Notification>) {
        debug!(senders = self.senders.len(), "알림 디스패처 시작");
        while let Some(notification) = rx.recv().await {
            self.dispatch(&notification).await;
        }
        debug!("알림 디스패처 종료");
    }
}
