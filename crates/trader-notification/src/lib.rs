//! # Trader Notification
//!
//! RSI 알림 엔진과 알림 전송.
//!
//! 구성:
//! - `AlertEngine`: 알림 레코드 집계/리셋/만료와 전송 상태 추적
//! - `NotificationSink`: 엔진이 호출하는 동기 sink (`LogSink`, `ChannelSink`)
//! - `NotificationDispatcher`: 채널에서 받아 `TelegramSender` 등으로 전송
//!
//! ```
//! use trader_core::{AlertConfig, IndicatorReading};
//! use trader_notification::{AlertChange, AlertEngine, LogSink};
//!
//! let mut engine = AlertEngine::new(AlertConfig::default(), Box::new(LogSink)).unwrap();
//! let reading = IndicatorReading::new("BTCUSDT", 42000.0, Some(28.4), chrono::Utc::now());
//! assert_eq!(engine.on_reading(&reading), AlertChange::Created);
//! ```

pub mod alert_engine;
pub mod messages;
pub mod sinks;
pub mod telegram;
pub mod types;

pub use alert_engine::*;
pub use messages::*;
pub use sinks::*;
pub use telegram::*;
pub use types::*;
