//! 설정 관리.
//!
//! TOML 파일과 `TRADER__` 접두사 환경 변수에서 애플리케이션 설정을 로드합니다.
//! 모든 섹션은 기본값을 가지므로 설정 파일에는 바꾸려는 값만 적으면 됩니다.
//!
//! ```toml
//! [market]
//! symbols = ["BTCUSDT", "ETHUSDT"]
//! timeframe = "1h"
//!
//! [auto_trader]
//! entry_threshold = 25.0
//! recovery_threshold = 40.0
//! ```

use chrono::Duration;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::{AlertSide, AlertTier, AutoTraderSettings};
use crate::error::{TraderError, TraderResult};
use crate::logging::LogFormat;
use crate::types::Timeframe;

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 감시 대상 시장 설정
    #[serde(default)]
    pub market: MarketConfig,
    /// 지표 설정
    #[serde(default)]
    pub indicator: IndicatorConfig,
    /// 알림 엔진 설정
    #[serde(default)]
    pub alerts: AlertConfig,
    /// 자동 매매 설정
    #[serde(default)]
    pub auto_trader: AutoTraderConfig,
    /// 익절/손절 설정
    #[serde(default)]
    pub risk: RiskConfig,
    /// 시세 피드 설정
    #[serde(default)]
    pub feed: FeedConfig,
    /// 알림 전송 설정
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// 저장소 설정
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// 감시 대상 시장 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// 고정 심볼 목록
    pub symbols: Vec<String>,
    /// 캔들 타임프레임
    pub timeframe: Timeframe,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            timeframe: Timeframe::H1,
        }
    }
}

/// 지표 설정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// RSI 기간
    pub period: usize,
    /// 심볼별 가격 윈도우 최대 길이
    pub history_limit: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            period: 14,
            history_limit: 100,
        }
    }
}

impl IndicatorConfig {
    /// 기간과 윈도우 길이를 검증합니다.
    pub fn validate(&self) -> TraderResult<()> {
        if self.period == 0 {
            return Err(TraderError::Config("indicator.period는 1 이상이어야 합니다".into()));
        }
        if self.history_limit <= self.period {
            return Err(TraderError::Config(format!(
                "indicator.history_limit({})는 period({})보다 커야 합니다",
                self.history_limit, self.period
            )));
        }
        Ok(())
    }
}

/// 한 방향(과매도/과매수)의 알림 임계값.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AlertZoneConfig {
    /// 이 방향의 알림 사용 여부
    pub enabled: bool,
    /// 경고 레벨
    pub weak_level: f64,
    /// 신호 레벨 (경고 레벨보다 극단적)
    pub strong_level: f64,
    /// 경고 레코드의 리셋 임계값
    pub weak_recovery: f64,
    /// 신호 레코드의 리셋 임계값
    pub strong_recovery: f64,
    /// 경고 알림 상태의 리셋 임계값
    pub notify_weak_reset: f64,
    /// 신호 알림 상태의 리셋 임계값
    pub notify_strong_reset: f64,
}

impl AlertZoneConfig {
    /// 과매도 기본값 (30/25, 회복 40/35).
    pub fn oversold() -> Self {
        Self {
            enabled: true,
            weak_level: 30.0,
            strong_level: 25.0,
            weak_recovery: 40.0,
            strong_recovery: 35.0,
            notify_weak_reset: 40.0,
            notify_strong_reset: 35.0,
        }
    }

    /// 과매수 기본값 (70/75, 회복 60/65). 기본적으로 비활성입니다.
    pub fn overbought() -> Self {
        Self {
            enabled: false,
            weak_level: 70.0,
            strong_level: 75.0,
            weak_recovery: 60.0,
            strong_recovery: 65.0,
            notify_weak_reset: 60.0,
            notify_strong_reset: 65.0,
        }
    }

    /// 강도별 트리거 레벨.
    pub fn level(&self, tier: AlertTier) -> f64 {
        match tier {
            AlertTier::Weak => self.weak_level,
            AlertTier::Strong => self.strong_level,
        }
    }

    /// 강도별 알림 레코드 회복 임계값.
    pub fn recovery(&self, tier: AlertTier) -> f64 {
        match tier {
            AlertTier::Weak => self.weak_recovery,
            AlertTier::Strong => self.strong_recovery,
        }
    }

    /// 강도별 전송 상태 리셋 임계값.
    pub fn notify_reset(&self, tier: AlertTier) -> f64 {
        match tier {
            AlertTier::Weak => self.notify_weak_reset,
            AlertTier::Strong => self.notify_strong_reset,
        }
    }

    /// RSI가 돌파한 가장 강한 레벨을 반환합니다.
    pub fn breach(&self, side: AlertSide, rsi: f64) -> Option<AlertTier> {
        [AlertTier::Strong, AlertTier::Weak]
            .into_iter()
            .find(|tier| side.breaches(rsi, self.level(*tier)))
    }

    /// 임계값 순서와 히스테리시스 간격을 검증합니다.
    pub fn validate(&self, side: AlertSide) -> TraderResult<()> {
        let in_range = [
            self.weak_level,
            self.strong_level,
            self.weak_recovery,
            self.strong_recovery,
            self.notify_weak_reset,
            self.notify_strong_reset,
        ]
        .iter()
        .all(|v| v.is_finite() && (0.0..=100.0).contains(v));
        if !in_range {
            return Err(TraderError::Config(format!(
                "{side} 임계값은 0~100 사이여야 합니다"
            )));
        }
        if self.strong_level == self.weak_level || !side.breaches(self.strong_level, self.weak_level)
        {
            return Err(TraderError::Config(format!(
                "{side} strong_level({})은 weak_level({})보다 극단적이어야 합니다",
                self.strong_level, self.weak_level
            )));
        }
        let pairs = [
            ("weak_recovery", self.weak_recovery, self.weak_level),
            ("strong_recovery", self.strong_recovery, self.strong_level),
            ("notify_weak_reset", self.notify_weak_reset, self.weak_level),
            ("notify_strong_reset", self.notify_strong_reset, self.strong_level),
        ];
        for (name, threshold, level) in pairs {
            if !side.recovered(threshold, level) {
                return Err(TraderError::Config(format!(
                    "{side} {name}({threshold})는 트리거 레벨({level})과 달라야 하며 중립 쪽에 있어야 합니다"
                )));
            }
        }
        Ok(())
    }
}

/// 알림 엔진 설정.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// 과매도 구간
    pub oversold: AlertZoneConfig,
    /// 과매수 구간
    pub overbought: AlertZoneConfig,
    /// 알림 레코드 유지 시간 (시간)
    pub ttl_hours: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            oversold: AlertZoneConfig::oversold(),
            overbought: AlertZoneConfig::overbought(),
            ttl_hours: 24,
        }
    }
}

impl AlertConfig {
    /// 레코드 TTL.
    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours)
    }

    /// 방향별 구간 설정을 반환합니다. 비활성 구간은 `None`입니다.
    pub fn zone(&self, side: AlertSide) -> Option<&AlertZoneConfig> {
        let zone = match side {
            AlertSide::Oversold => &self.oversold,
            AlertSide::Overbought => &self.overbought,
        };
        zone.enabled.then_some(zone)
    }

    pub fn validate(&self) -> TraderResult<()> {
        if self.ttl_hours <= 0 {
            return Err(TraderError::Config("alerts.ttl_hours는 양수여야 합니다".into()));
        }
        self.oversold.validate(AlertSide::Oversold)?;
        self.overbought.validate(AlertSide::Overbought)?;
        if self.oversold.enabled
            && self.overbought.enabled
            && self.oversold.weak_level >= self.overbought.weak_level
        {
            return Err(TraderError::Config(
                "과매도 구간과 과매수 구간이 겹칩니다".into(),
            ));
        }
        Ok(())
    }
}

/// 자동 매매 설정.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutoTraderConfig {
    /// 진입 임계값 (RSI ≤ 값)
    pub entry_threshold: f64,
    /// 트리거 리셋 임계값 (RSI > 값)
    pub recovery_threshold: f64,
    /// 설정의 capital 변경 시 가용 자본을 재조정할지 여부
    pub reset_capital_on_settings_change: bool,
    /// 초기 사용자 설정 (저장된 설정이 없을 때 사용)
    pub settings: AutoTraderSettings,
}

impl Default for AutoTraderConfig {
    fn default() -> Self {
        Self {
            entry_threshold: 25.0,
            recovery_threshold: 40.0,
            reset_capital_on_settings_change: false,
            settings: AutoTraderSettings::default(),
        }
    }
}

impl AutoTraderConfig {
    pub fn validate(&self) -> TraderResult<()> {
        if !self.entry_threshold.is_finite() || !self.recovery_threshold.is_finite() {
            return Err(TraderError::Config("자동 매매 임계값은 유한해야 합니다".into()));
        }
        if self.recovery_threshold <= self.entry_threshold {
            return Err(TraderError::Config(format!(
                "auto_trader.recovery_threshold({})는 entry_threshold({})보다 커야 합니다",
                self.recovery_threshold, self.entry_threshold
            )));
        }
        self.settings
            .validate()
            .map_err(|e| TraderError::Config(e.to_string()))
    }
}

/// 익절/손절 설정.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// 진입가 대비 익절 비율 (기본값: 2%)
    pub take_profit_pct: f64,
    /// 진입가 대비 손절 비율 (기본값: 1%)
    pub stop_loss_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            take_profit_pct: 2.0,
            stop_loss_pct: 1.0,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> TraderResult<()> {
        if !(self.take_profit_pct.is_finite() && self.take_profit_pct > 0.0) {
            return Err(TraderError::Config(format!(
                "risk.take_profit_pct는 양수여야 합니다: {}",
                self.take_profit_pct
            )));
        }
        if !(self.stop_loss_pct.is_finite() && self.stop_loss_pct > 0.0 && self.stop_loss_pct < 100.0)
        {
            return Err(TraderError::Config(format!(
                "risk.stop_loss_pct는 (0, 100) 범위여야 합니다: {}",
                self.stop_loss_pct
            )));
        }
        Ok(())
    }
}

/// 시세 피드 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// REST API 기본 URL
    pub rest_base_url: String,
    /// WebSocket 기본 URL
    pub ws_base_url: String,
    /// 비정상 종료 후 재연결 대기 시간 (초)
    pub reconnect_delay_secs: u64,
    /// REST 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.binance.com".to_string(),
            ws_base_url: "wss://stream.binance.com:9443".to_string(),
            reconnect_delay_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

/// 알림 전송 설정.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// 텔레그램 설정
    pub telegram: TelegramConfig,
    /// 매매 이벤트(진입/청산/미진입)도 알림으로 보낼지 여부
    pub announce_trades: bool,
}

/// 텔레그램 알림 설정.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 봇 토큰
    pub bot_token: Option<SecretString>,
    /// 채팅 ID
    pub chat_id: String,
}

/// 저장소 종류.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    /// 메모리 전용 (재시작 시 유실)
    #[default]
    Memory,
    /// JSON 파일
    Json,
}

/// 저장소 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: PersistenceBackend,
    /// JSON 파일 경로
    pub path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::Memory,
            path: PathBuf::from("data/rsi-watch.json"),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드하고 검증합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> TraderResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TRADER")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    /// TOML 문자열에서 설정을 로드합니다. 환경 변수는 적용되지 않습니다.
    pub fn from_toml_str(toml: &str) -> TraderResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml));
        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> TraderResult<Self> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 섹션 간 일관성을 검증합니다.
    pub fn validate(&self) -> TraderResult<()> {
        if self.market.symbols.is_empty() {
            return Err(TraderError::Config("market.symbols가 비어 있습니다".into()));
        }
        if self.market.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(TraderError::Config("빈 심볼 이름이 있습니다".into()));
        }
        self.indicator.validate()?;
        self.alerts.validate()?;
        self.auto_trader.validate()?;
        self.risk.validate()?;
        if self.notifications.telegram.enabled
            && (self.notifications.telegram.bot_token.is_none()
                || self.notifications.telegram.chat_id.is_empty())
        {
            return Err(TraderError::Config(
                "텔레그램이 활성화되었지만 bot_token 또는 chat_id가 없습니다".into(),
            ));
        }
        Ok(())
    }
}
