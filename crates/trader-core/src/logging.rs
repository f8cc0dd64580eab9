//! tracing 구독자 초기화.
//!
//! `run` 명령은 설정 파일의 `[logging]` 섹션을, 단발성 명령어는 `RUST_LOG`와
//! `LOG_FORMAT` 환경 변수를 사용합니다. `RUST_LOG`가 있으면 항상 레벨 설정보다 우선합니다.

use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{TraderError, TraderResult};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// 로그 수집기용 한 줄 JSON
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(TraderError::Config(format!("알 수 없는 로그 형식: {s}"))),
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG`, `LOG_FORMAT`에서 읽습니다. 없거나 잘못된 값은 기본값입니다.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: std::env::var("RUST_LOG").unwrap_or(defaults.level),
            format: std::env::var("LOG_FORMAT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.format),
        }
    }
}

/// 전역 tracing 구독자를 설치합니다. 프로세스당 한 번만 성공합니다.
pub fn init_logging(config: &LoggingConfig) -> TraderResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| TraderError::Config(format!("로그 레벨 필터 오류: {e}")))?;
    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer().with_target(true);

    match config.format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    }
    .map_err(|e| TraderError::Config(format!("로깅 초기화 실패: {e}")))?;

    tracing::debug!(level = %config.level, format = ?config.format, "로깅 초기화");
    Ok(())
}

/// 환경 변수 설정으로 [`init_logging`]을 호출합니다.
pub fn init_logging_from_env() -> TraderResult<()> {
    init_logging(&LoggingConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!(
            "verbose".parse::<LogFormat>(),
            Err(TraderError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_level_filter_is_config_error() {
        // RUST_LOG가 설정된 환경에서는 필터가 그쪽에서 만들어지므로 검사하지 않는다
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "trader_core=loud".to_string(),
            format: LogFormat::Compact,
        };
        assert!(matches!(init_logging(&config), Err(TraderError::Config(_))));
    }
}
