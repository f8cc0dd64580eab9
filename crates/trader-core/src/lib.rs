//! # Trader Core
//!
//! RSI 감시 및 모의 자동 매매 시스템의 핵심 도메인 타입을 제공합니다:
//! - 지표 판독값과 알림 레코드
//! - 모의 포지션, 입금 기록, 자본 장부
//! - 포트폴리오 통계 (순수 함수)
//! - 설정 관리와 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
