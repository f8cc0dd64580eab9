//! RSI 감시 파이프라인과 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 피드 이벤트를 엔진들에 전달하는 [`MarketPipeline`]
//! - `trader` 바이너리의 명령어 구현 (실행, RSI 조회, 통계, 입금)

pub mod commands;
pub mod pipeline;

pub use pipeline::{persist_events, MarketPipeline};
