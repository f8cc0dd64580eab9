//! 재생용 피드.
//!
//! 미리 준비한 종가 히스토리와 이벤트 목록을 그대로 재생합니다.
//! 파이프라인 테스트와 오프라인 점검에 사용합니다.

mod replay;

pub use replay::ReplayFeed;
