//! 시장 데이터 피드.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `MarketFeed` trait: 종가 스냅샷과 틱/캔들 마감 이벤트 구독
//! - Binance 커넥터 (REST klines + 결합 WebSocket 스트림, 자동 재연결)
//! - 재생 피드 (테스트 및 오프라인 점검용)

pub mod connector;
pub mod error;
pub mod provider;
pub mod simulated;
pub mod traits;
pub mod websocket;

pub use connector::binance::BinanceClient;
pub use error::*;
pub use provider::BinanceFeed;
pub use simulated::ReplayFeed;
pub use traits::*;
pub use websocket::{stream::parse_message, BinanceMarketStream};
