//! WebSocket 스트림.

pub mod stream;

pub use stream::BinanceMarketStream;
