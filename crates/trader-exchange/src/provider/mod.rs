//! `MarketFeed` 구현.

pub mod binance;

pub use binance::BinanceFeed;
