//! 行情数据源与数据模型

pub mod coingecko_client;
pub mod model;

pub use coingecko_client::{CoinGeckoClient, MarketDataSource, UpstreamResult};
pub use model::*;
