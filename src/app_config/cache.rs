//! 缓存分类与缓存键
//!
//! 每次写入缓存必须指定一个分类，分类决定固定的 TTL。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 缓存分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    CoinData,
    MarketData,
    HistoricalData,
    SearchResults,
    TrendingData,
    VolumeTracking,
}

impl CacheCategory {
    pub const ALL: [CacheCategory; 6] = [
        CacheCategory::CoinData,
        CacheCategory::MarketData,
        CacheCategory::HistoricalData,
        CacheCategory::SearchResults,
        CacheCategory::TrendingData,
        CacheCategory::VolumeTracking,
    ];

    /// 分类对应的 TTL（秒），不可修改
    pub const fn ttl_secs(self) -> u64 {
        match self {
            CacheCategory::CoinData => 300,
            CacheCategory::MarketData => 900,
            CacheCategory::HistoricalData => 3600,
            CacheCategory::SearchResults => 1800,
            CacheCategory::TrendingData => 600,
            CacheCategory::VolumeTracking => 1800,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CacheCategory::CoinData => "coin_data",
            CacheCategory::MarketData => "market_data",
            CacheCategory::HistoricalData => "historical_data",
            CacheCategory::SearchResults => "search_results",
            CacheCategory::TrendingData => "trending_data",
            CacheCategory::VolumeTracking => "volume_tracking",
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 缓存键构造，冒号分隔；相同请求参数必须得到相同的键
pub struct CacheKeys;

impl CacheKeys {
    pub const MARKET_DATA: &'static str = "market_data";
    pub const TRENDING_DATA: &'static str = "trending_data";
    pub const VOLUME_ANALYTICS_OVERVIEW: &'static str = "volume_analytics_overview";

    pub fn coin_data(coin_id: &str) -> String {
        format!("coin_data:{}", coin_id)
    }

    pub fn historical(coin_id: &str, days: u32) -> String {
        format!("historical:{}:{}", coin_id, days)
    }

    pub fn search(query: &str) -> String {
        format!("search:{}", query)
    }

    pub fn market_page(page: u32, per_page: u32) -> String {
        format!("{}:{}:{}", Self::MARKET_DATA, page, per_page)
    }

    pub fn volume_comparison(coin_id: &str) -> String {
        format!("volume_comparison:{}", coin_id)
    }

    pub fn volume_tracking(coin_id: &str, days: u32) -> String {
        format!("volume_tracking:{}:{}", coin_id, days)
    }

    pub fn volume_spikes(coin_id: &str, days: u32, intensity: &str) -> String {
        format!("volume_spikes:{}:{}:{}", coin_id, days, intensity)
    }

    pub fn volume_heatmap(coin_id: &str, days: u32) -> String {
        format!("volume_heatmap:{}:{}", coin_id, days)
    }

    pub fn multi_volume_tracking(coin_ids: &[String], days: u32) -> String {
        format!("multi_volume_tracking:{}:{}", coin_ids.join(","), days)
    }

    pub fn volume_leaders(kind: &str, limit: usize) -> String {
        format!("volume_leaders:{}:{}", kind, limit)
    }

    pub fn detailed_volume_analysis(coin_ids: &[String]) -> String {
        format!("detailed_volume_analysis:{}", coin_ids.join(","))
    }
}
