//! 行情类请求：单币种成交量对比、市场列表、搜索、热门、历史行情、币种详情

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analytics::{
    calculate_volume_comparisons, compare_coin_volume, volume_leaders, CoinVolumeComparison,
    LeaderKind, VolumeComparison,
};
use crate::app_config::{CacheCategory, CacheKeys};
use crate::cache::CacheStore;
use crate::error::{AppError, AppResult};
use crate::market::{
    CoinDetail, MarketChart, MarketDataSource, MarketQuery, SearchCoin, TrendingCoin,
};
use crate::services::params::{normalize_coin_id, normalize_query, MAX_HISTORY_DAYS, MAX_PER_PAGE};

/// 搜索结果最多返回条数
pub const MAX_SEARCH_RESULTS: usize = 20;
/// 热门币种匹配成交量时拉取的市场条数
pub const TRENDING_MARKET_SIZE: u32 = 50;
const TRENDING_GAINERS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverviewPage {
    pub coins: Vec<VolumeComparison>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub coins: Vec<SearchCoin>,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoinWithVolume {
    #[serde(flatten)]
    pub coin: TrendingCoin,
    /// 不在市场前 50 内的热门币种为空
    pub volume_data: Option<VolumeComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingReport {
    pub trending_coins: Vec<TrendingCoinWithVolume>,
    pub top_volume_gainers: Vec<VolumeComparison>,
}

pub struct CryptoService {
    cache: Arc<CacheStore>,
    source: Arc<dyn MarketDataSource>,
}

impl CryptoService {
    pub fn new(cache: Arc<CacheStore>, source: Arc<dyn MarketDataSource>) -> Self {
        Self { cache, source }
    }

    /// 币种详情 + 7 日 / 30 日实际成交量序列
    pub async fn volume_comparison(&self, coin_id: &str) -> AppResult<CoinVolumeComparison> {
        let coin_id = normalize_coin_id(coin_id)?;
        let key = CacheKeys::volume_comparison(&coin_id);

        self.cache
            .get_or_set(&key, CacheCategory::CoinData, || {
                self.build_volume_comparison(&coin_id)
            })
            .await
    }

    async fn build_volume_comparison(&self, coin_id: &str) -> AppResult<CoinVolumeComparison> {
        let (detail, chart_7d, chart_30d) = tokio::try_join!(
            self.source.get_coin_data(coin_id),
            self.source.get_historical_data(coin_id, 7),
            self.source.get_historical_data(coin_id, 30),
        )?;
        Ok(compare_coin_volume(
            &detail,
            &chart_7d.volume_series(),
            &chart_30d.volume_series(),
        ))
    }

    /// 按市值排序的市场列表及成交量对比
    pub async fn market_overview(&self, query: MarketQuery) -> AppResult<MarketOverviewPage> {
        let query = MarketQuery {
            page: query.page.max(1),
            per_page: query.per_page.clamp(1, MAX_PER_PAGE),
        };
        let key = CacheKeys::market_page(query.page, query.per_page);

        self.cache
            .get_or_set(&key, CacheCategory::MarketData, || self.build_market_page(query))
            .await
    }

    async fn build_market_page(&self, query: MarketQuery) -> AppResult<MarketOverviewPage> {
        let snapshots = self.source.get_market_data(query).await?;
        Ok(MarketOverviewPage {
            coins: calculate_volume_comparisons(&snapshots),
            pagination: Pagination {
                page: query.page,
                per_page: query.per_page,
            },
        })
    }

    pub async fn search(&self, query: &str) -> AppResult<SearchResults> {
        let query = normalize_query(query)?;
        let key = CacheKeys::search(&query);

        self.cache
            .get_or_set(&key, CacheCategory::SearchResults, || self.build_search(&query))
            .await
    }

    async fn build_search(&self, query: &str) -> AppResult<SearchResults> {
        let mut response = self.source.search_coins(query).await?;
        response.coins.truncate(MAX_SEARCH_RESULTS);
        Ok(SearchResults {
            coins: response.coins,
            query: query.to_string(),
        })
    }

    /// 热门币种，附带市场前 50 中的成交量数据
    pub async fn trending(&self) -> AppResult<TrendingReport> {
        self.cache
            .get_or_set(CacheKeys::TRENDING_DATA, CacheCategory::TrendingData, || {
                self.build_trending()
            })
            .await
    }

    async fn build_trending(&self) -> AppResult<TrendingReport> {
        let market_query = MarketQuery {
            page: 1,
            per_page: TRENDING_MARKET_SIZE,
        };
        let (trending, snapshots) = tokio::try_join!(
            self.source.get_trending_coins(),
            self.source.get_market_data(market_query),
        )?;
        info!(
            "trending fetched, coins: {}, market: {}",
            trending.coins.len(),
            snapshots.len()
        );

        let comparisons = calculate_volume_comparisons(&snapshots);
        let trending_coins = trending
            .coins
            .into_iter()
            .map(|entry| {
                let volume_data = comparisons.iter().find(|c| c.id == entry.item.id).cloned();
                TrendingCoinWithVolume {
                    coin: entry.item,
                    volume_data,
                }
            })
            .collect();

        Ok(TrendingReport {
            trending_coins,
            top_volume_gainers: volume_leaders(&comparisons, LeaderKind::Gainers, TRENDING_GAINERS),
        })
    }

    /// 历史行情，天数限制在 1..=365
    pub async fn historical(&self, coin_id: &str, days: u32) -> AppResult<MarketChart> {
        let coin_id = normalize_coin_id(coin_id)?;
        let days = days.clamp(1, MAX_HISTORY_DAYS);
        let key = CacheKeys::historical(&coin_id, days);

        self.cache
            .get_or_set(&key, CacheCategory::HistoricalData, || async {
                self.source
                    .get_historical_data(&coin_id, days)
                    .await
                    .map_err(AppError::from)
            })
            .await
    }

    pub async fn coin_data(&self, coin_id: &str) -> AppResult<CoinDetail> {
        let coin_id = normalize_coin_id(coin_id)?;
        let key = CacheKeys::coin_data(&coin_id);

        self.cache
            .get_or_set(&key, CacheCategory::CoinData, || async {
                self.source.get_coin_data(&coin_id).await.map_err(AppError::from)
            })
            .await
    }
}
