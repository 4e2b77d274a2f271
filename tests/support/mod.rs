#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use volume_tracker::app_config::CacheConfig;
use volume_tracker::cache::{CacheStore, InMemoryBackend};
use volume_tracker::error::UpstreamError;
use volume_tracker::market::{
    CoinDetail, MarketChart, MarketDataSource, MarketQuery, MarketSnapshot, SearchCoin,
    SearchResponse, TrendingCoin, TrendingEntry, TrendingResponse, UpstreamResult,
};

pub const DAY_MS: f64 = 86_400_000.0;
// 2024-01-01 00:00:00 UTC
pub const START_MS: f64 = 1_704_067_200_000.0;

pub fn cache_config() -> CacheConfig {
    CacheConfig {
        op_timeout: Duration::from_millis(200),
        reconnect_interval: Duration::from_secs(60),
    }
}

pub async fn live_store() -> (Arc<InMemoryBackend>, Arc<CacheStore>) {
    let backend = Arc::new(InMemoryBackend::new());
    let store = CacheStore::connect(backend.clone(), &cache_config()).await;
    assert!(store.health());
    (backend, Arc::new(store))
}

pub async fn down_store() -> (Arc<InMemoryBackend>, Arc<CacheStore>) {
    let backend = Arc::new(InMemoryBackend::new());
    backend.set_available(false);
    let store = CacheStore::connect(backend.clone(), &cache_config()).await;
    assert!(!store.health());
    (backend, Arc::new(store))
}

pub fn daily_chart(volumes: &[f64]) -> MarketChart {
    MarketChart {
        total_volumes: volumes
            .iter()
            .enumerate()
            .map(|(i, v)| (START_MS + i as f64 * DAY_MS, *v))
            .collect(),
        ..Default::default()
    }
}

pub fn snapshot(id: &str, volume: f64, market_cap: f64) -> MarketSnapshot {
    MarketSnapshot {
        id: id.to_string(),
        name: id.to_string(),
        symbol: id.to_string(),
        total_volume: Some(volume),
        market_cap: Some(market_cap),
        ..Default::default()
    }
}

pub fn coin_detail(id: &str, volume: f64, market_cap: f64, rank: Option<u32>) -> CoinDetail {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": id,
        "symbol": id,
        "market_cap_rank": rank,
        "market_data": {
            "market_cap": { "usd": market_cap },
            "total_volume": { "usd": volume }
        }
    }))
    .unwrap()
}

/// 可计数、可注入失败的假数据源
#[derive(Default)]
pub struct FakeMarketSource {
    pub charts: HashMap<String, MarketChart>,
    pub details: HashMap<String, CoinDetail>,
    pub market: Vec<MarketSnapshot>,
    pub failing: HashSet<String>,
    pub failure: Option<UpstreamError>,
    pub market_calls: AtomicUsize,
    pub coin_calls: AtomicUsize,
    pub historical_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub trending_calls: AtomicUsize,
}

impl FakeMarketSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chart(mut self, coin_id: &str, volumes: &[f64]) -> Self {
        self.charts.insert(coin_id.to_string(), daily_chart(volumes));
        self
    }

    pub fn with_detail(mut self, detail: CoinDetail) -> Self {
        self.details.insert(detail.id.clone(), detail);
        self
    }

    pub fn with_market(mut self, market: Vec<MarketSnapshot>) -> Self {
        self.market = market;
        self
    }

    pub fn failing_on(mut self, coin_id: &str, err: UpstreamError) -> Self {
        self.failing.insert(coin_id.to_string());
        self.failure = Some(err);
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn check(&self, coin_id: &str) -> UpstreamResult<()> {
        if self.failing.contains(coin_id) {
            return Err(self
                .failure
                .clone()
                .unwrap_or(UpstreamError::ServiceUnavailable("down".into())));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataSource for FakeMarketSource {
    async fn get_market_data(&self, query: MarketQuery) -> UpstreamResult<Vec<MarketSnapshot>> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .market
            .iter()
            .take(query.per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_coin_data(&self, coin_id: &str) -> UpstreamResult<CoinDetail> {
        self.coin_calls.fetch_add(1, Ordering::SeqCst);
        self.check(coin_id)?;
        self.details
            .get(coin_id)
            .cloned()
            .ok_or_else(|| UpstreamError::from_status(404, "coin not found"))
    }

    async fn get_historical_data(&self, coin_id: &str, _days: u32) -> UpstreamResult<MarketChart> {
        self.historical_calls.fetch_add(1, Ordering::SeqCst);
        self.check(coin_id)?;
        self.charts
            .get(coin_id)
            .cloned()
            .ok_or_else(|| UpstreamError::from_status(404, "coin not found"))
    }

    async fn search_coins(&self, query: &str) -> UpstreamResult<SearchResponse> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let coins = (0..30)
            .map(|i| SearchCoin {
                id: format!("{}-{}", query, i),
                name: format!("{} {}", query, i),
                symbol: query.to_string(),
                ..Default::default()
            })
            .collect();
        Ok(SearchResponse { coins })
    }

    async fn get_trending_coins(&self) -> UpstreamResult<TrendingResponse> {
        self.trending_calls.fetch_add(1, Ordering::SeqCst);
        let coins = ["bitcoin", "obscure"]
            .iter()
            .map(|id| TrendingEntry {
                item: TrendingCoin {
                    id: id.to_string(),
                    name: id.to_string(),
                    symbol: id.to_string(),
                    ..Default::default()
                },
            })
            .collect();
        Ok(TrendingResponse { coins })
    }
}
