//! 请求级服务
//!
//! 每个操作归一化参数、构造缓存键，再通过 `get_or_set` 调用上游与分析函数。
//! 缓存与数据源以句柄注入，测试可替换为内存缓存和假数据源。

pub mod analytics_service;
pub mod batch;
pub mod crypto_service;
pub mod params;
pub mod volume_tracking_service;

use std::sync::Arc;

pub use analytics_service::{AnalyticsService, DetailedVolumeReport, VolumeLeadersReport};
pub use batch::{BatchFailure, BatchOutcome};
pub use crypto_service::{
    CryptoService, MarketOverviewPage, SearchResults, TrendingCoinWithVolume, TrendingReport,
};
pub use volume_tracking_service::{
    MultiVolumeTrackingReport, VolumeHeatmapReport, VolumeSpikesReport, VolumeTrackingReport,
    VolumeTrackingService,
};

use crate::cache::CacheStore;
use crate::market::MarketDataSource;

/// 所有服务共享同一个缓存句柄和数据源
pub struct AppServices {
    pub cache: Arc<CacheStore>,
    pub crypto: CryptoService,
    pub analytics: AnalyticsService,
    pub volume_tracking: VolumeTrackingService,
}

impl AppServices {
    pub fn new(cache: Arc<CacheStore>, source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            crypto: CryptoService::new(cache.clone(), source.clone()),
            analytics: AnalyticsService::new(cache.clone(), source.clone()),
            volume_tracking: VolumeTrackingService::new(cache.clone(), source),
            cache,
        }
    }
}
