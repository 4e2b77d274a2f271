//! 全市场成交量分析：榜单、总览、多币种小时级明细

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analytics::{
    build_market_overview, calculate_volume_comparisons, detailed_volume_record, volume_leaders,
    DetailedVolumeRecord, LeaderKind, VolumeAnalyticsOverview, VolumeComparison,
};
use crate::app_config::{CacheCategory, CacheKeys};
use crate::cache::CacheStore;
use crate::error::AppResult;
use crate::market::{MarketDataSource, MarketQuery};
use crate::services::batch::{run_batch, BatchFailure};
use crate::services::params::{parse_coin_ids, MAX_PER_PAGE};

/// 总览与榜单统计的币种数（上游单页上限）
pub const ANALYTICS_UNIVERSE: u32 = 250;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeLeadersReport {
    #[serde(rename = "type")]
    pub kind: LeaderKind,
    pub coins: Vec<VolumeComparison>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedVolumeReport {
    pub coins: Vec<DetailedVolumeRecord>,
    pub errors: Vec<BatchFailure>,
    pub coin_count: usize,
    pub failed_count: usize,
    pub analysis_timestamp: DateTime<Utc>,
}

pub struct AnalyticsService {
    cache: Arc<CacheStore>,
    source: Arc<dyn MarketDataSource>,
}

impl AnalyticsService {
    pub fn new(cache: Arc<CacheStore>, source: Arc<dyn MarketDataSource>) -> Self {
        Self { cache, source }
    }

    async fn universe(&self) -> AppResult<Vec<VolumeComparison>> {
        let snapshots = self
            .source
            .get_market_data(MarketQuery {
                page: 1,
                per_page: ANALYTICS_UNIVERSE,
            })
            .await?;
        Ok(calculate_volume_comparisons(&snapshots))
    }

    /// 成交量变化榜单，`limit` 限制在 1..=250
    pub async fn volume_leaders(&self, kind: LeaderKind, limit: usize) -> AppResult<VolumeLeadersReport> {
        let limit = limit.clamp(1, MAX_PER_PAGE as usize);
        let key = CacheKeys::volume_leaders(kind.as_str(), limit);

        self.cache
            .get_or_set(&key, CacheCategory::MarketData, || self.build_leaders(kind, limit))
            .await
    }

    async fn build_leaders(&self, kind: LeaderKind, limit: usize) -> AppResult<VolumeLeadersReport> {
        let comparisons = self.universe().await?;
        Ok(VolumeLeadersReport {
            kind,
            coins: volume_leaders(&comparisons, kind, limit),
            generated_at: Utc::now(),
        })
    }

    pub async fn volume_analytics_overview(&self) -> AppResult<VolumeAnalyticsOverview> {
        self.cache
            .get_or_set(
                CacheKeys::VOLUME_ANALYTICS_OVERVIEW,
                CacheCategory::MarketData,
                || self.build_overview(),
            )
            .await
    }

    async fn build_overview(&self) -> AppResult<VolumeAnalyticsOverview> {
        let comparisons = self.universe().await?;
        let overview = build_market_overview(&comparisons);
        info!(
            "volume analytics overview built, coins: {}",
            overview.market_summary.coins_analyzed
        );
        Ok(overview)
    }

    /// 多币种小时级成交量明细，最多 10 个币种；失败的币种列在 `errors` 中
    pub async fn detailed_volume_analysis(&self, coin_ids: &str) -> AppResult<DetailedVolumeReport> {
        let coin_ids = parse_coin_ids(coin_ids)?;
        let key = CacheKeys::detailed_volume_analysis(&coin_ids);

        self.cache
            .get_or_set(&key, CacheCategory::CoinData, || self.build_detailed(&coin_ids))
            .await
    }

    async fn build_detailed(&self, coin_ids: &[String]) -> AppResult<DetailedVolumeReport> {
        let outcome = run_batch(coin_ids, |coin_id| async move {
            self.build_detailed_record(&coin_id).await
        })
        .await;
        info!(
            "detailed volume analysis done, requested: {}, successful: {}, failed: {}",
            coin_ids.len(),
            outcome.successful(),
            outcome.failed()
        );

        Ok(DetailedVolumeReport {
            coin_count: outcome.successful(),
            failed_count: outcome.failed(),
            coins: outcome.successes,
            errors: outcome.failures,
            analysis_timestamp: Utc::now(),
        })
    }

    async fn build_detailed_record(&self, coin_id: &str) -> AppResult<DetailedVolumeRecord> {
        let (detail, chart_1d, chart_7d) = tokio::try_join!(
            self.source.get_coin_data(coin_id),
            self.source.get_historical_data(coin_id, 1),
            self.source.get_historical_data(coin_id, 7),
        )?;
        Ok(detailed_volume_record(
            coin_id,
            &detail,
            &chart_1d.volume_series(),
            &chart_7d.volume_series(),
        ))
    }
}
