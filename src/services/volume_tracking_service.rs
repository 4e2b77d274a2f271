//! 成交量追踪：日线成交量、异动、热力图、多币种批量

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analytics::heatmap::{build_heatmap, HeatmapCell};
use crate::analytics::{
    calculate_volume_stats, detect_volume_spikes, filter_spikes, summarize_spikes,
    to_daily_points, DailyVolumePoint, IntensityFilter, SpikeSummary, VolumeSpike,
    VolumeStatistics,
};
use crate::app_config::{CacheCategory, CacheKeys};
use crate::cache::CacheStore;
use crate::error::{AppResult, UpstreamError};
use crate::market::MarketDataSource;
use crate::services::batch::{run_batch, BatchFailure};
use crate::services::params::{
    clamp_days, normalize_coin_id, parse_coin_ids, MULTI_COIN_MAX_DAYS, MULTI_COIN_MIN_DAYS,
    SINGLE_COIN_MAX_DAYS, SINGLE_COIN_MIN_DAYS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeTrackingReport {
    pub coin_id: String,
    pub period_days: u32,
    pub daily_volumes: Vec<DailyVolumePoint>,
    pub volume_spikes: Vec<VolumeSpike>,
    pub statistics: VolumeStatistics,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpikesReport {
    pub coin_id: String,
    pub period_days: u32,
    pub intensity_filter: IntensityFilter,
    pub total_spikes: usize,
    pub spikes: Vec<VolumeSpike>,
    pub summary: SpikeSummary,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeHeatmapReport {
    pub coin_id: String,
    pub period_days: u32,
    pub heatmap_data: Vec<HeatmapCell>,
    pub weekly_data: BTreeMap<String, Vec<HeatmapCell>>,
    pub intensity_legend: BTreeMap<u8, String>,
    pub statistics: VolumeStatistics,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiVolumeTrackingReport {
    pub period_days: u32,
    pub total_coins_requested: usize,
    pub successful_coins: usize,
    pub failed_coins: usize,
    pub coins: Vec<VolumeTrackingReport>,
    pub errors: Vec<BatchFailure>,
    pub generated_at: DateTime<Utc>,
}

pub struct VolumeTrackingService {
    cache: Arc<CacheStore>,
    source: Arc<dyn MarketDataSource>,
}

impl VolumeTrackingService {
    pub fn new(cache: Arc<CacheStore>, source: Arc<dyn MarketDataSource>) -> Self {
        Self { cache, source }
    }

    /// 拉取成交量序列并计算异动与统计，不经过缓存
    pub async fn build_tracking(&self, coin_id: &str, days: u32) -> AppResult<VolumeTrackingReport> {
        let chart = self.source.get_historical_data(coin_id, days).await?;
        let series = chart.volume_series();
        if series.is_empty() {
            return Err(UpstreamError::NoVolumeData {
                coin_id: coin_id.to_string(),
            }
            .into());
        }

        let daily_volumes = to_daily_points(&series);
        let volume_spikes = detect_volume_spikes(&daily_volumes);
        let statistics = calculate_volume_stats(&daily_volumes);
        info!(
            "volume tracking built, coin: {}, days: {}, points: {}, spikes: {}",
            coin_id,
            days,
            daily_volumes.len(),
            volume_spikes.len()
        );

        Ok(VolumeTrackingReport {
            coin_id: coin_id.to_string(),
            period_days: days,
            daily_volumes,
            volume_spikes,
            statistics,
            generated_at: Utc::now(),
        })
    }

    /// 日线成交量追踪，天数限制在 7..=365
    pub async fn daily_volume_tracking(
        &self,
        coin_id: &str,
        days: u32,
    ) -> AppResult<VolumeTrackingReport> {
        let coin_id = normalize_coin_id(coin_id)?;
        let days = clamp_days(days, SINGLE_COIN_MIN_DAYS, SINGLE_COIN_MAX_DAYS);
        let key = CacheKeys::volume_tracking(&coin_id, days);

        self.cache
            .get_or_set(&key, CacheCategory::VolumeTracking, || {
                self.build_tracking(&coin_id, days)
            })
            .await
    }

    pub async fn volume_spikes(
        &self,
        coin_id: &str,
        days: u32,
        intensity: IntensityFilter,
    ) -> AppResult<VolumeSpikesReport> {
        let coin_id = normalize_coin_id(coin_id)?;
        let days = clamp_days(days, SINGLE_COIN_MIN_DAYS, SINGLE_COIN_MAX_DAYS);
        let key = CacheKeys::volume_spikes(&coin_id, days, intensity.as_str());

        self.cache
            .get_or_set(&key, CacheCategory::VolumeTracking, || {
                self.build_spikes(&coin_id, days, intensity)
            })
            .await
    }

    async fn build_spikes(
        &self,
        coin_id: &str,
        days: u32,
        intensity: IntensityFilter,
    ) -> AppResult<VolumeSpikesReport> {
        let tracking = self.build_tracking(coin_id, days).await?;
        let spikes = filter_spikes(&tracking.volume_spikes, intensity);
        Ok(VolumeSpikesReport {
            coin_id: tracking.coin_id,
            period_days: days,
            intensity_filter: intensity,
            total_spikes: spikes.len(),
            summary: summarize_spikes(&spikes),
            spikes,
            generated_at: Utc::now(),
        })
    }

    pub async fn volume_heatmap(&self, coin_id: &str, days: u32) -> AppResult<VolumeHeatmapReport> {
        let coin_id = normalize_coin_id(coin_id)?;
        let days = clamp_days(days, SINGLE_COIN_MIN_DAYS, SINGLE_COIN_MAX_DAYS);
        let key = CacheKeys::volume_heatmap(&coin_id, days);

        self.cache
            .get_or_set(&key, CacheCategory::VolumeTracking, || {
                self.build_heatmap_report(&coin_id, days)
            })
            .await
    }

    async fn build_heatmap_report(&self, coin_id: &str, days: u32) -> AppResult<VolumeHeatmapReport> {
        let tracking = self.build_tracking(coin_id, days).await?;
        let heatmap = build_heatmap(&tracking.daily_volumes, &tracking.volume_spikes);
        Ok(VolumeHeatmapReport {
            coin_id: tracking.coin_id,
            period_days: days,
            heatmap_data: heatmap.heatmap_data,
            weekly_data: heatmap.weekly_data,
            intensity_legend: heatmap.intensity_legend,
            statistics: tracking.statistics,
            generated_at: Utc::now(),
        })
    }

    /// 多币种并发追踪，最多 10 个币种，天数限制在 7..=30；单个失败不影响其余
    pub async fn multi_volume_tracking(
        &self,
        coin_ids: &str,
        days: u32,
    ) -> AppResult<MultiVolumeTrackingReport> {
        let coin_ids = parse_coin_ids(coin_ids)?;
        let days = clamp_days(days, MULTI_COIN_MIN_DAYS, MULTI_COIN_MAX_DAYS);
        let key = CacheKeys::multi_volume_tracking(&coin_ids, days);

        self.cache
            .get_or_set(&key, CacheCategory::VolumeTracking, || {
                self.build_multi_tracking(&coin_ids, days)
            })
            .await
    }

    async fn build_multi_tracking(
        &self,
        coin_ids: &[String],
        days: u32,
    ) -> AppResult<MultiVolumeTrackingReport> {
        let outcome = run_batch(coin_ids, |coin_id| async move {
            self.build_tracking(&coin_id, days).await
        })
        .await;
        info!(
            "multi volume tracking done, requested: {}, successful: {}, failed: {}",
            coin_ids.len(),
            outcome.successful(),
            outcome.failed()
        );

        Ok(MultiVolumeTrackingReport {
            period_days: days,
            total_coins_requested: coin_ids.len(),
            successful_coins: outcome.successful(),
            failed_coins: outcome.failed(),
            coins: outcome.successes,
            errors: outcome.failures,
            generated_at: Utc::now(),
        })
    }
}
