mod support;

use std::sync::Arc;

use approx::assert_relative_eq;

use volume_tracker::analytics::{IntensityFilter, SpikeIntensity, VolumeTrend};
use volume_tracker::app_config::CacheKeys;
use volume_tracker::error::{AppError, UpstreamError};
use volume_tracker::services::VolumeTrackingService;

use support::{down_store, live_store, FakeMarketSource};

fn spiky() -> Vec<f64> {
    vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 20.0]
}

#[tokio::test]
async fn test_daily_tracking_is_cached() {
    let (_, store) = live_store().await;
    let source = Arc::new(FakeMarketSource::new().with_chart("bitcoin", &spiky()));
    let service = VolumeTrackingService::new(store.clone(), source.clone());

    let first = service.daily_volume_tracking("bitcoin", 30).await.unwrap();
    let second = service.daily_volume_tracking(" Bitcoin ", 30).await.unwrap();

    assert_eq!(FakeMarketSource::calls(&source.historical_calls), 1);
    assert_eq!(first, second);
    assert_eq!(first.statistics.total_days, 8);
    assert_eq!(first.statistics.spike_days, 1);
    assert_eq!(first.volume_spikes.len(), 1);
    assert_eq!(first.volume_spikes[0].spike_intensity, SpikeIntensity::High);
    assert_relative_eq!(first.volume_spikes[0].z_score, 2.65);
    assert!(store.exists(&CacheKeys::volume_tracking("bitcoin", 30)).await);
}

#[tokio::test]
async fn test_days_are_clamped_before_keying() {
    let (_, store) = live_store().await;
    let source = Arc::new(FakeMarketSource::new().with_chart("eth", &spiky()));
    let service = VolumeTrackingService::new(store.clone(), source.clone());

    let report = service.daily_volume_tracking("eth", 1).await.unwrap();
    assert_eq!(report.period_days, 7);
    service.daily_volume_tracking("eth", 3).await.unwrap();

    assert_eq!(FakeMarketSource::calls(&source.historical_calls), 1);
    assert!(store.exists("volume_tracking:eth:7").await);
}

#[tokio::test]
async fn test_disconnected_cache_still_serves() {
    let (_, store) = down_store().await;
    let source = Arc::new(FakeMarketSource::new().with_chart("bitcoin", &spiky()));
    let service = VolumeTrackingService::new(store, source.clone());

    for _ in 0..2 {
        let report = service.daily_volume_tracking("bitcoin", 30).await.unwrap();
        assert_eq!(report.statistics.total_days, 8);
    }
    assert_eq!(FakeMarketSource::calls(&source.historical_calls), 2);
}

#[tokio::test]
async fn test_empty_series_is_an_error() {
    let (backend, store) = live_store().await;
    let source = Arc::new(FakeMarketSource::new().with_chart("ghost", &[]));
    let service = VolumeTrackingService::new(store, source);

    let err = service.daily_volume_tracking("ghost", 30).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Upstream(UpstreamError::NoVolumeData { ref coin_id }) if coin_id == "ghost"
    ));
    assert_eq!(err.to_response().status, 500);
    assert!(backend.is_empty());
}

#[tokio::test]
async fn test_upstream_error_is_propagated() {
    let (_, store) = live_store().await;
    let source = Arc::new(
        FakeMarketSource::new()
            .with_chart("bitcoin", &spiky())
            .failing_on("bitcoin", UpstreamError::RateLimited),
    );
    let service = VolumeTrackingService::new(store, source);

    let err = service.daily_volume_tracking("bitcoin", 30).await.unwrap_err();
    assert_eq!(err.to_response().status, 429);
}

#[tokio::test]
async fn test_spike_filter_and_summary() {
    let (_, store) = live_store().await;
    let mut volumes = vec![1.0; 20];
    volumes[5] = 50.0;
    volumes[15] = 30.0;
    let source = Arc::new(FakeMarketSource::new().with_chart("sol", &volumes));
    let service = VolumeTrackingService::new(store.clone(), source);

    let all = service
        .volume_spikes("sol", 30, IntensityFilter::Moderate)
        .await
        .unwrap();
    assert_eq!(all.total_spikes, 2);
    assert_eq!(all.summary.extreme_spikes, 1);
    assert_eq!(all.summary.moderate_spikes, 1);

    let extreme = service
        .volume_spikes("sol", 30, IntensityFilter::Extreme)
        .await
        .unwrap();
    assert_eq!(extreme.total_spikes, 1);
    assert_eq!(extreme.intensity_filter, IntensityFilter::Extreme);
    assert!(store.exists("volume_spikes:sol:30:extreme").await);
}

#[tokio::test]
async fn test_heatmap_report() {
    let (_, store) = live_store().await;
    let source = Arc::new(FakeMarketSource::new().with_chart("bitcoin", &spiky()));
    let service = VolumeTrackingService::new(store, source);

    let report = service.volume_heatmap("bitcoin", 30).await.unwrap();
    assert_eq!(report.heatmap_data.len(), 8);
    assert_eq!(report.heatmap_data[7].intensity, 3);
    assert_eq!(report.weekly_data.len(), 2);
    assert_eq!(report.intensity_legend.len(), 5);
    assert_eq!(report.statistics.trend, VolumeTrend::StronglyIncreasing);

    // 经缓存读回后内容一致
    let cached = service.volume_heatmap("bitcoin", 30).await.unwrap();
    assert_eq!(cached, report);
}

#[tokio::test]
async fn test_multi_tracking_reports_partial_failure() {
    let (_, store) = live_store().await;
    let source = Arc::new(
        FakeMarketSource::new()
            .with_chart("bitcoin", &spiky())
            .with_chart("ethereum", &spiky())
            .with_chart("solana", &spiky())
            .failing_on("ethereum", UpstreamError::ServiceUnavailable("timeout".into())),
    );
    let service = VolumeTrackingService::new(store, source);

    let report = service
        .multi_volume_tracking("bitcoin,ethereum,solana", 90)
        .await
        .unwrap();
    assert_eq!(report.period_days, 30);
    assert_eq!(report.total_coins_requested, 3);
    assert_eq!(report.successful_coins, 2);
    assert_eq!(report.failed_coins, 1);
    assert_eq!(report.coins.len(), 2);
    assert_eq!(report.errors[0].coin_id, "ethereum");
    assert_eq!(report.errors[0].status, 503);
}

#[tokio::test]
async fn test_multi_tracking_requires_ids() {
    let (_, store) = live_store().await;
    let service = VolumeTrackingService::new(store, Arc::new(FakeMarketSource::new()));
    let err = service.multi_volume_tracking(" , ", 7).await.unwrap_err();
    assert_eq!(err.to_response().status, 400);
}
