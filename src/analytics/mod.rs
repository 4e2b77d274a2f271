//! 成交量分析
//!
//! 纯计算函数：无共享可变状态，相同输入得到相同输出。
//! 退化输入（空序列、恒定序列、分母为 0）返回明确的 0 / 空结果而不是错误。

pub mod daily_volume;
pub mod heatmap;
pub mod liquidity;
pub mod market_overview;
pub mod spikes;
pub mod statistics;
pub mod volume_comparison;

pub use daily_volume::{to_daily_points, DailyVolumePoint};
pub use heatmap::{build_heatmap, HeatmapCell, VolumeHeatmap};
pub use liquidity::{calculate_liquidity_score, volume_to_mcap_ratio};
pub use market_overview::{
    build_market_overview, detailed_volume_record, volume_leaders, DetailedVolumeRecord,
    LeaderKind, VolumeAnalyticsOverview,
};
pub use spikes::{
    detect_volume_spikes, filter_spikes, summarize_spikes, IntensityFilter, SpikeIntensity,
    SpikeSummary, VolumeSpike,
};
pub use statistics::{
    calculate_volume_metrics, calculate_volume_stats, VolumeMetrics, VolumeStatistics,
    VolumeTrend,
};
pub use volume_comparison::{
    calculate_volume_comparison, calculate_volume_comparisons, compare_coin_volume,
    CoinVolumeComparison, VolumeComparison,
};
