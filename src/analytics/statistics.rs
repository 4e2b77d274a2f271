//! 成交量统计汇总
//!
//! 所有除法都做了分母检查：空序列、单点序列、均值为 0 时相应字段取 0。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::daily_volume::{volumes, DailyVolumePoint};
use crate::analytics::spikes::{count_spike_days, SPIKE_Z_THRESHOLD};
use crate::market::VolumePoint;
use crate::time_util;

/// 趋势比较窗口（最近 N 个点 vs 最早 N 个点）
pub const TREND_WINDOW: usize = 7;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 总体标准差
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// 偶数长度取中间两个值的平均
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

/// 标准差 / 均值（%）
pub fn volatility_percentage(std_dev: f64, mean: f64) -> f64 {
    if mean != 0.0 {
        std_dev / mean * 100.0
    } else {
        0.0
    }
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

/// 成交量趋势
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    StronglyIncreasing,
    Increasing,
    Stable,
    Decreasing,
    StronglyDecreasing,
    InsufficientData,
}

impl VolumeTrend {
    pub fn from_change(change: f64) -> Self {
        if change > 20.0 {
            VolumeTrend::StronglyIncreasing
        } else if change > 5.0 {
            VolumeTrend::Increasing
        } else if change < -20.0 {
            VolumeTrend::StronglyDecreasing
        } else if change < -5.0 {
            VolumeTrend::Decreasing
        } else {
            VolumeTrend::Stable
        }
    }
}

/// 最近 7 个点的均值与最早 7 个点的均值比较，两段可以重叠
pub fn calculate_volume_trend(points: &[DailyVolumePoint]) -> VolumeTrend {
    if points.len() < 2 {
        return VolumeTrend::InsufficientData;
    }
    let window = TREND_WINDOW.min(points.len());
    let recent_avg = mean(&volumes(&points[points.len() - window..]));
    let older_avg = mean(&volumes(&points[..window]));
    let change = if older_avg != 0.0 {
        (recent_avg - older_avg) / older_avg * 100.0
    } else {
        0.0
    };
    VolumeTrend::from_change(change)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAverage {
    /// 周日对齐的周起始日期
    pub week_start: String,
    pub average_volume: f64,
    pub total_days: usize,
}

/// 按周日对齐的周分组求均值，按周起始日期升序
pub fn calculate_weekly_averages(points: &[DailyVolumePoint]) -> Vec<WeeklyAverage> {
    let mut weeks: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for point in points {
        weeks
            .entry(time_util::sunday_week_start(point.timestamp))
            .or_default()
            .push(point.volume);
    }
    weeks
        .into_iter()
        .map(|(start, volumes)| WeeklyAverage {
            week_start: start.format("%Y-%m-%d").to_string(),
            average_volume: mean(&volumes),
            total_days: volumes.len(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStatistics {
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
    pub standard_deviation: f64,
    pub volatility_percentage: f64,
    pub weekly_averages: Vec<WeeklyAverage>,
    pub trend: VolumeTrend,
    pub total_days: usize,
    /// z-score > 2 的点数
    pub spike_days: usize,
}

/// 成交量统计汇总，空序列返回全 0 且趋势为 insufficient_data
pub fn calculate_volume_stats(points: &[DailyVolumePoint]) -> VolumeStatistics {
    let values = volumes(points);
    let avg = mean(&values);
    let std_dev = population_std_dev(&values, avg);

    VolumeStatistics {
        mean: round2(avg),
        median: round2(median(&values)),
        max: round2(max_of(&values)),
        min: round2(min_of(&values)),
        standard_deviation: round2(std_dev),
        volatility_percentage: round2(volatility_percentage(std_dev, avg)),
        weekly_averages: calculate_weekly_averages(points),
        trend: calculate_volume_trend(points),
        total_days: points.len(),
        spike_days: count_spike_days(&values, SPIKE_Z_THRESHOLD),
    }
}

/// 原始精度的成交量指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetrics {
    pub total: f64,
    pub average: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
    pub volatility: f64,
    pub data_points: usize,
}

pub fn calculate_volume_metrics(series: &[VolumePoint]) -> Option<VolumeMetrics> {
    if series.is_empty() {
        return None;
    }
    let values: Vec<f64> = series.iter().map(|p| p.volume).collect();
    let average = mean(&values);
    let std_dev = population_std_dev(&values, average);
    Some(VolumeMetrics {
        total: values.iter().sum(),
        average,
        median: median(&values),
        max: max_of(&values),
        min: min_of(&values),
        volatility: volatility_percentage(std_dev, average),
        data_points: values.len(),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const DAY_MS: i64 = 86_400_000;
    // 2024-01-01 周一
    const START: i64 = 1_704_067_200_000;

    fn points(values: &[f64]) -> Vec<DailyVolumePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DailyVolumePoint::new(START + i as i64 * DAY_MS, *v))
            .collect()
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_stats_basic() {
        let stats = calculate_volume_stats(&points(&[1.0, 1.0, 1.0, 10.0]));
        assert_eq!(stats.mean, 3.25);
        assert_eq!(stats.median, 1.0);
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.standard_deviation, 3.9);
        assert_relative_eq!(stats.volatility_percentage, 119.91);
        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.spike_days, 0);
    }

    #[test]
    fn test_total_days_matches_len() {
        for len in 1..20 {
            let values: Vec<f64> = (0..len).map(|i| (i * 7 % 5) as f64 + 1.0).collect();
            assert_eq!(calculate_volume_stats(&points(&values)).total_days, len);
        }
    }

    #[test]
    fn test_spike_days_counted() {
        let stats = calculate_volume_stats(&points(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 20.0]));
        assert_eq!(stats.spike_days, 1);
    }

    #[test]
    fn test_degenerate_series() {
        let empty = calculate_volume_stats(&[]);
        assert_eq!(empty.total_days, 0);
        assert_eq!(empty.mean, 0.0);
        assert_eq!(empty.trend, VolumeTrend::InsufficientData);
        assert!(empty.weekly_averages.is_empty());

        let single = calculate_volume_stats(&points(&[5.0]));
        assert_eq!(single.mean, 5.0);
        assert_eq!(single.standard_deviation, 0.0);
        assert_eq!(single.volatility_percentage, 0.0);
        assert_eq!(single.trend, VolumeTrend::InsufficientData);

        let zeros = calculate_volume_stats(&points(&[0.0, 0.0, 0.0]));
        assert_eq!(zeros.volatility_percentage, 0.0);
        assert_eq!(zeros.trend, VolumeTrend::Stable);
    }

    #[test]
    fn test_trend_labels() {
        let rising: Vec<f64> = (0..14).map(|i| if i < 7 { 100.0 } else { 130.0 }).collect();
        assert_eq!(calculate_volume_trend(&points(&rising)), VolumeTrend::StronglyIncreasing);

        let mild: Vec<f64> = (0..14).map(|i| if i < 7 { 100.0 } else { 110.0 }).collect();
        assert_eq!(calculate_volume_trend(&points(&mild)), VolumeTrend::Increasing);

        let falling: Vec<f64> = (0..14).map(|i| if i < 7 { 100.0 } else { 90.0 }).collect();
        assert_eq!(calculate_volume_trend(&points(&falling)), VolumeTrend::Decreasing);

        let crash: Vec<f64> = (0..14).map(|i| if i < 7 { 100.0 } else { 50.0 }).collect();
        assert_eq!(calculate_volume_trend(&points(&crash)), VolumeTrend::StronglyDecreasing);

        assert_eq!(calculate_volume_trend(&points(&[100.0, 102.0])), VolumeTrend::Stable);
    }

    #[test]
    fn test_weekly_averages_are_sunday_aligned() {
        // 周一到下周一：2023-12-31 一周 6 天，2024-01-07 一周 2 天
        let weekly = calculate_weekly_averages(&points(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]));
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].week_start, "2023-12-31");
        assert_eq!(weekly[0].total_days, 6);
        assert_eq!(weekly[0].average_volume, 3.5);
        assert_eq!(weekly[1].week_start, "2024-01-07");
        assert_eq!(weekly[1].average_volume, 7.5);
    }

    #[test]
    fn test_volume_metrics() {
        assert!(calculate_volume_metrics(&[]).is_none());
        let series = vec![
            VolumePoint { timestamp: 0, volume: 10.0 },
            VolumePoint { timestamp: 1, volume: 30.0 },
        ];
        let metrics = calculate_volume_metrics(&series).unwrap();
        assert_eq!(metrics.total, 40.0);
        assert_eq!(metrics.average, 20.0);
        assert_eq!(metrics.median, 20.0);
        assert_eq!(metrics.data_points, 2);
        assert_relative_eq!(metrics.volatility, 50.0);
    }
}
