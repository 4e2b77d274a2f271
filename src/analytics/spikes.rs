//! 成交量异动检测
//!
//! 用整条序列的总体均值和标准差计算每个点的 z-score，z > 2 视为异动。
//! 输出数值保留两位小数，强度分级始终使用未取整的 z-score。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analytics::daily_volume::{volumes, DailyVolumePoint};
use crate::analytics::statistics::{mean, population_std_dev, round2};

/// 异动阈值
pub const SPIKE_Z_THRESHOLD: f64 = 2.0;
/// 显著异动阈值
pub const SIGNIFICANT_Z_THRESHOLD: f64 = 3.0;
const HIGH_Z_THRESHOLD: f64 = 2.5;
/// 少于该点数不做检测
pub const MIN_SPIKE_POINTS: usize = 3;

/// 异动强度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeIntensity {
    Normal,
    Moderate,
    High,
    Extreme,
}

impl SpikeIntensity {
    /// 从高到低判断，先命中者优先
    pub fn from_z_score(z_score: f64) -> Self {
        if z_score > SIGNIFICANT_Z_THRESHOLD {
            SpikeIntensity::Extreme
        } else if z_score > HIGH_Z_THRESHOLD {
            SpikeIntensity::High
        } else if z_score > SPIKE_Z_THRESHOLD {
            SpikeIntensity::Moderate
        } else {
            SpikeIntensity::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpikeIntensity::Normal => "normal",
            SpikeIntensity::Moderate => "moderate",
            SpikeIntensity::High => "high",
            SpikeIntensity::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpike {
    #[serde(flatten)]
    pub point: DailyVolumePoint,
    pub z_score: f64,
    pub is_spike: bool,
    pub is_significant_spike: bool,
    pub spike_intensity: SpikeIntensity,
    /// 相对前一个点的变化（%），第一个点为 0
    pub percentage_change_from_previous: f64,
    /// 相对均值的偏离（%）
    pub deviation_from_mean: f64,
}

/// σ 为 0 时 z-score 定义为 0
fn z_score(volume: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev > 0.0 {
        (volume - mean) / std_dev
    } else {
        0.0
    }
}

fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// z-score 超过 `threshold` 的点数
pub fn count_spike_days(values: &[f64], threshold: f64) -> usize {
    let avg = mean(values);
    let std_dev = population_std_dev(values, avg);
    values
        .iter()
        .filter(|v| z_score(**v, avg, std_dev) > threshold)
        .count()
}

/// 检测成交量异动，按 z-score 降序返回
///
/// 少于 3 个点或序列恒定时返回空列表；z-score 相同的点保持时间顺序。
pub fn detect_volume_spikes(points: &[DailyVolumePoint]) -> Vec<VolumeSpike> {
    if points.len() < MIN_SPIKE_POINTS {
        return Vec::new();
    }
    let values = volumes(points);
    let avg = mean(&values);
    let std_dev = population_std_dev(&values, avg);
    if std_dev <= 0.0 || !std_dev.is_finite() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, VolumeSpike)> = points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            let z = z_score(point.volume, avg, std_dev);
            if z <= SPIKE_Z_THRESHOLD {
                return None;
            }
            let previous = if index > 0 {
                points[index - 1].volume
            } else {
                point.volume
            };
            let deviation = if avg != 0.0 {
                (point.volume - avg) / avg * 100.0
            } else {
                0.0
            };
            let spike = VolumeSpike {
                point: point.clone(),
                z_score: round2(z),
                is_spike: true,
                is_significant_spike: z > SIGNIFICANT_Z_THRESHOLD,
                spike_intensity: SpikeIntensity::from_z_score(z),
                percentage_change_from_previous: round2(percentage_change(point.volume, previous)),
                deviation_from_mean: round2(deviation),
            };
            Some((z, spike))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, spike)| spike).collect()
}

/// 异动强度过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityFilter {
    /// 全部异动
    #[default]
    Moderate,
    /// high + extreme
    High,
    Extreme,
}

impl IntensityFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            IntensityFilter::Moderate => "moderate",
            IntensityFilter::High => "high",
            IntensityFilter::Extreme => "extreme",
        }
    }

    pub fn accepts(self, intensity: SpikeIntensity) -> bool {
        match self {
            IntensityFilter::Moderate => true,
            IntensityFilter::High => {
                matches!(intensity, SpikeIntensity::High | SpikeIntensity::Extreme)
            }
            IntensityFilter::Extreme => intensity == SpikeIntensity::Extreme,
        }
    }
}

impl fmt::Display for IntensityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntensityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moderate" => Ok(IntensityFilter::Moderate),
            "high" => Ok(IntensityFilter::High),
            "extreme" => Ok(IntensityFilter::Extreme),
            other => Err(format!("unknown spike intensity: {}", other)),
        }
    }
}

pub fn filter_spikes(spikes: &[VolumeSpike], filter: IntensityFilter) -> Vec<VolumeSpike> {
    spikes
        .iter()
        .filter(|s| filter.accepts(s.spike_intensity))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeSummary {
    pub extreme_spikes: usize,
    pub high_spikes: usize,
    pub moderate_spikes: usize,
    /// 平均 z-score，无异动时为 0
    pub avg_spike_intensity: f64,
}

pub fn summarize_spikes(spikes: &[VolumeSpike]) -> SpikeSummary {
    let count = |intensity: SpikeIntensity| {
        spikes
            .iter()
            .filter(|s| s.spike_intensity == intensity)
            .count()
    };
    let z_scores: Vec<f64> = spikes.iter().map(|s| s.z_score).collect();
    SpikeSummary {
        extreme_spikes: count(SpikeIntensity::Extreme),
        high_spikes: count(SpikeIntensity::High),
        moderate_spikes: count(SpikeIntensity::Moderate),
        avg_spike_intensity: round2(mean(&z_scores)),
    }
}
