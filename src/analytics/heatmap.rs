//! 日历热力图
//!
//! 只是日线点与异动结果的投影，不计算新的统计量。

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::analytics::daily_volume::DailyVolumePoint;
use crate::analytics::spikes::{SpikeIntensity, VolumeSpike};
use crate::time_util;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: String,
    pub formatted_date: String,
    pub volume: f64,
    /// 0 (normal) ..= 4 (extreme)
    pub intensity: u8,
    pub is_spike: bool,
    /// 0 = 周日
    pub day_of_week: u32,
    /// ISO 周序号
    pub week_of_year: u32,
}

/// 强度等级；标记为异动但强度为 normal 的点记为 1
pub fn intensity_level(spike: Option<SpikeIntensity>) -> u8 {
    match spike {
        None => 0,
        Some(SpikeIntensity::Normal) => 1,
        Some(SpikeIntensity::Moderate) => 2,
        Some(SpikeIntensity::High) => 3,
        Some(SpikeIntensity::Extreme) => 4,
    }
}

pub fn intensity_legend() -> BTreeMap<u8, String> {
    [
        (0, "Normal"),
        (1, "Low Spike"),
        (2, "Moderate Spike"),
        (3, "High Spike"),
        (4, "Extreme Spike"),
    ]
    .into_iter()
    .map(|(level, label)| (level, label.to_string()))
    .collect()
}

/// 周行的键，如 `2024-W01`
pub fn week_key(timestamp_ms: i64) -> String {
    let (year, week) = time_util::iso_week(timestamp_ms);
    format!("{}-W{:02}", year, week)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeHeatmap {
    pub heatmap_data: Vec<HeatmapCell>,
    /// 按 ISO 周分组，键有序
    pub weekly_data: BTreeMap<String, Vec<HeatmapCell>>,
    pub intensity_legend: BTreeMap<u8, String>,
}

/// 同一日期有多个异动时取 z-score 最高的那个（`spikes` 已按 z-score 降序）
pub fn build_heatmap(points: &[DailyVolumePoint], spikes: &[VolumeSpike]) -> VolumeHeatmap {
    let mut spike_by_date: HashMap<&str, SpikeIntensity> = HashMap::new();
    for spike in spikes {
        spike_by_date
            .entry(spike.point.date.as_str())
            .or_insert(spike.spike_intensity);
    }

    let mut weekly_data: BTreeMap<String, Vec<HeatmapCell>> = BTreeMap::new();
    let heatmap_data: Vec<HeatmapCell> = points
        .iter()
        .map(|point| {
            let spike = spike_by_date.get(point.date.as_str()).copied();
            let cell = HeatmapCell {
                date: point.date.clone(),
                formatted_date: point.formatted_date.clone(),
                volume: point.volume,
                intensity: intensity_level(spike),
                is_spike: spike.is_some(),
                day_of_week: time_util::day_of_week(point.timestamp),
                week_of_year: time_util::iso_week(point.timestamp).1,
            };
            weekly_data
                .entry(week_key(point.timestamp))
                .or_default()
                .push(cell.clone());
            cell
        })
        .collect();

    VolumeHeatmap {
        heatmap_data,
        weekly_data,
        intensity_legend: intensity_legend(),
    }
}
