use serde::{Deserialize, Serialize};

use crate::market::VolumePoint;
use crate::time_util;

/// 按日期展开后的成交量点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyVolumePoint {
    /// `YYYY-MM-DD` (UTC)
    pub date: String,
    /// 毫秒时间戳
    pub timestamp: i64,
    pub volume: f64,
    /// 如 `Mon, Jan 1`
    pub formatted_date: String,
}

impl DailyVolumePoint {
    pub fn new(timestamp: i64, volume: f64) -> Self {
        Self {
            date: time_util::iso_date(timestamp),
            timestamp,
            volume,
            formatted_date: time_util::display_label(timestamp),
        }
    }
}

impl From<&VolumePoint> for DailyVolumePoint {
    fn from(point: &VolumePoint) -> Self {
        Self::new(point.timestamp, point.volume)
    }
}

/// 保持原有时间顺序
pub fn to_daily_points(series: &[VolumePoint]) -> Vec<DailyVolumePoint> {
    series.iter().map(DailyVolumePoint::from).collect()
}

pub fn volumes(points: &[DailyVolumePoint]) -> Vec<f64> {
    points.iter().map(|p| p.volume).collect()
}
