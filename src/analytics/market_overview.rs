//! 全市场成交量分析

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analytics::liquidity::{calculate_liquidity_score, volume_to_mcap_ratio};
use crate::analytics::statistics::mean;
use crate::analytics::volume_comparison::VolumeComparison;
use crate::market::{CoinDetail, VolumePoint};

/// 各榜单长度
pub const TOP_LIST_SIZE: usize = 10;
/// 缺少市值排名时使用的排名
pub const UNRANKED: u32 = 999;

const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_volume_24h: f64,
    pub estimated_total_volume_7d: f64,
    pub estimated_total_volume_30d: f64,
    pub total_market_cap: f64,
    pub volume_to_mcap_ratio: f64,
    pub average_volume_change: f64,
    pub average_volume_to_mcap_ratio: f64,
    pub coins_analyzed: usize,
}

/// 24h 成交量分档
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDistribution {
    /// > 10B
    pub ultra_high_volume: usize,
    /// 1B ~ 10B
    pub very_high_volume: usize,
    /// 100M ~ 1B
    pub high_volume: usize,
    /// 10M ~ 100M
    pub medium_volume: usize,
    /// 1M ~ 10M
    pub low_volume: usize,
    /// <= 1M
    pub very_low_volume: usize,
}

impl VolumeDistribution {
    pub fn add(&mut self, volume_24h: f64) {
        if volume_24h > 10.0 * BILLION {
            self.ultra_high_volume += 1;
        } else if volume_24h > BILLION {
            self.very_high_volume += 1;
        } else if volume_24h > 100.0 * MILLION {
            self.high_volume += 1;
        } else if volume_24h > 10.0 * MILLION {
            self.medium_volume += 1;
        } else if volume_24h > MILLION {
            self.low_volume += 1;
        } else {
            self.very_low_volume += 1;
        }
    }
}

/// 流动性评分分档
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityDistribution {
    pub excellent: usize,
    pub very_good: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl LiquidityDistribution {
    pub fn add(&mut self, score: u8) {
        if score >= 9 {
            self.excellent += 1;
        } else if score >= 7 {
            self.very_good += 1;
        } else if score >= 5 {
            self.good += 1;
        } else if score >= 3 {
            self.fair += 1;
        } else {
            self.poor += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnalyticsOverview {
    pub market_summary: MarketSummary,
    pub volume_distribution: VolumeDistribution,
    pub liquidity_distribution: LiquidityDistribution,
    pub top_volume_gainers: Vec<VolumeComparison>,
    pub top_volume_losers: Vec<VolumeComparison>,
    pub highest_liquidity: Vec<VolumeComparison>,
    pub lowest_liquidity: Vec<VolumeComparison>,
    pub highest_volume_24h: Vec<VolumeComparison>,
}

fn top_by<K, C>(coins: &[VolumeComparison], keep: K, cmp: C) -> Vec<VolumeComparison>
where
    K: Fn(&VolumeComparison) -> bool,
    C: FnMut(&VolumeComparison, &VolumeComparison) -> Ordering,
{
    let mut selected: Vec<VolumeComparison> = coins.iter().filter(|c| keep(c)).cloned().collect();
    selected.sort_by(cmp);
    selected.truncate(TOP_LIST_SIZE);
    selected
}

/// 全市场汇总、分布与各类前 10 榜单；无币种时均值类字段为 0
pub fn build_market_overview(coins: &[VolumeComparison]) -> VolumeAnalyticsOverview {
    let total_volume_24h: f64 = coins.iter().map(|c| c.volume_24h).sum();
    let total_market_cap: f64 = coins.iter().map(|c| c.market_cap).sum();
    let changes: Vec<f64> = coins.iter().map(|c| c.volume_change_7d_to_30d).collect();
    let ratios: Vec<f64> = coins.iter().map(|c| c.volume_to_mcap_ratio).collect();

    let mut volume_distribution = VolumeDistribution::default();
    let mut liquidity_distribution = LiquidityDistribution::default();
    for coin in coins {
        volume_distribution.add(coin.volume_24h);
        liquidity_distribution.add(coin.liquidity_score);
    }

    VolumeAnalyticsOverview {
        market_summary: MarketSummary {
            total_volume_24h,
            estimated_total_volume_7d: coins.iter().map(|c| c.estimated_volume_7d).sum(),
            estimated_total_volume_30d: coins.iter().map(|c| c.estimated_volume_30d).sum(),
            total_market_cap,
            volume_to_mcap_ratio: volume_to_mcap_ratio(total_volume_24h, total_market_cap),
            average_volume_change: mean(&changes),
            average_volume_to_mcap_ratio: mean(&ratios),
            coins_analyzed: coins.len(),
        },
        volume_distribution,
        liquidity_distribution,
        top_volume_gainers: top_by(
            coins,
            |c| c.volume_change_7d_to_30d > 0.0,
            |a, b| b.volume_change_7d_to_30d.total_cmp(&a.volume_change_7d_to_30d),
        ),
        top_volume_losers: top_by(
            coins,
            |c| c.volume_change_7d_to_30d < 0.0,
            |a, b| a.volume_change_7d_to_30d.total_cmp(&b.volume_change_7d_to_30d),
        ),
        highest_liquidity: top_by(coins, |_| true, |a, b| b.liquidity_score.cmp(&a.liquidity_score)),
        lowest_liquidity: top_by(coins, |_| true, |a, b| a.liquidity_score.cmp(&b.liquidity_score)),
        highest_volume_24h: top_by(coins, |_| true, |a, b| b.volume_24h.total_cmp(&a.volume_24h)),
    }
}

/// 成交量榜单方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderKind {
    #[default]
    Gainers,
    Losers,
}

impl LeaderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaderKind::Gainers => "gainers",
            LeaderKind::Losers => "losers",
        }
    }
}

impl fmt::Display for LeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gainers" => Ok(LeaderKind::Gainers),
            "losers" => Ok(LeaderKind::Losers),
            other => Err(format!("unknown leader type: {}", other)),
        }
    }
}

/// 按成交量变化排序取前 `limit` 个，不过滤正负
pub fn volume_leaders(
    coins: &[VolumeComparison],
    kind: LeaderKind,
    limit: usize,
) -> Vec<VolumeComparison> {
    let mut sorted = coins.to_vec();
    match kind {
        LeaderKind::Gainers => {
            sorted.sort_by(|a, b| b.volume_change_7d_to_30d.total_cmp(&a.volume_change_7d_to_30d))
        }
        LeaderKind::Losers => {
            sorted.sort_by(|a, b| a.volume_change_7d_to_30d.total_cmp(&b.volume_change_7d_to_30d))
        }
    }
    sorted.truncate(limit);
    sorted
}

/// 单币种小时级成交量明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedVolumeRecord {
    pub id: String,
    pub volume_24h_current: f64,
    pub volume_24h_previous: f64,
    pub volume_24h_change_percentage: f64,
    pub volume_7d_average: f64,
    pub volume_rank: u32,
    pub volume_to_mcap_ratio: f64,
    pub liquidity_score: u8,
}

/// `series_1d` 取最后两个点作为当前 / 上一个成交量，`series_7d` 求均值
pub fn detailed_volume_record(
    coin_id: &str,
    detail: &CoinDetail,
    series_1d: &[VolumePoint],
    series_7d: &[VolumePoint],
) -> DetailedVolumeRecord {
    let current = series_1d.last().map(|p| p.volume).unwrap_or(0.0);
    let previous = if series_1d.len() > 1 {
        series_1d[series_1d.len() - 2].volume
    } else {
        current
    };
    let change = if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };
    let weekly: Vec<f64> = series_7d.iter().map(|p| p.volume).collect();
    let market_cap = detail.market_cap_usd();

    DetailedVolumeRecord {
        id: coin_id.to_string(),
        volume_24h_current: current,
        volume_24h_previous: previous,
        volume_24h_change_percentage: change,
        volume_7d_average: mean(&weekly),
        volume_rank: detail.market_cap_rank.unwrap_or(UNRANKED),
        volume_to_mcap_ratio: volume_to_mcap_ratio(current, market_cap),
        liquidity_score: calculate_liquidity_score(current, market_cap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::volume_comparison::calculate_volume_comparison;
    use crate::market::MarketSnapshot;

    fn coin(id: &str, volume: f64, market_cap: f64) -> VolumeComparison {
        calculate_volume_comparison(&MarketSnapshot {
            id: id.into(),
            name: id.into(),
            symbol: id.into(),
            total_volume: Some(volume),
            market_cap: Some(market_cap),
            ..Default::default()
        })
    }

    fn with_change(mut c: VolumeComparison, change: f64) -> VolumeComparison {
        c.volume_change_7d_to_30d = change;
        c
    }

    #[test]
    fn test_empty_overview() {
        let overview = build_market_overview(&[]);
        assert_eq!(overview.market_summary.coins_analyzed, 0);
        assert_eq!(overview.market_summary.average_volume_change, 0.0);
        assert_eq!(overview.market_summary.volume_to_mcap_ratio, 0.0);
        assert!(overview.top_volume_gainers.is_empty());
    }

    #[test]
    fn test_overview_totals_and_distributions() {
        let coins = vec![
            coin("a", 20.0 * BILLION, 100.0 * BILLION),
            coin("b", 2.0 * BILLION, 2.0 * BILLION),
            coin("c", 500.0 * MILLION, 10.0 * BILLION),
            coin("d", 500_000.0, 0.0),
        ];
        let overview = build_market_overview(&coins);
        let summary = &overview.market_summary;
        assert_eq!(summary.coins_analyzed, 4);
        assert_eq!(summary.total_volume_24h, 22.5 * BILLION + 500_000.0);
        assert_eq!(summary.estimated_total_volume_7d, summary.total_volume_24h * 7.0);

        assert_eq!(overview.volume_distribution.ultra_high_volume, 1);
        assert_eq!(overview.volume_distribution.very_high_volume, 1);
        assert_eq!(overview.volume_distribution.high_volume, 1);
        assert_eq!(overview.volume_distribution.very_low_volume, 1);

        // a: 20% -> 6, b: 100% -> 10, c: 5% -> 2, d: 市值 0 -> 0
        assert_eq!(overview.liquidity_distribution.excellent, 1);
        assert_eq!(overview.liquidity_distribution.good, 1);
        assert_eq!(overview.liquidity_distribution.poor, 2);

        assert_eq!(overview.highest_liquidity[0].id, "b");
        assert_eq!(overview.highest_volume_24h[0].id, "a");
        assert_eq!(overview.lowest_liquidity[0].id, "d");
    }

    #[test]
    fn test_gainers_and_losers() {
        let coins: Vec<VolumeComparison> = (0..15)
            .map(|i| with_change(coin(&format!("c{}", i), 1.0, 1.0), i as f64 - 7.0))
            .collect();
        let overview = build_market_overview(&coins);
        assert_eq!(overview.top_volume_gainers.len(), 7);
        assert_eq!(overview.top_volume_gainers[0].volume_change_7d_to_30d, 7.0);
        assert_eq!(overview.top_volume_losers.len(), 7);
        assert_eq!(overview.top_volume_losers[0].volume_change_7d_to_30d, -7.0);

        let leaders = volume_leaders(&coins, LeaderKind::Gainers, 3);
        assert_eq!(leaders.len(), 3);
        assert_eq!(leaders[0].id, "c14");
        let losers = volume_leaders(&coins, LeaderKind::Losers, 20);
        assert_eq!(losers.len(), 15);
        assert_eq!(losers[0].id, "c0");
    }

    #[test]
    fn test_detailed_record() {
        let detail: CoinDetail = serde_json::from_str(
            r#"{"id":"eth","name":"Ethereum","symbol":"eth",
                "market_data":{"market_cap":{"usd":1000.0}}}"#,
        )
        .unwrap();
        let day = vec![
            VolumePoint { timestamp: 0, volume: 80.0 },
            VolumePoint { timestamp: 1, volume: 100.0 },
        ];
        let week = vec![
            VolumePoint { timestamp: 0, volume: 50.0 },
            VolumePoint { timestamp: 1, volume: 150.0 },
        ];
        let record = detailed_volume_record("eth", &detail, &day, &week);
        assert_eq!(record.volume_24h_current, 100.0);
        assert_eq!(record.volume_24h_previous, 80.0);
        assert_eq!(record.volume_24h_change_percentage, 25.0);
        assert_eq!(record.volume_7d_average, 100.0);
        assert_eq!(record.volume_rank, UNRANKED);
        assert_eq!(record.volume_to_mcap_ratio, 10.0);
        assert_eq!(record.liquidity_score, 4);

        let empty = detailed_volume_record("eth", &detail, &[], &[]);
        assert_eq!(empty.volume_24h_change_percentage, 0.0);
        assert_eq!(empty.volume_7d_average, 0.0);
    }

    #[test]
    fn test_parse_leader_kind() {
        assert_eq!("Losers".parse::<LeaderKind>(), Ok(LeaderKind::Losers));
        assert!("winners".parse::<LeaderKind>().is_err());
    }
}
