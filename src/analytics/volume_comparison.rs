//! 成交量对比
//!
//! 市场快照只给出 24h 成交量，7 日 / 30 日成交量按“最近一天具有代表性”
//! 的平稳假设估算（24h × 7、24h × 30），是近似值而不是实际累计量。

use serde::{Deserialize, Serialize};

use crate::analytics::liquidity::{calculate_liquidity_score, volume_to_mcap_ratio};
use crate::analytics::statistics::{calculate_volume_metrics, VolumeMetrics};
use crate::market::{CoinDetail, MarketSnapshot, PriceChanges, VolumePoint};

/// 30 日到 7 日的归一化系数（30 / 7 ≈ 4.286，取 4.28）
pub const MONTHLY_TO_WEEKLY_FACTOR: f64 = 4.28;

/// 7 日成交量相对归一化月成交量的变化（%），月成交量 <= 0 时为 0
pub fn volume_change_7d_to_30d(volume_7d: f64, volume_30d: f64) -> f64 {
    if volume_30d <= 0.0 {
        return 0.0;
    }
    let normalized_monthly = volume_30d / MONTHLY_TO_WEEKLY_FACTOR;
    (volume_7d - normalized_monthly) / normalized_monthly * 100.0
}

/// 单个币种的成交量对比记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeComparison {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: f64,
    pub market_cap_rank: Option<u32>,

    pub volume_24h: f64,
    pub estimated_volume_7d: f64,
    pub estimated_volume_30d: f64,
    pub volume_change_7d_to_30d: f64,
    pub volume_to_mcap_ratio: f64,
    pub liquidity_score: u8,

    #[serde(flatten)]
    pub price_changes: PriceChanges,

    pub ath: Option<f64>,
    pub ath_change_percentage: Option<f64>,
    pub atl: Option<f64>,
    pub atl_change_percentage: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub fully_diluted_valuation: Option<f64>,
    pub last_updated: Option<String>,
}

pub fn calculate_volume_comparison(snapshot: &MarketSnapshot) -> VolumeComparison {
    let volume_24h = snapshot.volume_24h();
    let market_cap = snapshot.market_cap();
    let estimated_volume_7d = volume_24h * 7.0;
    let estimated_volume_30d = volume_24h * 30.0;

    VolumeComparison {
        id: snapshot.id.clone(),
        name: snapshot.name.clone(),
        symbol: snapshot.symbol.clone(),
        image: snapshot.image.clone(),
        current_price: snapshot.current_price,
        market_cap,
        market_cap_rank: snapshot.market_cap_rank,
        volume_24h,
        estimated_volume_7d,
        estimated_volume_30d,
        volume_change_7d_to_30d: volume_change_7d_to_30d(estimated_volume_7d, estimated_volume_30d),
        volume_to_mcap_ratio: volume_to_mcap_ratio(volume_24h, market_cap),
        liquidity_score: calculate_liquidity_score(volume_24h, market_cap),
        price_changes: snapshot.price_changes(),
        ath: snapshot.ath,
        ath_change_percentage: snapshot.ath_change_percentage,
        atl: snapshot.atl,
        atl_change_percentage: snapshot.atl_change_percentage,
        circulating_supply: snapshot.circulating_supply,
        total_supply: snapshot.total_supply,
        max_supply: snapshot.max_supply,
        fully_diluted_valuation: snapshot.fully_diluted_valuation,
        last_updated: snapshot.last_updated.clone(),
    }
}

pub fn calculate_volume_comparisons(snapshots: &[MarketSnapshot]) -> Vec<VolumeComparison> {
    snapshots.iter().map(calculate_volume_comparison).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: f64,
    pub market_cap_rank: Option<u32>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinVolumeData {
    pub volume_24h: f64,
    /// 7 日序列实际累计
    pub volume_7d_total: f64,
    /// 30 日序列实际累计
    pub volume_30d_total: f64,
    pub volume_change_percentage: f64,
    pub volume_to_mcap_ratio: f64,
    pub liquidity_score: u8,
    pub volume_metrics_7d: Option<VolumeMetrics>,
    pub volume_metrics_30d: Option<VolumeMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalMetrics {
    pub ath: Option<f64>,
    pub ath_change_percentage: Option<f64>,
    pub atl: Option<f64>,
    pub atl_change_percentage: Option<f64>,
    pub fully_diluted_valuation: Option<f64>,
    pub last_updated: Option<String>,
}

/// 单币种详细对比：详情 + 7 日 / 30 日实际序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinVolumeComparison {
    pub coin: CoinSummary,
    pub volume_data: CoinVolumeData,
    pub price_changes: PriceChanges,
    pub additional_metrics: AdditionalMetrics,
}

pub fn compare_coin_volume(
    detail: &CoinDetail,
    series_7d: &[VolumePoint],
    series_30d: &[VolumePoint],
) -> CoinVolumeComparison {
    let volume_7d_total: f64 = series_7d.iter().map(|p| p.volume).sum();
    let volume_30d_total: f64 = series_30d.iter().map(|p| p.volume).sum();
    let volume_24h = detail.volume_24h_usd();
    let market_cap = detail.market_cap_usd();
    let market_data = detail.market_data.as_ref();

    CoinVolumeComparison {
        coin: CoinSummary {
            id: detail.id.clone(),
            name: detail.name.clone(),
            symbol: detail.symbol.clone(),
            image: detail.image.large.clone(),
            current_price: detail.current_price_usd(),
            market_cap,
            market_cap_rank: detail.market_cap_rank,
            circulating_supply: market_data.and_then(|m| m.circulating_supply),
            total_supply: market_data.and_then(|m| m.total_supply),
            max_supply: market_data.and_then(|m| m.max_supply),
        },
        volume_data: CoinVolumeData {
            volume_24h,
            volume_7d_total,
            volume_30d_total,
            volume_change_percentage: volume_change_7d_to_30d(volume_7d_total, volume_30d_total),
            volume_to_mcap_ratio: volume_to_mcap_ratio(volume_24h, market_cap),
            liquidity_score: calculate_liquidity_score(volume_24h, market_cap),
            volume_metrics_7d: calculate_volume_metrics(series_7d),
            volume_metrics_30d: calculate_volume_metrics(series_30d),
        },
        price_changes: detail.price_changes(),
        additional_metrics: AdditionalMetrics {
            ath: detail.ath_usd(),
            ath_change_percentage: detail.ath_change_percentage_usd(),
            atl: detail.atl_usd(),
            atl_change_percentage: detail.atl_change_percentage_usd(),
            fully_diluted_valuation: detail.fully_diluted_valuation_usd(),
            last_updated: detail.last_updated.clone(),
        },
    }
}
