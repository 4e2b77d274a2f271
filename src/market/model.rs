//! 上游行情数据模型
//!
//! 所有可选数值字段都按 `Option<f64>` 反序列化，读取时缺失视为 0。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 市场快照（/coins/markets 的单条记录），构造后不再修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSnapshot {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub fully_diluted_valuation: Option<f64>,
    pub total_volume: Option<f64>,

    #[serde(alias = "price_change_percentage_1h")]
    pub price_change_percentage_1h_in_currency: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    #[serde(alias = "price_change_percentage_7d")]
    pub price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(alias = "price_change_percentage_14d")]
    pub price_change_percentage_14d_in_currency: Option<f64>,
    #[serde(alias = "price_change_percentage_30d")]
    pub price_change_percentage_30d_in_currency: Option<f64>,
    #[serde(alias = "price_change_percentage_200d")]
    pub price_change_percentage_200d_in_currency: Option<f64>,
    #[serde(alias = "price_change_percentage_1y")]
    pub price_change_percentage_1y_in_currency: Option<f64>,

    pub ath: Option<f64>,
    pub ath_change_percentage: Option<f64>,
    pub atl: Option<f64>,
    pub atl_change_percentage: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub last_updated: Option<String>,
}

impl MarketSnapshot {
    pub fn volume_24h(&self) -> f64 {
        self.total_volume.unwrap_or(0.0)
    }

    pub fn market_cap(&self) -> f64 {
        self.market_cap.unwrap_or(0.0)
    }

    pub fn price_changes(&self) -> PriceChanges {
        PriceChanges {
            price_change_1h: self.price_change_percentage_1h_in_currency.unwrap_or(0.0),
            price_change_24h: self.price_change_percentage_24h.unwrap_or(0.0),
            price_change_7d: self.price_change_percentage_7d_in_currency.unwrap_or(0.0),
            price_change_14d: self.price_change_percentage_14d_in_currency.unwrap_or(0.0),
            price_change_30d: self.price_change_percentage_30d_in_currency.unwrap_or(0.0),
            price_change_200d: self.price_change_percentage_200d_in_currency.unwrap_or(0.0),
            price_change_1y: self.price_change_percentage_1y_in_currency.unwrap_or(0.0),
        }
    }
}

/// 固定窗口的价格涨跌幅（%）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceChanges {
    pub price_change_1h: f64,
    pub price_change_24h: f64,
    pub price_change_7d: f64,
    pub price_change_14d: f64,
    pub price_change_30d: f64,
    pub price_change_200d: f64,
    pub price_change_1y: f64,
}

/// 按计价货币的数值表，如 `{"usd": 1.0}`
pub type CurrencyValues = HashMap<String, Option<f64>>;

fn usd(values: &CurrencyValues) -> Option<f64> {
    values.get("usd").copied().flatten()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinImage {
    pub thumb: Option<String>,
    pub small: Option<String>,
    pub large: Option<String>,
}

/// 单币种详情中的 market_data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinMarketData {
    pub current_price: CurrencyValues,
    pub market_cap: CurrencyValues,
    pub total_volume: CurrencyValues,
    pub fully_diluted_valuation: CurrencyValues,
    pub ath: CurrencyValues,
    pub ath_change_percentage: CurrencyValues,
    pub atl: CurrencyValues,
    pub atl_change_percentage: CurrencyValues,
    pub price_change_percentage_1h_in_currency: CurrencyValues,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d: Option<f64>,
    pub price_change_percentage_14d: Option<f64>,
    pub price_change_percentage_30d: Option<f64>,
    pub price_change_percentage_200d: Option<f64>,
    pub price_change_percentage_1y: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
}

/// 单币种详情（/coins/{id}）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: CoinImage,
    pub market_cap_rank: Option<u32>,
    pub market_data: Option<CoinMarketData>,
    pub last_updated: Option<String>,
}

impl CoinDetail {
    fn usd_field(&self, f: impl Fn(&CoinMarketData) -> &CurrencyValues) -> Option<f64> {
        self.market_data.as_ref().and_then(|m| usd(f(m)))
    }

    pub fn current_price_usd(&self) -> Option<f64> {
        self.usd_field(|m| &m.current_price)
    }

    pub fn market_cap_usd(&self) -> f64 {
        self.usd_field(|m| &m.market_cap).unwrap_or(0.0)
    }

    pub fn volume_24h_usd(&self) -> f64 {
        self.usd_field(|m| &m.total_volume).unwrap_or(0.0)
    }

    pub fn fully_diluted_valuation_usd(&self) -> Option<f64> {
        self.usd_field(|m| &m.fully_diluted_valuation)
    }

    pub fn ath_usd(&self) -> Option<f64> {
        self.usd_field(|m| &m.ath)
    }

    pub fn ath_change_percentage_usd(&self) -> Option<f64> {
        self.usd_field(|m| &m.ath_change_percentage)
    }

    pub fn atl_usd(&self) -> Option<f64> {
        self.usd_field(|m| &m.atl)
    }

    pub fn atl_change_percentage_usd(&self) -> Option<f64> {
        self.usd_field(|m| &m.atl_change_percentage)
    }

    pub fn price_changes(&self) -> PriceChanges {
        let Some(m) = self.market_data.as_ref() else {
            return PriceChanges::default();
        };
        PriceChanges {
            price_change_1h: usd(&m.price_change_percentage_1h_in_currency).unwrap_or(0.0),
            price_change_24h: m.price_change_percentage_24h.unwrap_or(0.0),
            price_change_7d: m.price_change_percentage_7d.unwrap_or(0.0),
            price_change_14d: m.price_change_percentage_14d.unwrap_or(0.0),
            price_change_30d: m.price_change_percentage_30d.unwrap_or(0.0),
            price_change_200d: m.price_change_percentage_200d.unwrap_or(0.0),
            price_change_1y: m.price_change_percentage_1y.unwrap_or(0.0),
        }
    }
}

/// 成交量时间序列中的一个点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    /// 毫秒时间戳
    pub timestamp: i64,
    pub volume: f64,
}

/// 历史行情（/coins/{id}/market_chart），每个点为 `[timestamp_ms, value]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketChart {
    pub prices: Vec<(f64, f64)>,
    pub market_caps: Vec<(f64, f64)>,
    pub total_volumes: Vec<(f64, f64)>,
}

impl MarketChart {
    /// 按时间顺序的成交量序列
    pub fn volume_series(&self) -> Vec<VolumePoint> {
        self.total_volumes
            .iter()
            .map(|&(ts, volume)| VolumePoint {
                timestamp: ts as i64,
                volume,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub api_symbol: Option<String>,
    pub market_cap_rank: Option<u32>,
    pub thumb: Option<String>,
    pub large: Option<String>,
}

/// 搜索结果（/search），只保留币种部分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub coins: Vec<SearchCoin>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingCoin {
    pub id: String,
    pub coin_id: Option<u64>,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    pub thumb: Option<String>,
    pub small: Option<String>,
    pub large: Option<String>,
    pub slug: Option<String>,
    pub price_btc: Option<f64>,
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingEntry {
    pub item: TrendingCoin,
}

/// 热门币种（/search/trending）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingResponse {
    pub coins: Vec<TrendingEntry>,
}

/// 市场列表分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketQuery {
    pub page: u32,
    pub per_page: u32,
}
