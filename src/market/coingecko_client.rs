//! CoinGecko 行情数据源
//!
//! 上游对本系统是一个黑盒：给出市场快照、单币详情、成交量时间序列、搜索与热门列表。
//! 每次请求都带固定超时，HTTP 状态按 [`UpstreamError::from_status`] 归类。

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

use crate::app_config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::market::model::{
    CoinDetail, MarketChart, MarketQuery, MarketSnapshot, SearchResponse, TrendingResponse,
};

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// 行情数据源接口
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 按市值排序的市场快照
    async fn get_market_data(&self, query: MarketQuery) -> UpstreamResult<Vec<MarketSnapshot>>;

    async fn get_coin_data(&self, coin_id: &str) -> UpstreamResult<CoinDetail>;

    /// 最近 `days` 天的价格 / 市值 / 成交量序列
    async fn get_historical_data(&self, coin_id: &str, days: u32) -> UpstreamResult<MarketChart>;

    async fn search_coins(&self, query: &str) -> UpstreamResult<SearchResponse>;

    async fn get_trending_coins(&self) -> UpstreamResult<TrendingResponse>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow!("Failed to build http client: {}", e))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn send_request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> UpstreamResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("coingecko request path: {}, params: {:?}", path, params);

        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            error!("coingecko request failed, path: {}, err: {}", path, e);
            UpstreamError::ServiceUnavailable(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("coingecko read body failed, path: {}, err: {}", path, e);
            UpstreamError::ServiceUnavailable(e.to_string())
        })?;

        if status != StatusCode::OK {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_default();
            error!(
                "coingecko request error, path: {}, status: {}, message: {}",
                path, status, message
            );
            return Err(UpstreamError::from_status(status.as_u16(), message));
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            error!("coingecko decode failed, path: {}, err: {}", path, e);
            UpstreamError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn get_market_data(&self, query: MarketQuery) -> UpstreamResult<Vec<MarketSnapshot>> {
        let params = [
            ("vs_currency", "usd".to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", query.per_page.to_string()),
            ("page", query.page.to_string()),
            ("sparkline", "false".to_string()),
            (
                "price_change_percentage",
                "1h,24h,7d,14d,30d,200d,1y".to_string(),
            ),
        ];
        self.send_request("/coins/markets", &params).await
    }

    async fn get_coin_data(&self, coin_id: &str) -> UpstreamResult<CoinDetail> {
        let params = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "true".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
        ];
        self.send_request(&format!("/coins/{}", coin_id), &params)
            .await
    }

    async fn get_historical_data(&self, coin_id: &str, days: u32) -> UpstreamResult<MarketChart> {
        let mut params = vec![
            ("vs_currency", "usd".to_string()),
            ("days", days.to_string()),
        ];
        // 超过 90 天才按日粒度返回
        if days > 90 {
            params.push(("interval", "daily".to_string()));
        }
        self.send_request(&format!("/coins/{}/market_chart", coin_id), &params)
            .await
    }

    async fn search_coins(&self, query: &str) -> UpstreamResult<SearchResponse> {
        self.send_request("/search", &[("query", query.to_string())])
            .await
    }

    async fn get_trending_coins(&self) -> UpstreamResult<TrendingResponse> {
        self.send_request("/search/trending", &[]).await
    }
}
