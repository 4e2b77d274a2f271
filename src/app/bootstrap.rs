use std::sync::Arc;

use tracing::{info, warn};

use crate::app_config::AppConfig;
use crate::cache::{CacheBackend, CacheStore, InMemoryBackend, RedisBackend};
use crate::market::{CoinGeckoClient, MarketDataSource};
use crate::services::AppServices;

/// 缓存后端选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Redis,
    InMemory,
}

/// 构造缓存句柄；Redis 连不上时以 Disconnected 状态启动，请求直接穿透到上游
pub async fn build_cache_store(config: &AppConfig, mode: CacheMode) -> anyhow::Result<Arc<CacheStore>> {
    let backend: Arc<dyn CacheBackend> = match mode {
        CacheMode::Redis => Arc::new(RedisBackend::new(&config.redis)?),
        CacheMode::InMemory => Arc::new(InMemoryBackend::new()),
    };
    let store = CacheStore::connect(backend, &config.cache).await;
    if store.health() {
        info!("cache ready, backend: {}", store.backend_name());
    } else {
        warn!(
            "cache backend {} unavailable, running without cache",
            store.backend_name()
        );
    }
    Ok(Arc::new(store))
}

/// 组装所有服务，缓存与数据源各构造一次后注入
pub async fn build_services(config: &AppConfig, mode: CacheMode) -> anyhow::Result<AppServices> {
    let cache = build_cache_store(config, mode).await?;
    let source: Arc<dyn MarketDataSource> = Arc::new(CoinGeckoClient::new(&config.upstream)?);
    if config.upstream.api_key.is_none() {
        info!("COINGECKO_API_KEY not set, using public rate limits");
    }
    Ok(AppServices::new(cache, source))
}
