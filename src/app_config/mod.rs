//! 配置管理模块

pub mod cache;
pub mod env;
pub mod log;
pub mod redis;

use std::time::Duration;

pub use cache::{CacheCategory, CacheKeys};
pub use env::{env_is_true, env_opt, env_or_default, env_u64};
pub use redis::RedisConfig;

pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// 缓存层配置
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// 单次缓存命令的超时，超时按失败降级
    pub op_timeout: Duration,
    /// 断线状态下重连探测的最小间隔
    pub reconnect_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_millis(1500),
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

/// 上游行情数据源配置
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// 运行时配置汇总
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub redis: RedisConfig,
    pub cache: CacheConfig,
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let cache_defaults = CacheConfig::default();
        let cache = CacheConfig {
            op_timeout: Duration::from_millis(env_u64(
                "CACHE_OP_TIMEOUT_MS",
                cache_defaults.op_timeout.as_millis() as u64,
            )),
            reconnect_interval: Duration::from_secs(env_u64(
                "CACHE_RECONNECT_INTERVAL_SECS",
                cache_defaults.reconnect_interval.as_secs(),
            )),
        };

        let upstream_defaults = UpstreamConfig::default();
        // 占位符 key 等同于未配置
        let api_key = env_opt("COINGECKO_API_KEY").filter(|k| k != "your_api_key_here");
        let upstream = UpstreamConfig {
            base_url: env_or_default("COINGECKO_BASE_URL", &upstream_defaults.base_url),
            api_key,
            timeout: Duration::from_secs(env_u64(
                "UPSTREAM_TIMEOUT_SECS",
                upstream_defaults.timeout.as_secs(),
            )),
        };

        Self {
            redis: RedisConfig::from_env(),
            cache,
            upstream,
        }
    }
}
