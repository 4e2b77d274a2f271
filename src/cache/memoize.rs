//! Cache-aside 记忆化
//!
//! 同一个键的并发未命中不做合并：每个调用方都会各自执行一次 producer，
//! 各自回写缓存，后写覆盖先写。缓存的值都是可重算的幂等结果，因此这是安全的。

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::app_config::CacheCategory;
use crate::cache::cache_store::CacheStore;

impl CacheStore {
    /// 先查缓存，未命中再执行 `producer` 并尽力回写
    ///
    /// - 命中时原样返回缓存值，不刷新 TTL
    /// - 写入失败被吞掉，不影响返回值
    /// - `producer` 的错误原样传播，且不会缓存任何内容
    /// - 序列化结果为 `null` 的值不缓存
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        category: CacheCategory,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }

        debug!("Cache miss: {}", key);
        let value = producer().await?;

        match serde_json::to_string(&value) {
            Ok(payload) if payload == "null" => {
                debug!("Skip caching null value: {}", key);
            }
            Ok(payload) => {
                if !self.set_payload(key, payload, category).await {
                    debug!("Proceeding without cache for {}", key);
                }
            }
            Err(e) => warn!("Cache serialize error, key: {}, err: {}", key, e),
        }

        Ok(value)
    }
}
