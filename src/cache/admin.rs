//! 缓存运维接口：状态、键列表、自检
//!
//! 这些接口只是对 `CacheStore` 的薄封装，不属于读写主路径。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_config::CacheCategory;
use crate::cache::backend::BackendInfo;
use crate::cache::cache_store::CacheStore;
use crate::error::{AppError, AppResult};

/// 键列表最多展示的条数
pub const MAX_KEYS_SHOWN: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub is_healthy: bool,
    pub backend: String,
    pub info: Option<BackendInfo>,
    pub info_error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheKeyDetail {
    pub key: String,
    pub ttl: Option<i64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheKeysReport {
    pub total_keys: usize,
    pub showing: usize,
    pub keys: Vec<CacheKeyDetail>,
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheOpResult {
    pub success: bool,
    pub key: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheSelfTest {
    pub set: bool,
    pub get: bool,
    pub exists: bool,
    pub data_integrity: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SelfTestPayload {
    message: String,
    timestamp: DateTime<Utc>,
}

impl CacheStore {
    pub async fn status(&self) -> CacheStatus {
        let is_healthy = self.ensure_connected().await;
        let (info, info_error) = if is_healthy {
            match self.run("info", "-", self.backend().info()).await {
                Some(info) => (Some(info), None),
                None => (None, Some("Could not retrieve backend info".to_string())),
            }
        } else {
            (None, None)
        };

        CacheStatus {
            is_healthy: self.health(),
            backend: self.backend_name().to_string(),
            info,
            info_error,
            timestamp: Utc::now(),
        }
    }

    /// 按模式列出键及剩余 TTL；缓存不可用时返回错误
    pub async fn keys(&self, pattern: &str) -> AppResult<CacheKeysReport> {
        if !self.ensure_connected().await {
            return Err(AppError::CacheUnavailable);
        }
        let keys = self
            .run("keys", pattern, self.backend().keys(pattern))
            .await
            .ok_or_else(|| AppError::CacheError("Failed to get cache keys".to_string()))?;

        let mut details = Vec::with_capacity(keys.len().min(MAX_KEYS_SHOWN));
        for key in keys.iter().take(MAX_KEYS_SHOWN) {
            // 断线后剩余的键不再访问后端
            let ttl = if self.health() {
                self.run("ttl", key, self.backend().ttl(key)).await
            } else {
                None
            };
            details.push(CacheKeyDetail {
                key: key.clone(),
                ttl,
                error: ttl.is_none().then(|| "Could not read TTL".to_string()),
            });
        }

        Ok(CacheKeysReport {
            total_keys: keys.len(),
            showing: details.len(),
            keys: details,
            pattern: pattern.to_string(),
        })
    }

    pub async fn flush_report(&self) -> CacheOpResult {
        let success = self.flush_all().await;
        CacheOpResult {
            success,
            key: None,
            message: if success {
                "Cache cleared successfully".to_string()
            } else {
                "Failed to clear cache".to_string()
            },
            timestamp: Utc::now(),
        }
    }

    pub async fn delete_report(&self, key: &str) -> AppResult<CacheOpResult> {
        if key.trim().is_empty() {
            return Err(AppError::BadRequest("Cache key is required".to_string()));
        }
        let success = self.delete(key).await;
        Ok(CacheOpResult {
            success,
            key: Some(key.to_string()),
            message: if success {
                "Key deleted successfully".to_string()
            } else {
                "Key not found or failed to delete".to_string()
            },
            timestamp: Utc::now(),
        })
    }

    /// set / get / exists / delete 走一遍，检查读回的数据是否一致
    pub async fn self_test(&self) -> CacheSelfTest {
        let now = Utc::now();
        let key = format!("cache_test_{}", now.timestamp_millis());
        let payload = SelfTestPayload {
            message: "Cache test".to_string(),
            timestamp: now,
        };

        let set = self.set(&key, &payload, CacheCategory::CoinData).await;
        let read_back = self.get::<SelfTestPayload>(&key).await;
        let exists = self.exists(&key).await;
        let deleted = self.delete(&key).await;

        let result = CacheSelfTest {
            set,
            get: read_back.is_some(),
            exists,
            data_integrity: read_back.as_ref() == Some(&payload),
            deleted,
        };
        info!("Cache self test finished: {:?}", result);
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::app_config::CacheConfig;
    use crate::cache::memory_backend::InMemoryBackend;
    use crate::cache::test_backend::ScriptedBackend;

    fn config() -> CacheConfig {
        CacheConfig {
            op_timeout: Duration::from_millis(200),
            reconnect_interval: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_self_test_round_trip() {
        let backend = Arc::new(InMemoryBackend::new());
        let store = CacheStore::connect(backend.clone(), &config()).await;

        let result = store.self_test().await;
        assert!(result.set && result.get && result.exists);
        assert!(result.data_integrity);
        assert!(result.deleted);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_keys_report() {
        let store = CacheStore::connect(Arc::new(InMemoryBackend::new()), &config()).await;
        for i in 0..60 {
            store
                .set(&format!("search:q{}", i), &i, CacheCategory::SearchResults)
                .await;
        }
        store.set("trending_data", &1, CacheCategory::TrendingData).await;

        let report = store.keys("search:*").await.unwrap();
        assert_eq!(report.total_keys, 60);
        assert_eq!(report.showing, MAX_KEYS_SHOWN);
        assert!(report.keys.iter().all(|k| k.ttl.unwrap_or(0) > 0));

        let status = store.status().await;
        assert!(status.is_healthy);
        assert_eq!(status.backend, "memory");
        assert!(status.info.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_ttl_degrades_keys_report() {
        let backend = Arc::new(ScriptedBackend::default());
        let store = CacheStore::connect(backend.clone(), &config()).await;
        store.set("search:a", &1, CacheCategory::SearchResults).await;
        store.set("search:b", &2, CacheCategory::SearchResults).await;
        backend.stall_ttl.store(true, Ordering::SeqCst);

        let report = tokio::time::timeout(Duration::from_secs(2), store.keys("*"))
            .await
            .expect("keys report must not block on a stalled backend")
            .unwrap();
        assert_eq!(report.total_keys, 2);
        assert!(report.keys.iter().all(|k| k.ttl.is_none() && k.error.is_some()));
        assert!(!store.health());
    }

    #[tokio::test]
    async fn test_admin_when_unavailable() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.set_available(false);
        let store = CacheStore::connect(backend, &config()).await;

        assert!(matches!(store.keys("*").await, Err(AppError::CacheUnavailable)));
        assert!(!store.status().await.is_healthy);
        assert!(!store.flush_report().await.success);
        assert!(matches!(
            store.delete_report(" ").await,
            Err(AppError::BadRequest(_))
        ));
    }
}
