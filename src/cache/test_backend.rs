//! 测试用后端：包装内存后端，统计 PING 次数并可让 TTL 查询挂起

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;

use crate::cache::backend::{BackendInfo, CacheBackend};
use crate::cache::memory_backend::InMemoryBackend;

#[derive(Default)]
pub struct ScriptedBackend {
    pub inner: InMemoryBackend,
    pub pings: AtomicUsize,
    pub stall_ttl: AtomicBool,
}

#[async_trait::async_trait]
impl CacheBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn ping(&self) -> Result<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.inner.ping().await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set_ex(&self, key: &str, payload: String, ttl_secs: u64) -> Result<()> {
        self.inner.set_ex(key, payload, ttl_secs).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn flush_all(&self) -> Result<()> {
        self.inner.flush_all().await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.inner.keys(pattern).await
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        if self.stall_ttl.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.inner.ttl(key).await
    }

    async fn info(&self) -> Result<BackendInfo> {
        self.inner.info().await
    }
}
