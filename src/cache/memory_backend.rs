//! 内存缓存后端（DashMap）
//!
//! 用于测试以及未部署 Redis 的本地运行；可以手动切换为不可用状态来模拟断线。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use tokio::time::Instant;

use crate::cache::backend::{glob_match, BackendInfo, CacheBackend};

#[derive(Clone)]
struct MemoryEntry {
    payload: String,
    expire_at: Instant,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expire_at
    }
}

pub struct InMemoryBackend {
    map: Arc<DashMap<String, MemoryEntry>>,
    available: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// 切换可用状态，false 时所有命令返回错误
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.map.iter().filter(|e| !e.value().is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(anyhow!("in-memory cache backend is unavailable"))
        }
    }

    fn live_entry(&self, key: &str) -> Option<MemoryEntry> {
        let entry = self.map.get(key)?.clone();
        if entry.is_expired() {
            // 只删除仍然过期的条目，不误删并发写入的新值
            self.map.remove_if(key, |_, e| e.is_expired());
            return None;
        }
        Some(entry)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.live_entry(key).map(|e| e.payload))
    }

    async fn set_ex(&self, key: &str, payload: String, ttl_secs: u64) -> Result<()> {
        self.check()?;
        let entry = MemoryEntry {
            payload,
            expire_at: Instant::now() + Duration::from_secs(ttl_secs),
        };
        self.map.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.check()?;
        Ok(self.map.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check()?;
        Ok(self.live_entry(key).is_some())
    }

    async fn flush_all(&self) -> Result<()> {
        self.check()?;
        self.map.clear();
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.check()?;
        let mut keys: Vec<String> = self
            .map
            .iter()
            .filter(|e| !e.value().is_expired() && glob_match(pattern, e.key()))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        self.check()?;
        match self.live_entry(key) {
            Some(entry) => {
                let remaining = entry.expire_at.saturating_duration_since(Instant::now());
                Ok(remaining.as_secs() as i64)
            }
            None => Ok(-2),
        }
    }

    async fn info(&self) -> Result<BackendInfo> {
        self.check()?;
        Ok(BackendInfo {
            backend: self.name().to_string(),
            connected_clients: None,
            used_memory_human: None,
            keyspace: Some(format!("keys={}", self.len())),
        })
    }
}
