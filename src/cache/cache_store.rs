//! 缓存存储
//!
//! 在任意 [`CacheBackend`] 之上提供按分类 TTL 的键值读写，并维护连接健康状态：
//!
//! - Connected：正常转发到后端
//! - Disconnected：所有操作直接返回 "未命中 / false"，不会向调用方抛错
//!
//! 后端任何命令失败或超时都会切换到 Disconnected；
//! 断线期间按 `reconnect_interval` 节流发起 PING 探测，成功即回到 Connected。

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::app_config::{CacheCategory, CacheConfig};
use crate::cache::backend::CacheBackend;

pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    connected: AtomicBool,
    op_timeout: Duration,
    reconnect_interval: Duration,
    last_probe: Mutex<Option<Instant>>,
}

impl CacheStore {
    /// 创建并立即探测一次后端，探测失败时以 Disconnected 状态返回
    pub async fn connect(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        let store = Self::disconnected(backend, config);
        store.touch_probe();
        store.probe().await;
        store
    }

    /// 创建处于 Disconnected 状态的存储，首次操作时才会探测
    pub fn disconnected(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            connected: AtomicBool::new(false),
            op_timeout: config.op_timeout,
            reconnect_interval: config.reconnect_interval,
            last_probe: Mutex::new(None),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub(crate) fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// 当前连接状态
    pub fn health(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn probe(&self) -> bool {
        match tokio::time::timeout(self.op_timeout, self.backend.ping()).await {
            Ok(Ok(())) => {
                if !self.connected.swap(true, Ordering::SeqCst) {
                    info!("Cache backend {} connected", self.backend.name());
                }
                true
            }
            Ok(Err(e)) => {
                error!("Cache backend {} connect error: {}", self.backend.name(), e);
                self.connected.store(false, Ordering::SeqCst);
                false
            }
            Err(_) => {
                error!(
                    "Cache backend {} connect timed out after {:?}",
                    self.backend.name(),
                    self.op_timeout
                );
                self.connected.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    fn touch_probe(&self) {
        if let Ok(mut last) = self.last_probe.lock() {
            *last = Some(Instant::now());
        }
    }

    /// 检查是否到了探测时间，到了则在同一把锁内记下本次探测
    fn claim_probe(&self) -> bool {
        match self.last_probe.lock() {
            Ok(mut last) => {
                let due = match *last {
                    Some(at) => at.elapsed() >= self.reconnect_interval,
                    None => true,
                };
                if due {
                    *last = Some(Instant::now());
                }
                due
            }
            Err(_) => false,
        }
    }

    /// Connected 直接返回 true；Disconnected 时按节流间隔尝试重连
    pub(crate) async fn ensure_connected(&self) -> bool {
        if self.health() {
            return true;
        }
        if self.claim_probe() {
            return self.probe().await;
        }
        false
    }

    fn mark_disconnected(&self) {
        self.touch_probe();
        if self.connected.swap(false, Ordering::SeqCst) {
            warn!(
                "Cache backend {} marked disconnected, degrading to passthrough",
                self.backend.name()
            );
        }
    }

    /// 执行一次后端命令：超时或失败时记录日志、切换为断线，并返回 None
    pub(crate) async fn run<T, F>(&self, op: &'static str, key: &str, fut: F) -> Option<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                error!("Cache {} error, key: {}, err: {}", op, key, e);
                self.mark_disconnected();
                None
            }
            Err(_) => {
                error!("Cache {} timed out after {:?}, key: {}", op, self.op_timeout, key);
                self.mark_disconnected();
                None
            }
        }
    }

    /// 读取原始字符串；断线、出错、不存在都返回 None
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        if !self.ensure_connected().await {
            return None;
        }
        self.run("get", key, self.backend.get(key)).await.flatten()
    }

    /// 读取并反序列化；内容无法解析时按未命中处理
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key).await?;
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Cache payload decode failed, key: {}, err: {}", key, e);
                None
            }
        }
    }

    /// 序列化后按分类 TTL 写入；返回 false 表示未缓存，调用方应继续执行而不是报错
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        category: CacheCategory,
    ) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                error!("Cache set serialize error, key: {}, err: {}", key, e);
                return false;
            }
        };
        self.set_payload(key, payload, category).await
    }

    pub(crate) async fn set_payload(
        &self,
        key: &str,
        payload: String,
        category: CacheCategory,
    ) -> bool {
        if !self.ensure_connected().await {
            return false;
        }
        self.run(
            "set",
            key,
            self.backend.set_ex(key, payload, category.ttl_secs()),
        )
        .await
        .is_some()
    }

    pub async fn exists(&self, key: &str) -> bool {
        if !self.ensure_connected().await {
            return false;
        }
        self.run("exists", key, self.backend.exists(key))
            .await
            .unwrap_or(false)
    }

    /// 删除成功（包括键本就不存在）返回 true，断线或失败返回 false
    pub async fn delete(&self, key: &str) -> bool {
        if !self.ensure_connected().await {
            return false;
        }
        self.run("delete", key, self.backend.delete(key)).await.is_some()
    }

    pub async fn flush_all(&self) -> bool {
        if !self.ensure_connected().await {
            return false;
        }
        let flushed = self.run("flush", "*", self.backend.flush_all()).await.is_some();
        if flushed {
            info!("Cache flushed");
        }
        flushed
    }
}
