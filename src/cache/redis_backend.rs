use anyhow::{anyhow, Result};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisResult};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::app_config::RedisConfig;
use crate::cache::backend::{BackendInfo, CacheBackend};

/// Redis 缓存后端
///
/// 持有一个多路复用连接，命令失败后丢弃该连接，下次使用时重新建立。
pub struct RedisBackend {
    client: Client,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl RedisBackend {
    /// 只创建客户端，不建立连接
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = config.open_client()?;
        Ok(Self {
            client,
            conn: Mutex::new(None),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| anyhow!("Failed to get multiplexed connection: {}", e))?;
        info!("Connected to Redis");
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn reset(&self) {
        let mut guard = self.conn.lock().await;
        if guard.take().is_some() {
            debug!("Redis connection dropped, will reconnect on next use");
        }
    }

    /// 命令失败时重置连接
    async fn checked<T>(&self, result: RedisResult<T>) -> Result<T> {
        match result {
            Ok(v) => Ok(v),
            Err(e) => {
                if e.is_connection_dropped() || e.is_io_error() || e.is_timeout() {
                    self.reset().await;
                }
                Err(e.into())
            }
        }
    }
}

/// 从 INFO 输出中提取 `field:value`
fn info_field(info: &str, field: &str) -> Option<String> {
    info.lines().find_map(|line| {
        line.trim()
            .strip_prefix(field)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(|v| v.trim().to_string())
    })
}

#[async_trait::async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        self.checked(result).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let result: RedisResult<Option<String>> = conn.get(key).await;
        self.checked(result).await
    }

    async fn set_ex(&self, key: &str, payload: String, ttl_secs: u64) -> Result<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<()> = conn.set_ex(key, payload, ttl_secs).await;
        self.checked(result).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let result: RedisResult<i64> = conn.del(key).await;
        Ok(self.checked(result).await? > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let result: RedisResult<bool> = conn.exists(key).await;
        self.checked(result).await
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<()> = redis::cmd("FLUSHALL").query_async(&mut conn).await;
        self.checked(result).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let result: RedisResult<Vec<String>> = conn.keys(pattern).await;
        self.checked(result).await
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection().await?;
        let result: RedisResult<i64> = conn.ttl(key).await;
        self.checked(result).await
    }

    async fn info(&self) -> Result<BackendInfo> {
        let mut conn = self.connection().await?;
        let result: RedisResult<String> = redis::cmd("INFO").query_async(&mut conn).await;
        let info = self.checked(result).await?;
        Ok(BackendInfo {
            backend: self.name().to_string(),
            connected_clients: info_field(&info, "connected_clients"),
            used_memory_human: info_field(&info, "used_memory_human"),
            keyspace: info_field(&info, "db0"),
        })
    }
}
