use anyhow::{anyhow, Result};
use redis::{Client, ConnectionInfo, IntoConnectionInfo};

use crate::app_config::env::{env_opt, env_or_default};

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";

/// Redis 连接配置
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub password: Option<String>,
}

impl RedisConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or_default("REDIS_HOST", DEFAULT_REDIS_URL),
            password: env_opt("REDIS_PASSWORD"),
        }
    }

    /// REDIS_PASSWORD 优先于 URL 中的密码
    pub fn connection_info(&self) -> Result<ConnectionInfo> {
        let mut info = self
            .url
            .as_str()
            .into_connection_info()
            .map_err(|e| anyhow!("Invalid redis url {}: {}", self.url, e))?;
        if let Some(password) = &self.password {
            info.redis.password = Some(password.clone());
        }
        Ok(info)
    }

    pub fn open_client(&self) -> Result<Client> {
        Client::open(self.connection_info()?)
            .map_err(|e| anyhow!("Failed to create Redis client: {}", e))
    }
}
