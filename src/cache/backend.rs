//! 缓存后端接口
//!
//! 后端只处理序列化后的字符串，TTL 由调用方按分类传入。
//! 所有方法都可能失败，失败的降级处理由 `CacheStore` 负责。

use anyhow::Result;

/// 后端运行信息（运维接口使用）
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BackendInfo {
    pub backend: String,
    pub connected_clients: Option<String>,
    pub used_memory_human: Option<String>,
    pub keyspace: Option<String>,
}

/// 缓存后端
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// 连通性探测
    async fn ping(&self) -> Result<()>;

    /// 获取原始值，键不存在返回 None
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 写入并设置过期时间（秒）
    async fn set_ex(&self, key: &str, payload: String, ttl_secs: u64) -> Result<()>;

    /// 删除键，返回是否删除了数据
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// 清空全部数据
    async fn flush_all(&self) -> Result<()>;

    /// 按 glob 模式列出键（仅支持 `*` 与 `?`）
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// 剩余存活秒数；-2 表示键不存在，-1 表示永不过期
    async fn ttl(&self, key: &str) -> Result<i64>;

    async fn info(&self) -> Result<BackendInfo>;
}

/// glob 匹配，语义与 Redis KEYS 的 `*`、`?` 一致
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
