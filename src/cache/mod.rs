//! 缓存管理

pub mod admin;
pub mod backend;
pub mod cache_store;
pub mod memoize;
pub mod memory_backend;
pub mod redis_backend;
#[cfg(test)]
pub(crate) mod test_backend;

// 重新导出
pub use admin::{CacheKeysReport, CacheOpResult, CacheSelfTest, CacheStatus};
pub use backend::{BackendInfo, CacheBackend};
pub use cache_store::CacheStore;
pub use memory_backend::InMemoryBackend;
pub use redis_backend::RedisBackend;
