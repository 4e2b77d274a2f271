pub mod bootstrap;

pub use bootstrap::{build_cache_store, build_services, CacheMode};
