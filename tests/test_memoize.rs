mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use volume_tracker::app_config::{CacheCategory, CacheKeys};
use volume_tracker::cache::CacheBackend;
use volume_tracker::error::UpstreamError;

use support::{down_store, live_store};

#[tokio::test]
async fn test_producer_runs_once_with_live_cache() {
    let (_, store) = live_store().await;
    let calls = AtomicUsize::new(0);
    let key = CacheKeys::historical("bitcoin", 30);

    for _ in 0..2 {
        let value: Result<Vec<u64>, UpstreamError> = store
            .get_or_set(&key, CacheCategory::HistoricalData, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![1, 2, 3])
            })
            .await;
        assert_eq!(value, Ok(vec![1, 2, 3]));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(store.exists(&key).await);
}

#[tokio::test]
async fn test_producer_runs_every_call_when_disconnected() {
    let (_, store) = down_store().await;
    let calls = AtomicUsize::new(0);

    for i in 1..=3 {
        let value: Result<String, UpstreamError> = store
            .get_or_set("search:eth", CacheCategory::SearchResults, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("computed".to_string())
            })
            .await;
        assert_eq!(value.as_deref(), Ok("computed"));
        assert_eq!(calls.load(Ordering::SeqCst), i);
    }
    assert!(!store.health());
}

#[tokio::test]
async fn test_producer_error_propagates_and_is_not_cached() {
    let (backend, store) = live_store().await;
    let calls = AtomicUsize::new(0);

    let first: Result<u32, UpstreamError> = store
        .get_or_set("coin_data:bitcoin", CacheCategory::CoinData, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(UpstreamError::RateLimited)
        })
        .await;
    assert_eq!(first, Err(UpstreamError::RateLimited));
    assert!(backend.is_empty());

    let second: Result<u32, UpstreamError> = store
        .get_or_set("coin_data:bitcoin", CacheCategory::CoinData, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        })
        .await;
    assert_eq!(second, Ok(7));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_outage_degrades_to_passthrough() {
    let (backend, store) = live_store().await;
    let calls = AtomicUsize::new(0);
    let produce = || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, UpstreamError>(42u32)
    };

    assert_eq!(store.get_or_set("k", CacheCategory::MarketData, produce).await, Ok(42));
    backend.set_available(false);

    // 命中失败 -> 断线 -> 穿透到 producer
    assert_eq!(store.get_or_set("k", CacheCategory::MarketData, produce).await, Ok(42));
    assert!(!store.health());
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // 断线期间的读写都返回哨兵值
    assert_eq!(store.get::<u32>("k").await, None);
    assert!(!store.set("k", &1u32, CacheCategory::MarketData).await);
    assert!(!store.exists("k").await);
    assert!(!store.delete("k").await);
    assert!(!store.flush_all().await);
}

#[tokio::test]
async fn test_cached_value_is_returned_unmodified() {
    let (_, store) = live_store().await;
    assert!(store.set("trending_data", &vec!["a", "b"], CacheCategory::TrendingData).await);

    let value: Result<Vec<String>, UpstreamError> = store
        .get_or_set("trending_data", CacheCategory::TrendingData, || async {
            Ok(vec!["fresh".to_string()])
        })
        .await;
    assert_eq!(value, Ok(vec!["a".to_string(), "b".to_string()]));
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_category_ttl() {
    let (_, store) = live_store().await;
    let calls = AtomicUsize::new(0);
    let ttl = Duration::from_secs(CacheCategory::CoinData.ttl_secs());
    let produce = || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, UpstreamError>(1u32)
    };

    store.get_or_set("coin_data:eth", CacheCategory::CoinData, produce).await.unwrap();
    tokio::time::advance(ttl - Duration::from_secs(1)).await;
    store.get_or_set("coin_data:eth", CacheCategory::CoinData, produce).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    store.get_or_set("coin_data:eth", CacheCategory::CoinData, produce).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_write_uses_category_ttl() {
    let (backend, store) = live_store().await;
    for category in CacheCategory::ALL {
        let key = format!("ttl_check:{}", category);
        assert!(store.set(&key, &1u32, category).await);
        assert_eq!(backend.ttl(&key).await.unwrap(), category.ttl_secs() as i64);
    }
    assert_eq!(
        backend.ttl("ttl_check:historical_data").await.unwrap(),
        3600
    );
}
