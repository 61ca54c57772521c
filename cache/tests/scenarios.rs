//! Integration tests for the six concrete scenarios called out in the
//! cache's design notes, exercised end to end through the public `Cache`
//! API rather than through any single module's internals.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serial_test::serial;

use kv_cache::{Cache, CacheConfig};

#[test]
fn scenario_1_basic_put_get() {
    let cache: Cache<String, i32> = Cache::new(CacheConfig::default());
    cache.put("a".to_string(), Some(1));
    assert_eq!(cache.get(&"a".to_string()), Some(1));
    assert_eq!(cache.get(&"b".to_string()), None);
}

#[tokio::test]
#[serial]
async fn scenario_2_bulk_add_and_delta_notification() {
    let cache: Cache<String, i32> = Cache::new(
        CacheConfig::default().with_notification_interval_secs(0),
    );
    let mut sub = cache.subscribe();
    cache.set_notification_interval_secs(1);

    cache.add_entries(HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]));
    cache.remove(["a".to_string()]);

    let event = tokio::time::timeout(Duration::from_secs(3), sub.recv())
        .await
        .expect("timed out waiting for the coalesced event")
        .expect("channel closed unexpectedly");

    assert_eq!(event.updated, HashMap::from([("b".to_string(), 2)]));
    assert_eq!(event.removed, HashSet::from(["a".to_string()]));
}

#[test]
fn scenario_3_single_flight_load() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    let cache: Arc<Cache<&str, i32>> = Arc::new(Cache::new(CacheConfig::default()));
    let invocations = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(10));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let cache = cache.clone();
            let invocations = invocations.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.get_or_load("k", || {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    Some(42)
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.iter().all(|r| *r == Some(42)));
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
#[serial]
async fn scenario_4_eviction_then_delta() {
    let predicate = |_k: &&str, v: &i32, _ctx: Option<&()>| *v == 0;
    let cache: Cache<&str, i32> = Cache::with_predicate(
        CacheConfig::default().with_eviction_interval_secs(0),
        predicate,
    );
    let mut sub = cache.subscribe();
    cache.set_notification_interval_secs(1);

    cache.add_entries(HashMap::from([("x", 0), ("y", 1), ("z", 0)]));
    cache.purge(None);

    let mut snapshot = cache.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.remove("y"), Some(1));

    let event = tokio::time::timeout(Duration::from_secs(3), sub.recv())
        .await
        .expect("timed out waiting for eviction's delta")
        .expect("channel closed unexpectedly");
    assert_eq!(event.removed, HashSet::from(["x", "z"]));
}

#[test]
fn scenario_5_replace_during_snapshot_discards_stale_eviction() {
    use std::sync::Barrier;

    let barrier = Arc::new(Barrier::new(2));
    let predicate_barrier = barrier.clone();
    let predicate = move |_k: &&str, v: &i32, _ctx: Option<&()>| {
        predicate_barrier.wait();
        std::thread::sleep(Duration::from_millis(100));
        *v == 0
    };

    let cache: Arc<Cache<&str, i32>> = Arc::new(Cache::with_predicate(
        CacheConfig::default().with_eviction_interval_secs(0),
        predicate,
    ));
    cache.put("x", Some(0));

    let purge_cache = cache.clone();
    let handle = std::thread::spawn(move || purge_cache.purge(None));

    barrier.wait();
    cache.put("x", Some(1));
    handle.join().unwrap();

    assert_eq!(cache.get(&"x"), Some(1));
}

#[tokio::test]
#[serial]
async fn scenario_6_disabling_notifier_mid_flight_stops_further_events() {
    let cache: Cache<String, i32> = Cache::new(CacheConfig::default());
    let mut sub = cache.subscribe();
    cache.set_notification_interval_secs(1);

    cache.put("a".to_string(), Some(1));
    let first = tokio::time::timeout(Duration::from_secs(3), sub.recv())
        .await
        .expect("timed out waiting for first tick")
        .expect("channel closed unexpectedly");
    assert_eq!(first.updated, HashMap::from([("a".to_string(), 1)]));

    cache.set_notification_interval_secs(0);
    cache.put("b".to_string(), Some(2));

    let result = tokio::time::timeout(Duration::from_millis(500), sub.recv()).await;
    assert!(result.is_err(), "no further events should be delivered once disabled");
}
