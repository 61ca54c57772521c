//! Idempotence laws and boundary behaviors from the cache's design notes.

use std::collections::HashMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serial_test::serial;

use kv_cache::{Cache, CacheConfig};

#[test]
fn repeated_put_is_idempotent_for_observers() {
    let cache: Cache<&str, i32> = Cache::new(CacheConfig::default());
    cache.put("a", Some(1));
    cache.put("a", Some(1));
    assert_eq!(cache.get(&"a"), Some(1));
}

#[test]
fn repeated_remove_is_idempotent() {
    let cache: Cache<&str, i32> = Cache::new(CacheConfig::default());
    cache.put("a", Some(1));
    cache.remove(["a"]);
    cache.remove(["a"]);
    assert_eq!(cache.get(&"a"), None);
}

#[test]
fn remove_all_then_get_is_always_absent() {
    let cache: Cache<&str, i32> = Cache::new(CacheConfig::default());
    cache.add_entries(HashMap::from([("a", 1), ("b", 2), ("c", 3)]));
    cache.remove_all();
    assert_eq!(cache.get(&"a"), None);
    assert_eq!(cache.get(&"b"), None);
    assert_eq!(cache.get(&"c"), None);
}

#[test]
fn zero_eviction_interval_disables_periodic_pass_but_purge_still_works() {
    let predicate = |_k: &&str, v: &i32, _ctx: Option<&()>| *v == 0;
    let cache: Cache<&str, i32> = Cache::with_predicate(
        CacheConfig::default().with_eviction_interval_secs(0),
        predicate,
    );
    cache.put("x", Some(0));
    cache.purge(None);
    assert_eq!(cache.get(&"x"), None);
}

#[tokio::test]
#[serial]
async fn zero_notification_interval_never_publishes_regardless_of_mutation_volume() {
    let cache: Cache<&str, i32> = Cache::new(CacheConfig::default());
    let mut sub = cache.subscribe();

    for i in 0..50 {
        cache.put("a", Some(i));
    }

    let result = tokio::time::timeout(Duration::from_millis(300), sub.recv()).await;
    assert!(result.is_err(), "notification_interval=0 must suppress all events");
}

#[test]
fn no_eviction_predicate_means_ticks_and_purge_are_no_ops() {
    let cache: Cache<&str, i32> = Cache::new(CacheConfig::default());
    cache.put("x", Some(0));
    cache.purge(None);
    assert_eq!(cache.get(&"x"), Some(0));
}

#[test]
fn negative_like_interval_input_disables_timer() {
    // The public API takes unsigned seconds directly, so "negative" is
    // represented by any non-positive value; 0 is the only such value a
    // `u64` can hold, and it must disable the timer exactly as documented.
    let cache: Cache<&str, i32> = Cache::new(
        CacheConfig::default().with_eviction_interval_secs(0).with_notification_interval_secs(0),
    );
    cache.set_eviction_interval_secs(0);
    cache.set_notification_interval_secs(0);
    cache.put("a", Some(1));
    assert_eq!(cache.get(&"a"), Some(1));
}
