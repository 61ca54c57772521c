//! The public entry point: wires the [`Store`], [`EvictionEngine`], and
//! [`Notifier`] together behind one handle.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::config::CacheConfig;
use crate::eviction::{EvictionEngine, EvictionPredicate};
use crate::notify::{CacheChangeEvent, ChangeSubscriber, Notifier};
use crate::store::Store;

/// A thread-safe, in-process key-value cache.
///
/// Reads (`get`, `snapshot`) run concurrently with each other; writes
/// (`put`, `remove`, `remove_all`, `add_entries`, and a missed
/// `get_or_load`) are serialized with respect to reads and each other. An
/// optional eviction predicate is consulted on a recurring timer (and on
/// demand via [`Cache::purge`]) to decide which entries to drop. An
/// optional recurring timer also coalesces every mutation since its last
/// tick into a single [`CacheChangeEvent`] published to subscribers.
///
/// `Ctx` is the arbitrary context value threaded through to the eviction
/// predicate on a manual [`Cache::purge`]; it defaults to `()` for caches
/// that don't need one. The automatic periodic eviction tick always passes
/// `None` for the context, regardless of `Ctx`.
pub struct Cache<K, V, Ctx = ()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: Option<String>,
    store: Arc<Store<K, V>>,
    eviction: EvictionEngine<K, V, Ctx>,
    notifier: Notifier<K, V>,
}

impl<K, V> Cache<K, V, ()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache with no eviction predicate -- periodic and manual
    /// eviction passes are both no-ops until one is supplied via
    /// [`Cache::with_predicate`]. Unlike `with_predicate`, this does not
    /// need `V: PartialEq`: the spec's Value bound (§3) is just `Clone +
    /// Send + Sync + 'static`, and equality is only ever needed to re-check
    /// an eviction candidate against a stale snapshot.
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(Store::new());
        let eviction = EvictionEngine::new(store.clone(), config.eviction_interval_secs);
        let notifier = Notifier::new(store.clone(), config.notification_interval_secs);
        log::info!(
            "cache{} created: eviction_interval={}s notification_interval={}s",
            config.name.as_ref().map(|n| format!(" \"{n}\"")).unwrap_or_default(),
            config.eviction_interval_secs,
            config.notification_interval_secs,
        );
        Cache { name: config.name, store, eviction, notifier }
    }
}

impl<K, V, Ctx> Cache<K, V, Ctx>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    /// Creates a cache whose eviction predicate receives a `Ctx` context
    /// value on manual [`Cache::purge`] calls. `V: PartialEq` is required
    /// here (and nowhere else in this type) to re-check a candidate against
    /// its snapshot value before removing it -- see `EvictionEngine::with_predicate`.
    pub fn with_predicate<P>(config: CacheConfig, predicate: P) -> Self
    where
        P: EvictionPredicate<K, V, Ctx> + 'static,
    {
        let store = Arc::new(Store::new());
        let eviction = EvictionEngine::with_predicate(
            store.clone(),
            predicate,
            config.eviction_interval_secs,
        );
        let notifier = Notifier::new(store.clone(), config.notification_interval_secs);
        log::info!(
            "cache{} created: eviction_interval={}s notification_interval={}s",
            config.name.as_ref().map(|n| format!(" \"{n}\"")).unwrap_or_default(),
            config.eviction_interval_secs,
            config.notification_interval_secs,
        );
        Cache { name: config.name, store, eviction, notifier }
    }
}

impl<K, V, Ctx> Cache<K, V, Ctx>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    /// The cache's diagnostic name, if one was given at construction.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the value for `key`, or `None` if absent.
    pub fn get(&self, key: &K) -> Option<V> {
        self.store.get(key)
    }

    /// Sets the value for `key`. `put(key, None)` is equivalent to
    /// `remove([key])`.
    pub fn put(&self, key: K, value: Option<V>) {
        self.store.put(key, value);
    }

    /// Removes the entries for every key in `keys`. Keys not present are
    /// silently ignored.
    pub fn remove<I: IntoIterator<Item = K>>(&self, keys: I) {
        self.store.remove(keys);
    }

    /// Atomically removes every entry currently in the cache.
    pub fn remove_all(&self) {
        self.store.remove_all();
    }

    /// Atomically merges `entries` into the cache.
    pub fn add_entries(&self, entries: HashMap<K, V>) {
        self.store.add_entries(entries);
    }

    /// An independent copy of the cache's contents, decoupled from later
    /// mutations. The recommended way to iterate: the cache does not
    /// expose a streaming iterator that would hold its lock.
    pub fn snapshot(&self) -> HashMap<K, V> {
        self.store.snapshot()
    }

    /// Returns the value for `key`, invoking `loader` on a miss. At most
    /// one invocation of `loader` runs across calls racing on the same
    /// key; the writer lock is held for the duration of the call.
    ///
    /// `loader` must not call back into this cache for the same key (or
    /// any operation requiring the writer lock) -- the lock is already
    /// held and this will deadlock. Not defended against; documented
    /// caller contract.
    pub fn get_or_load<F>(&self, key: K, loader: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        self.store.get_or_load(key, loader)
    }

    /// Runs an immediate eviction pass on the caller's thread, passing
    /// `context` through to the predicate. A no-op if no predicate was
    /// configured. Serialized with respect to periodic eviction ticks.
    pub fn purge(&self, context: Option<&Ctx>) {
        self.eviction.purge(context);
    }

    /// Current eviction interval in seconds. `0` means periodic eviction is
    /// disabled (manual `purge` still works).
    pub fn set_eviction_interval_secs(&self, seconds: u64) {
        self.eviction.set_interval(seconds);
    }

    /// Current notification interval in seconds. `0` means no periodic
    /// notifications are published.
    pub fn set_notification_interval_secs(&self, seconds: u64) {
        self.notifier.set_interval(seconds);
    }

    /// Subscribes to the change notification channel. Each subscriber
    /// receives one [`CacheChangeEvent`] per published tick, in tick
    /// order, starting from the point of subscription.
    pub fn subscribe(&self) -> ChangeSubscriber<K, V> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_put_get() {
        let cache: Cache<&str, i32> = Cache::new(CacheConfig::default());
        cache.put("a", Some(1));
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
    }

    /// A value type without `PartialEq` must still support the base
    /// surface of a predicate-less cache -- spec.md §3's Value is "opaque...
    /// the cache does not inspect values," and the bound on `Cache::new`
    /// must not ask for more than that.
    #[test]
    fn basic_put_get_works_for_a_value_type_without_partial_eq() {
        #[derive(Clone)]
        struct Opaque(#[allow(dead_code)] i32);

        let cache: Cache<&str, Opaque> = Cache::new(CacheConfig::default());
        cache.put("a", Some(Opaque(1)));
        assert!(cache.get(&"a").is_some());
        assert!(cache.get(&"b").is_none());
    }

    #[test]
    fn name_is_diagnostic_only() {
        let cache: Cache<&str, i32> = Cache::new(CacheConfig::named("sessions"));
        assert_eq!(cache.name(), Some("sessions"));
    }

    #[test]
    fn eviction_and_notification_disabled_by_default_config_variant() {
        // eviction_interval defaults to 600s (enabled), notification to 0
        // (disabled); neither should need to fire for this test to pass
        // quickly, it just exercises construction + teardown.
        let cache: Cache<&str, i32> = Cache::new(CacheConfig::default());
        cache.put("a", Some(1));
        drop(cache);
    }

    #[tokio::test]
    async fn eviction_with_context_from_manual_purge() {
        let predicate = |_k: &&str, v: &i32, ctx: Option<&i32>| ctx == Some(v);
        let cache: Cache<&str, i32, i32> =
            Cache::with_predicate(CacheConfig::default().with_eviction_interval_secs(0), predicate);
        cache.add_entries(HashMap::from([("a", 1), ("b", 2)]));
        cache.purge(Some(&1));
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[tokio::test]
    async fn drop_cancels_timers_without_hanging() {
        let cache: Cache<&str, i32> = Cache::new(
            CacheConfig::default().with_eviction_interval_secs(1).with_notification_interval_secs(1),
        );
        cache.put("a", Some(1));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(cache); // must not hang: timer threads are joined here.
    }
}
