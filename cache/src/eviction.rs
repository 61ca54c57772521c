//! Periodically asks a caller-supplied predicate which entries should be
//! evicted, and removes them.

use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::store::Store;
use crate::timer::RecurringTimer;

/// Default eviction interval, in seconds (10 minutes).
pub const DEFAULT_EVICTION_INTERVAL_SECS: u64 = 600;

/// A caller-supplied decider: given a key, its value, and a context (`None`
/// for automatic ticks, `Some` for a manual [`EvictionEngine::purge`]),
/// returns `true` if the entry should be evicted.
///
/// Called without the store lock held, against a point-in-time snapshot --
/// treat it as side-effect-free with respect to the cache it guards:
/// calling back into the same cache from inside the predicate is not
/// supported.
pub trait EvictionPredicate<K, V, Ctx>: Fn(&K, &V, Option<&Ctx>) -> bool + Send + Sync {}
impl<K, V, Ctx, F> EvictionPredicate<K, V, Ctx> for F where F: Fn(&K, &V, Option<&Ctx>) -> bool + Send + Sync {}

/// Runs one eviction pass: snapshot, evaluate the predicate off-lock, remove
/// only the candidates whose value hasn't changed since the snapshot. The
/// `V: PartialEq` bound this needs lives entirely on this function (and the
/// `Store::remove_if_unchanged` call it makes), not on `EvictionEngine`
/// itself -- see the type-erased `runner` field below.
type Runner<K, V, Ctx> = dyn Fn(&Store<K, V>, Option<&Ctx>, &Mutex<()>) + Send + Sync;

pub(crate) struct EvictionEngine<K, V, Ctx> {
    store: Arc<Store<K, V>>,
    runner: Option<Arc<Runner<K, V, Ctx>>>,
    timer: RecurringTimer,
    pass_lock: Arc<Mutex<()>>,
}

impl<K, V, Ctx> EvictionEngine<K, V, Ctx>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    /// Creates an engine with no eviction predicate. Periodic ticks and
    /// [`EvictionEngine::purge`] are both no-ops; this is the only
    /// constructor that doesn't need `V: PartialEq`, since no value is ever
    /// compared against a stale snapshot.
    pub(crate) fn new(store: Arc<Store<K, V>>, interval_secs: u64) -> Self {
        let pass_lock = Arc::new(Mutex::new(()));
        let timer = RecurringTimer::spawn(interval_secs, || {
            log::debug!("eviction timer tick (no predicate configured)");
        });
        EvictionEngine { store, runner: None, timer, pass_lock }
    }

    pub(crate) fn set_interval(&self, seconds: u64) {
        self.timer.set_interval(seconds);
    }

    /// Runs an immediate eviction pass on the caller's thread, serialized
    /// with respect to any periodic pass in flight. A no-op if no
    /// predicate was configured.
    pub(crate) fn purge(&self, context: Option<&Ctx>) {
        if let Some(runner) = &self.runner {
            runner(&self.store, context, &self.pass_lock);
        }
    }
}

impl<K, V, Ctx> EvictionEngine<K, V, Ctx>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
    Ctx: Send + Sync + 'static,
{
    /// Creates an engine that consults `predicate` on every periodic tick
    /// and every manual [`EvictionEngine::purge`]. `V: PartialEq` is needed
    /// here, and only here: it's what lets a pass tell a still-current
    /// snapshot value apart from one that's since been replaced.
    pub(crate) fn with_predicate<P>(
        store: Arc<Store<K, V>>,
        predicate: P,
        interval_secs: u64,
    ) -> Self
    where
        P: EvictionPredicate<K, V, Ctx> + 'static,
    {
        let predicate: Arc<dyn EvictionPredicate<K, V, Ctx>> = Arc::new(predicate);
        let pass_lock = Arc::new(Mutex::new(()));

        let tick_store = store.clone();
        let tick_predicate = predicate.clone();
        let tick_pass_lock = pass_lock.clone();
        let timer = RecurringTimer::spawn(interval_secs, move || {
            log::debug!("eviction timer tick");
            run_pass(&tick_store, tick_predicate.as_ref(), None, &tick_pass_lock);
        });

        let runner: Arc<Runner<K, V, Ctx>> = {
            let predicate = predicate.clone();
            Arc::new(move |store: &Store<K, V>, ctx: Option<&Ctx>, pass_lock: &Mutex<()>| {
                run_pass(store, predicate.as_ref(), ctx, pass_lock);
            })
        };

        EvictionEngine { store, runner: Some(runner), timer, pass_lock }
    }
}

fn run_pass<K, V, Ctx>(
    store: &Store<K, V>,
    predicate: &dyn EvictionPredicate<K, V, Ctx>,
    context: Option<&Ctx>,
    pass_lock: &Mutex<()>,
) where
    K: Eq + Hash + Clone,
    V: Clone + PartialEq,
{
    let _guard = pass_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    // Snapshot under the reader lock; the predicate must not see entries
    // added after this point.
    let snapshot = store.snapshot_entries();

    // Evaluate the predicate without the store lock held.
    let condemned: Vec<(K, V)> =
        snapshot.into_iter().filter(|(k, v)| predicate(k, v, context)).collect();

    // Remove only entries whose value hasn't changed since the snapshot.
    store.remove_if_unchanged(condemned);
    log::debug!("eviction pass complete");
}
