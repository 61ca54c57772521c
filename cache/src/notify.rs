//! Coalesces mutations recorded in the [`crate::changelog::ChangeLog`] into
//! a single delta event, published on a fixed interval.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::store::Store;

/// Default notification interval, in seconds. `0` means disabled.
pub const DEFAULT_NOTIFICATION_INTERVAL_SECS: u64 = 0;

/// Capacity of the broadcast channel's internal ring buffer. A slow
/// subscriber that falls behind more than this many events will observe a
/// `RecvError::Lagged` on its next receive, per `tokio::sync::broadcast`
/// semantics -- the Notifier itself never blocks waiting for delivery.
const CHANNEL_CAPACITY: usize = 32;

/// A single coalesced delta: everything inserted, updated, or removed since
/// the previous published event. A given key appears in at most one of
/// the two fields.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheChangeEvent<K, V> {
    /// Keys inserted or updated since the last event, mapped to their
    /// latest value.
    pub updated: HashMap<K, V>,
    /// Keys removed since the last event.
    pub removed: HashSet<K>,
}

/// A subscription handle for the change notification channel. Receives one
/// [`CacheChangeEvent`] per published tick, in tick order.
pub type ChangeSubscriber<K, V> = broadcast::Receiver<CacheChangeEvent<K, V>>;

pub(crate) struct Notifier<K, V> {
    sender: broadcast::Sender<CacheChangeEvent<K, V>>,
    timer: crate::timer::RecurringTimer,
}

impl<K, V> Notifier<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(store: Arc<Store<K, V>>, interval_secs: u64) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let tick_sender = sender.clone();
        let timer = crate::timer::RecurringTimer::spawn(interval_secs, move || {
            let (updated, removed) = store.take_change_log();
            if updated.is_empty() && removed.is_empty() {
                return;
            }
            log::debug!(
                "publishing cache change event: {} updated, {} removed",
                updated.len(),
                removed.len()
            );
            // `send` errors only when there are zero subscribers; that is
            // not a failure worth surfacing -- the event is simply
            // discarded, matching posting to a notification center with no
            // observers.
            let _ = tick_sender.send(CacheChangeEvent { updated, removed });
        });

        Notifier { sender, timer }
    }

    pub(crate) fn subscribe(&self) -> ChangeSubscriber<K, V> {
        self.sender.subscribe()
    }

    pub(crate) fn set_interval(&self, seconds: u64) {
        self.timer.set_interval(seconds);
    }
}
