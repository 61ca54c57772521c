//! The authoritative Key -> Value mapping, with the reader/writer discipline
//! that lets concurrent reads coexist with exclusive, totally-ordered
//! writes.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::changelog::ChangeLog;

/// The Key -> Value map plus its change log, guarded by a single
/// readers-writer lock.
///
/// Readers (`get`, `snapshot`) run in parallel with each other. Writers
/// (`put`, `remove`, `remove_all`, `add_entries`, `get_or_load` on a miss)
/// run exclusively: while a writer holds the lock no reader and no other
/// writer can proceed. This is the standard `RwLock` discipline and gives
/// the crate its single-writer-discipline guarantee for free.
pub(crate) struct Store<K, V> {
    inner: RwLock<Inner<K, V>>,
}

struct Inner<K, V> {
    map: HashMap<K, V>,
    log: ChangeLog<K, V>,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn new() -> Self {
        Store { inner: RwLock::new(Inner { map: HashMap::new(), log: ChangeLog::default() }) }
    }

    /// Recovers transparently from a poisoned lock. Every mutation guarded
    /// by this lock is a single insert/remove pair on the map and its
    /// change log, so a panic partway through cannot leave either torn;
    /// there is nothing for a caller to react to, so poisoning is not
    /// surfaced as an error; the store never fails for in-bounds operations.
    fn read(&self) -> RwLockReadGuard<'_, Inner<K, V>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<K, V>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the value for `key`, or `None` if absent. Runs under the
    /// reader lock, in parallel with other readers.
    pub(crate) fn get(&self, key: &K) -> Option<V> {
        let guard = self.read();
        guard.map.get(key).cloned()
    }

    /// `put(key, Some(value))` inserts/replaces; `put(key, None)` is
    /// equivalent to `remove([key])`.
    pub(crate) fn put(&self, key: K, value: Option<V>) {
        let mut guard = self.write();
        match value {
            Some(v) => {
                guard.map.insert(key.clone(), v.clone());
                guard.log.record_update(key, v);
            }
            None => {
                if guard.map.remove(&key).is_some() {
                    guard.log.record_removal(key);
                }
            }
        }
    }

    /// Removes every key in `keys`. Keys not present are ignored.
    pub(crate) fn remove<I: IntoIterator<Item = K>>(&self, keys: I) {
        let mut guard = self.write();
        for key in keys {
            if guard.map.remove(&key).is_some() {
                guard.log.record_removal(key);
            }
        }
    }

    /// Atomically empties the store. Every key that was present is
    /// recorded as removed.
    pub(crate) fn remove_all(&self) {
        let mut guard = self.write();
        let keys: Vec<K> = guard.map.keys().cloned().collect();
        guard.map.clear();
        for key in keys {
            guard.log.record_removal(key);
        }
    }

    /// Atomically merges `entries` into the store. Every key in `entries`
    /// is recorded as updated, even if an identical key-value pair was
    /// already present -- callers expect bulk adds to always surface in
    /// the next change notification.
    pub(crate) fn add_entries(&self, entries: HashMap<K, V>) {
        let mut guard = self.write();
        for (key, value) in entries {
            guard.map.insert(key.clone(), value.clone());
            guard.log.record_update(key, value);
        }
    }

    /// An independent copy of the store's contents at some instant between
    /// call and return. Mutating the cache afterwards does not affect the
    /// returned map.
    pub(crate) fn snapshot(&self) -> HashMap<K, V> {
        let guard = self.read();
        guard.map.clone()
    }

    /// Single-flight get-or-load: on a miss, `loader` is invoked at most
    /// once across concurrently racing callers, with the writer lock held
    /// for the duration of the call.
    ///
    /// Caller contract: `loader` must not call back into this same cache
    /// (directly or transitively) for the same key, or any operation that
    /// needs the writer lock -- the lock is already held and non-reentrant,
    /// so such a call deadlocks. This is not defended against.
    pub(crate) fn get_or_load<F>(&self, key: K, loader: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        if let Some(value) = self.get(&key) {
            return Some(value);
        }
        let mut guard = self.write();
        if let Some(value) = guard.map.get(&key) {
            return Some(value.clone());
        }
        match loader() {
            Some(value) => {
                guard.map.insert(key.clone(), value.clone());
                guard.log.record_update(key, value.clone());
                Some(value)
            }
            None => None,
        }
    }

    /// Takes a lightweight (Key, Value) snapshot for the eviction pass to
    /// evaluate without holding the lock while the predicate runs.
    pub(crate) fn snapshot_entries(&self) -> Vec<(K, V)> {
        let guard = self.read();
        guard.map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Removes each key in `candidates` whose current value still equals
    /// `snapshot_value` (by `PartialEq`), recording the removal. Keys whose
    /// value has changed since the snapshot are left untouched -- the
    /// eviction decision for them is stale.
    pub(crate) fn remove_if_unchanged(&self, candidates: Vec<(K, V)>)
    where
        V: PartialEq,
    {
        let mut guard = self.write();
        for (key, snapshot_value) in candidates {
            let still_current = guard.map.get(&key).map(|v| *v == snapshot_value).unwrap_or(false);
            if still_current {
                guard.map.remove(&key);
                guard.log.record_removal(key);
            }
        }
    }

    /// Swaps out the change log's contents. Used by the Notifier on tick.
    pub(crate) fn take_change_log(&self) -> (HashMap<K, V>, std::collections::HashSet<K>) {
        let mut guard = self.write();
        guard.log.take()
    }
}
