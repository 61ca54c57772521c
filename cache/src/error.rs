//! Error types returned at the edges of the cache. The Store itself never
//! fails for in-bounds operations (see the crate-level docs) -- a poisoned
//! lock is recovered from transparently rather than surfaced, since a
//! panic guarded by this lock can never leave the map and its change log
//! out of sync with each other. `CacheError` exists for the one boundary
//! condition that can go wrong: a misconfigured interval rejected by
//! [`crate::config::CacheConfig`].

/// Convenience alias used throughout the crate.
pub type CacheResult<T> = Result<T, CacheError>;

/// Failure kinds recognized by the cache's boundary operations.
///
/// Per the core's error handling design, none of these are raised by normal
/// `get`/`put`/`remove`/`snapshot` calls -- those are infallible. Returned
/// only by configuration validation that a persistence layer built atop
/// this crate might perform before handing a loaded interval to the cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An interval value could not be interpreted as a duration of whole
    /// seconds. Not raised by `Cache::set_eviction_interval` /
    /// `set_notification_interval` themselves -- those treat a
    /// non-positive value as "disable this timer", never as an error.
    /// Returned only by [`crate::config::CacheConfig::validate`].
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
}
