//! Construction-time configuration for a [`crate::cache::Cache`].
//!
//! Mirrors the `ConfigLoad`-with-`Default`-impl shape the wider workspace
//! uses for its CLI settings: a plain struct with a sensible `Default`,
//! validated on demand rather than on every field write.

use crate::error::{CacheError, CacheResult};
use crate::eviction::DEFAULT_EVICTION_INTERVAL_SECS;
use crate::notify::DEFAULT_NOTIFICATION_INTERVAL_SECS;

/// Construction-time settings for a cache. Names are read-only for the
/// lifetime of the cache; intervals set here are just the initial values --
/// both can be reconfigured afterwards through the cache's own setters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheConfig {
    /// Optional human-readable name, used only for diagnostics. Not an
    /// identifier: collisions between caches are permitted.
    pub name: Option<String>,
    /// Initial eviction interval in seconds. `0` disables periodic
    /// eviction; `purge` remains available regardless.
    pub eviction_interval_secs: u64,
    /// Initial notification interval in seconds. `0` (the default) means
    /// no periodic notifications are published.
    pub notification_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            name: None,
            eviction_interval_secs: DEFAULT_EVICTION_INTERVAL_SECS,
            notification_interval_secs: DEFAULT_NOTIFICATION_INTERVAL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn named(name: impl Into<String>) -> Self {
        CacheConfig { name: Some(name.into()), ..Self::default() }
    }

    pub fn with_eviction_interval_secs(mut self, secs: u64) -> Self {
        self.eviction_interval_secs = secs;
        self
    }

    pub fn with_notification_interval_secs(mut self, secs: u64) -> Self {
        self.notification_interval_secs = secs;
        self
    }

    /// Validates the config in isolation. The cache itself never rejects an
    /// interval (non-positive just disables the timer), so this
    /// is only useful to an external layer -- e.g. one loading a
    /// `CacheConfig` out of a persisted settings file -- that wants to
    /// reject nonsensical values (such as an interval too large to express
    /// as seconds) before constructing the cache.
    pub fn validate(&self) -> CacheResult<()> {
        const MAX_REASONABLE_SECS: u64 = 10 * 365 * 24 * 60 * 60; // ~10 years
        if self.eviction_interval_secs > MAX_REASONABLE_SECS {
            return Err(CacheError::InvalidInterval(format!(
                "eviction_interval_secs {} exceeds maximum of {}",
                self.eviction_interval_secs, MAX_REASONABLE_SECS
            )));
        }
        if self.notification_interval_secs > MAX_REASONABLE_SECS {
            return Err(CacheError::InvalidInterval(format!(
                "notification_interval_secs {} exceeds maximum of {}",
                self.notification_interval_secs, MAX_REASONABLE_SECS
            )));
        }
        Ok(())
    }
}
