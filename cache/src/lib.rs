//! `kv-cache` is a thread-safe, in-process key-value cache, similar in
//! shape to a `HashMap` guarded by a readers-writer lock, but with two
//! extra behaviors layered on top: periodic, predicate-driven eviction and
//! periodic, coalesced change notifications.
//!
//! Concurrent reads run in parallel with each other; writes (including a
//! missed [`Cache::get_or_load`]) are serialized with respect to reads and
//! other writes. An optional eviction predicate runs on a recurring timer
//! (and on demand via [`Cache::purge`]) to decide which entries to drop. An
//! optional recurring timer coalesces every mutation since its last tick
//! into a single delta event, published to any subscriber of the change
//! notification channel.
//!
//! ## Getting started
//!
//! ```rust
//! use kv_cache::{Cache, CacheConfig};
//!
//! fn main() {
//!     let cache: Cache<String, i32> = Cache::new(CacheConfig::named("scores"));
//!
//!     cache.put("alice".to_string(), Some(10));
//!     cache.put("bob".to_string(), Some(7));
//!
//!     assert_eq!(cache.get(&"alice".to_string()), Some(10));
//!     assert_eq!(cache.get(&"carol".to_string()), None);
//!
//!     cache.remove(["bob".to_string()]);
//!     assert_eq!(cache.get(&"bob".to_string()), None);
//!
//!     let all = cache.snapshot();
//!     assert_eq!(all.len(), 1);
//! }
//! ```
//!
//! On-disk persistence and model (de)serialization are explicitly out of
//! scope of this crate -- see [`ports`] for the trait boundary a
//! persistence layer built on top would implement against.

mod cache;
mod changelog;
pub mod config;
pub mod error;
pub mod eviction;
pub mod notify;
pub mod ports;
mod store;
mod timer;

pub use cache::Cache;
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use eviction::EvictionPredicate;
pub use notify::{CacheChangeEvent, ChangeSubscriber};
