//! Trait boundaries exposed for collaborators that sit outside the core:
//! a model (de)serializer and a persistence controller. Neither is
//! implemented here -- on-disk persistence and model serialization are
//! explicit non-goals of this crate -- but the shapes below are what such a
//! collaborator would implement or consume.

use std::collections::HashMap;

use crate::cache::Cache;
use std::hash::Hash;

/// A transport-neutral value, so [`ModelSerializer`] does not depend on any
/// particular wire-format crate. An external collaborator maps this to and
/// from its own document format (JSON, MessagePack, ...).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

/// Converts between a user model type `M` and the transport-neutral
/// dictionary representation used to persist cache entries.
///
/// A persistence controller built on top of this crate owns an
/// implementation of this trait; the core never calls it.
pub trait ModelSerializer<M> {
    type Error: std::error::Error;

    fn model_from_dict(&self, dict: &HashMap<String, Value>) -> Result<M, Self::Error>;
    fn dict_from_model(&self, model: &M) -> Result<HashMap<String, Value>, Self::Error>;
}

/// Marker describing the shape of a persistence controller built atop a
/// [`Cache`]: it owns a cache reference, loads via `add_entries` and saves
/// via `snapshot`, and may subscribe to the change notification channel to
/// decide when a save is warranted.
///
/// This crate implements none of load/save/flush-on-interval -- persistence
/// durability is an explicit non-goal of the core -- but documents the
/// contract so an external controller and the core agree on it. A
/// controller's manual `save`/`clear` operations do not themselves trigger
/// change notifications; notifications are purely timer-driven from
/// inside the core.
pub trait CachePersistence<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// The cache this controller loads into and saves from.
    fn cache(&self) -> &Cache<K, V>;
}
