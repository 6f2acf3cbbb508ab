//! The named-value state container.
//!
//! # Invariants
//!
//! 1. **Fixed keys**: the key set is decided by [`Store::new`]. Setting an
//!    unknown key stores nothing and returns [`SetOutcome::UnknownKey`].
//! 2. **Per-key notification**: each key is backed by its own
//!    [`Observable`], so a change notifies only subscribers of that key.
//! 3. **Shared handles**: cloning a `Store` shares the underlying values.

use std::collections::BTreeMap;

use crate::reactive::{Observable, Subscription};
use crate::value::Value;

/// Result of [`Store::set`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// The value changed and subscribers of the key were notified.
    Changed,
    /// The key already held an equal value.
    Unchanged,
    /// The key is not part of the store.
    UnknownKey,
}

/// Mapping from key to [`Value`], one observable per key.
#[derive(Clone, Debug, Default)]
pub struct Store {
    entries: BTreeMap<String, Observable<Value>>,
}

impl Store {
    /// Create a store with a fixed key set and initial values.
    pub fn new<K, V>(initial: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let entries = initial
            .into_iter()
            .map(|(k, v)| (k.into(), Observable::new(v.into())))
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(Observable::get)
    }

    /// Borrow the value of `key` without cloning it.
    pub fn with_value<R>(&self, key: &str, f: impl FnOnce(&Value) -> R) -> Option<R> {
        self.entries.get(key).map(|obs| obs.with(f))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assign `value` to `key`, notifying that key's subscribers on change.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> SetOutcome {
        let Some(observable) = self.entries.get(key) else {
            tracing::debug!(key, "ignoring assignment to unknown key");
            return SetOutcome::UnknownKey;
        };
        if observable.set(value.into()) {
            tracing::trace!(key, version = observable.version(), "store value changed");
            SetOutcome::Changed
        } else {
            SetOutcome::Unchanged
        }
    }

    /// Subscribe to changes of a single key.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        key: &str,
        callback: impl Fn(&Value) + 'static,
    ) -> Option<Subscription> {
        self.entries.get(key).map(|obs| obs.subscribe(callback))
    }

    /// Live subscribers of `key` (0 for unknown keys).
    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.entries
            .get(key)
            .map_or(0, Observable::subscriber_count)
    }

    /// Number of changes applied to `key`.
    #[must_use]
    pub fn version(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(Observable::version)
    }

    /// Current values in key order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .map(|(k, obs)| (k.clone(), obs.get()))
            .collect()
    }
}
