#![forbid(unsafe_code)]

//! Update strategies: how a change reaches the view.
//!
//! | Strategy | Trigger | Refresh cost per change |
//! |----------|---------|-------------------------|
//! | [`ExplicitStrategy`] | a visible `set_value` call | every binding |
//! | [`InterceptedStrategy`] | any `Store::set` on a bound key | bindings of that key |
//!
//! The explicit strategy leaves the store unobserved: mutating the store
//! without going through `set_value` desynchronizes the view until the next
//! explicit call. The intercepted strategy subscribes one callback per bound
//! key at attach time, so every assignment refreshes its bindings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::binder::ViewBinder;
use crate::event::ChangeEvent;
use crate::reactive::{BatchScope, SubscriptionScope};
use crate::store::{SetOutcome, Store};
use crate::value::Value;

/// Selects an [`UpdateStrategy`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Explicit,
    Intercepted,
}

impl StrategyKind {
    /// A fresh, detached strategy of this kind.
    #[must_use]
    pub fn build(self) -> Box<dyn UpdateStrategy> {
        match self {
            Self::Explicit => Box::new(ExplicitStrategy),
            Self::Intercepted => Box::new(InterceptedStrategy::new()),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Intercepted => "intercepted",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown update strategy '{0}' (expected 'explicit' or 'intercepted')")]
pub struct ParseStrategyError(String);

impl FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(Self::Explicit),
            "intercepted" => Ok(Self::Intercepted),
            other => Err(ParseStrategyError(other.to_owned())),
        }
    }
}

/// Outcome of applying one change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplyReport {
    pub outcome: SetOutcome,
    /// Bindings evaluated as a consequence of this change.
    pub evaluations: u64,
}

/// Outcome of applying several changes together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub changed: usize,
    pub unchanged: usize,
    pub unknown: usize,
    pub evaluations: u64,
}

impl BatchReport {
    fn record(&mut self, outcome: SetOutcome) {
        match outcome {
            SetOutcome::Changed => self.changed += 1,
            SetOutcome::Unchanged => self.unchanged += 1,
            SetOutcome::UnknownKey => self.unknown += 1,
        }
    }
}

/// How changes are detected and propagated to the view.
pub trait UpdateStrategy {
    fn kind(&self) -> StrategyKind;

    /// Wire the strategy to a store and binder. Called once at mount.
    fn attach(&mut self, store: &Store, binder: &ViewBinder);

    /// Disconnect from the store. Called at teardown.
    fn detach(&mut self);

    /// Apply one change.
    fn apply(&mut self, store: &Store, binder: &ViewBinder, event: &ChangeEvent) -> ApplyReport;

    /// Apply several changes, refreshing each affected binding once.
    fn apply_batch(
        &mut self,
        store: &Store,
        binder: &ViewBinder,
        events: &[ChangeEvent],
    ) -> BatchReport;
}

fn evaluations_since(binder: &ViewBinder, before: u64) -> u64 {
    binder.stats().evaluations.saturating_sub(before)
}

/// Store-then-refresh-everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExplicitStrategy;

impl ExplicitStrategy {
    /// Overwrite `key` and refresh every binding in the view.
    ///
    /// Unknown keys store nothing but still trigger the full refresh.
    pub fn set_value(
        &self,
        store: &Store,
        binder: &ViewBinder,
        key: &str,
        value: impl Into<Value>,
    ) -> ApplyReport {
        let before = binder.stats().evaluations;
        let outcome = store.set(key, value);
        binder.refresh_all(store);
        ApplyReport {
            outcome,
            evaluations: evaluations_since(binder, before),
        }
    }
}

impl UpdateStrategy for ExplicitStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Explicit
    }

    fn attach(&mut self, _store: &Store, _binder: &ViewBinder) {}

    fn detach(&mut self) {}

    fn apply(&mut self, store: &Store, binder: &ViewBinder, event: &ChangeEvent) -> ApplyReport {
        self.set_value(store, binder, &event.key, event.value.clone())
    }

    fn apply_batch(
        &mut self,
        store: &Store,
        binder: &ViewBinder,
        events: &[ChangeEvent],
    ) -> BatchReport {
        let before = binder.stats().evaluations;
        let mut report = BatchReport::default();
        for event in events {
            report.record(store.set(&event.key, event.value.clone()));
        }
        binder.refresh_all(store);
        report.evaluations = evaluations_since(binder, before);
        report
    }
}

/// Per-key subscriptions; assignment is the trigger.
#[derive(Debug, Default)]
pub struct InterceptedStrategy {
    scope: SubscriptionScope,
}

impl InterceptedStrategy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UpdateStrategy for InterceptedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Intercepted
    }

    fn attach(&mut self, store: &Store, binder: &ViewBinder) {
        self.scope.clear();
        for key in binder.keys() {
            let target = binder.clone();
            let key_owned = key.to_owned();
            let subscription = store.subscribe(key, move |value| {
                target.refresh(&key_owned, value);
            });
            match subscription {
                Some(subscription) => self.scope.hold(subscription),
                None => tracing::debug!(key, "bound key has no store entry; not subscribing"),
            }
        }
        tracing::debug!(subscriptions = self.scope.len(), "intercepted strategy attached");
    }

    fn detach(&mut self) {
        self.scope.clear();
    }

    fn apply(&mut self, store: &Store, binder: &ViewBinder, event: &ChangeEvent) -> ApplyReport {
        let before = binder.stats().evaluations;
        let outcome = store.set(&event.key, event.value.clone());
        ApplyReport {
            outcome,
            evaluations: evaluations_since(binder, before),
        }
    }

    fn apply_batch(
        &mut self,
        store: &Store,
        binder: &ViewBinder,
        events: &[ChangeEvent],
    ) -> BatchReport {
        let before = binder.stats().evaluations;
        let mut report = BatchReport::default();
        {
            let _batch = BatchScope::new();
            for event in events {
                report.record(store.set(&event.key, event.value.clone()));
            }
        }
        report.evaluations = evaluations_since(binder, before);
        report
    }
}
