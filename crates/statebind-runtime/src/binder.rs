#![forbid(unsafe_code)]

//! View binder: writes store values into bound view nodes.
//!
//! # State machine
//!
//! ```text
//! Uninitialized --initialize()--> Bound
//! ```
//!
//! There is no terminal state; a binder stays `Bound` for the life of its
//! page. Refreshes requested while `Uninitialized` are ignored.
//!
//! # Invariants
//!
//! 1. Bindings are discovered once, at construction, and never change.
//! 2. `refresh(key, ..)` evaluates exactly the bindings declared for `key`.
//! 3. `refresh_all` evaluates every binding exactly once.
//! 4. A key with no bindings is a no-op refresh (zero evaluations).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unbound key | No node declares the key | No-op, traced |
//! | Bound key missing from store | Marker names an unknown key | Node left as authored |
//! | Refresh before `initialize` | Caller ordering | Ignored, logged at debug |

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use statebind_view::{BindKind, Binding, NodeId, ViewTree, discover, discover_strict};

use crate::store::Store;
use crate::value::Value;

/// Lifecycle state of a [`ViewBinder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinderState {
    Uninitialized,
    Bound,
}

/// Refresh cost counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Calls to `refresh`/`refresh_all` that ran while bound.
    pub refresh_calls: u64,
    /// Bindings evaluated across all refreshes.
    pub evaluations: u64,
    /// Evaluations that actually changed a node.
    pub node_writes: u64,
}

struct BinderInner {
    view: RefCell<ViewTree>,
    bindings: Vec<Binding>,
    by_key: BTreeMap<String, Vec<usize>>,
    state: Cell<BinderState>,
    stats: Cell<RefreshStats>,
    evaluations_by_key: RefCell<BTreeMap<String, u64>>,
}

/// Owns the view tree and the bindings discovered in it.
///
/// Cloning a `ViewBinder` creates a new handle to the **same** view, which is
/// how subscription callbacks reach it.
#[derive(Clone)]
pub struct ViewBinder {
    inner: Rc<BinderInner>,
}

impl ViewBinder {
    /// Discover bindings in `view`, skipping malformed markers.
    #[must_use]
    pub fn new(view: ViewTree) -> Self {
        let bindings = discover(&view);
        Self::with_bindings(view, bindings)
    }

    /// Discover bindings in `view`, failing on malformed markers.
    pub fn try_new(view: ViewTree) -> statebind_view::Result<Self> {
        let bindings = discover_strict(&view)?;
        Ok(Self::with_bindings(view, bindings))
    }

    fn with_bindings(view: ViewTree, bindings: Vec<Binding>) -> Self {
        let mut by_key: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, binding) in bindings.iter().enumerate() {
            by_key.entry(binding.key.clone()).or_default().push(idx);
        }
        tracing::debug!(
            bindings = bindings.len(),
            keys = by_key.len(),
            "discovered view bindings"
        );
        Self {
            inner: Rc::new(BinderInner {
                view: RefCell::new(view),
                bindings,
                by_key,
                state: Cell::new(BinderState::Uninitialized),
                stats: Cell::new(RefreshStats::default()),
                evaluations_by_key: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> BinderState {
        self.inner.state.get()
    }

    /// All bindings in document order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.inner.bindings
    }

    /// Bindings declared for `key`.
    pub fn bindings_for<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Binding> + use<'a> {
        let indices = self.inner.by_key.get(key).map_or(&[][..], Vec::as_slice);
        indices.iter().map(|&idx| &self.inner.bindings[idx])
    }

    /// Keys referenced by at least one binding, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.by_key.keys().map(String::as_str)
    }

    /// Write every bound key's store value into the view and enter `Bound`.
    ///
    /// Calling it again re-applies the current store values.
    pub fn initialize(&self, store: &Store) -> usize {
        self.inner.state.set(BinderState::Bound);
        let mut evaluated = 0;
        for key in self.inner.by_key.keys() {
            match store.get(key) {
                Some(value) => evaluated += self.apply(key, &value),
                None => tracing::debug!(key = %key, "bound key missing from store"),
            }
        }
        self.record_call();
        tracing::debug!(evaluated, "view binder initialized");
        evaluated
    }

    /// Refresh the bindings for `key` with `value`. Returns how many
    /// bindings were evaluated.
    pub fn refresh(&self, key: &str, value: &Value) -> usize {
        if self.state() == BinderState::Uninitialized {
            tracing::debug!(key, "refresh ignored: binder not initialized");
            return 0;
        }
        let _span = tracing::debug_span!("refresh", key).entered();
        let evaluated = self.apply(key, value);
        self.record_call();
        evaluated
    }

    /// Re-evaluate every binding from `store`.
    pub fn refresh_all(&self, store: &Store) -> usize {
        if self.state() == BinderState::Uninitialized {
            tracing::debug!("refresh_all ignored: binder not initialized");
            return 0;
        }
        let _span = tracing::debug_span!("refresh_all").entered();
        let mut evaluated = 0;
        for key in self.inner.by_key.keys() {
            if let Some(value) = store.get(key) {
                evaluated += self.apply(key, &value);
            }
        }
        self.record_call();
        evaluated
    }

    /// Whether every binding currently shows its key's store value.
    #[must_use]
    pub fn is_in_sync(&self, store: &Store) -> bool {
        let view = self.inner.view.borrow();
        self.inner.bindings.iter().all(|binding| {
            let Some(expected) =
                store.with_value(&binding.key, |value| binding.render(&value.to_string()))
            else {
                return true;
            };
            let Some(node) = view.node(binding.node) else {
                return false;
            };
            match &binding.kind {
                BindKind::Text => node.text() == expected,
                BindKind::Attribute(attr) => node.attribute(attr) == Some(expected.as_str()),
            }
        })
    }

    #[must_use]
    pub fn stats(&self) -> RefreshStats {
        self.inner.stats.get()
    }

    /// Evaluations performed for `key` since the last reset.
    #[must_use]
    pub fn evaluations_for(&self, key: &str) -> u64 {
        self.inner
            .evaluations_by_key
            .borrow()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn reset_stats(&self) {
        self.inner.stats.set(RefreshStats::default());
        self.inner.evaluations_by_key.borrow_mut().clear();
    }

    /// Read access to the view.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates the store while the intercepted strategy is
    /// attached (the refresh would re-borrow the view).
    pub fn with_view<R>(&self, f: impl FnOnce(&ViewTree) -> R) -> R {
        f(&self.inner.view.borrow())
    }

    /// Displayed text of `node`.
    #[must_use]
    pub fn text_of(&self, node: NodeId) -> Option<String> {
        self.with_view(|view| view.node(node).map(|n| n.text().to_owned()))
    }

    /// Value of attribute `name` on `node`.
    #[must_use]
    pub fn attribute_of(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_view(|view| {
            view.node(node)
                .and_then(|n| n.attribute(name))
                .map(str::to_owned)
        })
    }

    #[must_use]
    pub fn render_html(&self) -> String {
        self.with_view(statebind_view::render_html)
    }

    /// Copy of the current view.
    #[must_use]
    pub fn snapshot_view(&self) -> ViewTree {
        self.with_view(Clone::clone)
    }

    fn apply(&self, key: &str, value: &Value) -> usize {
        let Some(indices) = self.inner.by_key.get(key) else {
            tracing::trace!(key, "no bindings for key");
            return 0;
        };

        let text = value.to_string();
        let mut writes = 0u64;
        {
            let mut view = self.inner.view.borrow_mut();
            for &idx in indices {
                let binding = &self.inner.bindings[idx];
                let rendered = binding.render(&text);
                let result = match &binding.kind {
                    BindKind::Text => view.set_text(binding.node, &rendered),
                    BindKind::Attribute(attr) => {
                        view.set_attribute(binding.node, attr, &rendered)
                    }
                };
                match result {
                    Ok(true) => writes += 1,
                    Ok(false) => {}
                    Err(err) => tracing::warn!(%err, key, "binding refresh failed"),
                }
            }
        }

        let evaluated = indices.len() as u64;
        let mut stats = self.inner.stats.get();
        stats.evaluations += evaluated;
        stats.node_writes += writes;
        self.inner.stats.set(stats);
        *self
            .inner
            .evaluations_by_key
            .borrow_mut()
            .entry(key.to_owned())
            .or_default() += evaluated;

        indices.len()
    }

    fn record_call(&self) {
        let mut stats = self.inner.stats.get();
        stats.refresh_calls += 1;
        self.inner.stats.set(stats);
    }
}

impl std::fmt::Debug for ViewBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewBinder")
            .field("state", &self.state())
            .field("bindings", &self.inner.bindings.len())
            .field("stats", &self.stats())
            .finish()
    }
}
