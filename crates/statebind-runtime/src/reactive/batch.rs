#![forbid(unsafe_code)]

//! Deferred notification scopes.
//!
//! While a [`BatchScope`] is alive on the current thread, [`Observable`]
//! mutations update values and versions immediately but queue their
//! notification. When the outermost scope drops, each queued observable
//! notifies once, in first-change order, with its value at flush time.
//!
//! [`Observable`]: super::Observable

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

type Deferred = Box<dyn FnOnce()>;

#[derive(Default)]
struct BatchState {
    depth: u32,
    pending: Vec<(usize, Deferred)>,
}

thread_local! {
    static BATCH: RefCell<BatchState> = RefCell::new(BatchState::default());
}

/// RAII guard that defers observable notifications until it drops.
///
/// Scopes nest; only the outermost one flushes.
#[must_use = "notifications flush as soon as the scope is dropped"]
pub struct BatchScope {
    _not_send: PhantomData<Rc<()>>,
}

impl BatchScope {
    /// Open a batch on the current thread.
    pub fn new() -> Self {
        BATCH.with(|b| b.borrow_mut().depth += 1);
        Self {
            _not_send: PhantomData,
        }
    }

    /// Number of observables waiting to notify.
    #[must_use]
    pub fn pending_count() -> usize {
        BATCH.with(|b| b.borrow().pending.len())
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let flushed = BATCH.with(|b| {
            let mut state = b.borrow_mut();
            state.depth = state.depth.saturating_sub(1);
            if state.depth == 0 {
                std::mem::take(&mut state.pending)
            } else {
                Vec::new()
            }
        });
        if !flushed.is_empty() {
            tracing::trace!(count = flushed.len(), "flushing batched notifications");
        }
        for (_, notify) in flushed {
            notify();
        }
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope")
            .field("pending", &Self::pending_count())
            .finish()
    }
}

pub(crate) fn is_batching() -> bool {
    BATCH.with(|b| b.borrow().depth > 0)
}

/// Queue `notify` under `id` unless that id is already queued.
pub(crate) fn defer(id: usize, notify: impl FnOnce() + 'static) {
    BATCH.with(|b| {
        let mut state = b.borrow_mut();
        if state.pending.iter().any(|(pending, _)| *pending == id) {
            return;
        }
        state.pending.push((id, Box::new(notify)));
    });
}
