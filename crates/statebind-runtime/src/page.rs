#![forbid(unsafe_code)]

//! Page lifecycle: one owned store, one view, one strategy.
//!
//! ```text
//! Page::new ──mount()──> mounted ──dispatch()/set()/apply_batch()──> mounted
//!                                 └──teardown()──> ViewTree
//! ```
//!
//! The page owns the only [`Store`] its view reads from. Event handling and
//! the binder both receive it from the page; there is no ambient global.
//!
//! Event targets name view nodes by their `id` attribute. Targets with no
//! matching node are reported by [`Page::missing_targets`] and logged at
//! mount; inputs sent to them still resolve normally.

use statebind_view::ViewTree;

/// Attribute that event targets are matched against.
const TARGET_ATTR: &str = "id";

use crate::binder::ViewBinder;
use crate::error::{Result, RuntimeError};
use crate::event::{ChangeEvent, EventMap, UserInput};
use crate::store::Store;
use crate::strategy::{ApplyReport, BatchReport, StrategyKind, UpdateStrategy};
use crate::value::Value;

/// A bound view together with its store, strategy and event handlers.
pub struct Page {
    store: Store,
    binder: ViewBinder,
    strategy: Box<dyn UpdateStrategy>,
    events: EventMap,
    mounted: bool,
}

impl Page {
    /// Build an unmounted page. Malformed binding markers are skipped.
    #[must_use]
    pub fn new(store: Store, view: ViewTree, strategy: StrategyKind) -> Self {
        Self::from_parts(store, ViewBinder::new(view), strategy)
    }

    /// Build an unmounted page, rejecting malformed binding markers.
    pub fn try_new(store: Store, view: ViewTree, strategy: StrategyKind) -> Result<Self> {
        Ok(Self::from_parts(store, ViewBinder::try_new(view)?, strategy))
    }

    fn from_parts(store: Store, binder: ViewBinder, strategy: StrategyKind) -> Self {
        Self {
            store,
            binder,
            strategy: strategy.build(),
            events: EventMap::new(),
            mounted: false,
        }
    }

    /// Build an unmounted page from a config, using its strategy.
    pub fn from_config(config: &crate::config::PageConfig) -> Result<Self> {
        Ok(
            Self::try_new(config.build_store(), config.build_view()?, config.strategy)?
                .with_events(config.build_events()),
        )
    }

    #[must_use]
    pub fn with_events(mut self, events: EventMap) -> Self {
        self.events = events;
        self
    }

    /// Attach the strategy and write initial store values into the view.
    pub fn mount(&mut self) -> Result<()> {
        if self.mounted {
            return Err(RuntimeError::AlreadyMounted);
        }
        for target in self.missing_targets() {
            tracing::warn!(target = %target, "event target has no view node");
        }
        self.strategy.attach(&self.store, &self.binder);
        let evaluated = self.binder.initialize(&self.store);
        self.mounted = true;
        tracing::info!(
            strategy = %self.strategy.kind(),
            keys = self.store.len(),
            bindings = self.binder.bindings().len(),
            evaluated,
            "page mounted"
        );
        Ok(())
    }

    /// Resolve `input` through the event map and apply the resulting change.
    ///
    /// Returns `Ok(None)` when no handler produces a change.
    pub fn dispatch(&mut self, input: &UserInput) -> Result<Option<ApplyReport>> {
        self.ensure_mounted()?;
        let Some(event) = self.events.resolve(&self.store, input) else {
            return Ok(None);
        };
        tracing::debug!(input = %input, change = %event, "dispatching input");
        self.apply(&event).map(Some)
    }

    /// Apply one change through the strategy.
    pub fn apply(&mut self, event: &ChangeEvent) -> Result<ApplyReport> {
        self.ensure_mounted()?;
        let report = self.strategy.apply(&self.store, &self.binder, event);
        tracing::trace!(
            change = %event,
            outcome = ?report.outcome,
            evaluations = report.evaluations,
            "change applied"
        );
        Ok(report)
    }

    /// Shorthand for [`apply`](Self::apply) with a fresh [`ChangeEvent`].
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<ApplyReport> {
        self.apply(&ChangeEvent::new(key, value))
    }

    /// Apply several changes with refreshes coalesced.
    pub fn apply_batch(&mut self, events: &[ChangeEvent]) -> Result<BatchReport> {
        self.ensure_mounted()?;
        let report = self.strategy.apply_batch(&self.store, &self.binder, events);
        tracing::debug!(
            events = events.len(),
            changed = report.changed,
            evaluations = report.evaluations,
            "batch applied"
        );
        Ok(report)
    }

    /// Event targets with no view node whose `id` matches, sorted.
    #[must_use]
    pub fn missing_targets(&self) -> Vec<String> {
        self.binder.with_view(|view| {
            self.events
                .targets()
                .filter(|target| view.find_by_attr(TARGET_ATTR, target).is_none())
                .map(str::to_owned)
                .collect()
        })
    }

    /// Detach the strategy and hand back the final view.
    pub fn teardown(mut self) -> ViewTree {
        self.strategy.detach();
        let listeners: usize = self
            .binder
            .keys()
            .map(|key| self.store.subscriber_count(key))
            .sum();
        tracing::info!(mounted = self.mounted, listeners, "page torn down");
        self.binder.snapshot_view()
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn binder(&self) -> &ViewBinder {
        &self.binder
    }

    #[must_use]
    pub fn events(&self) -> &EventMap {
        &self.events
    }

    #[must_use]
    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether every binding shows its key's current store value.
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.binder.is_in_sync(&self.store)
    }

    #[must_use]
    pub fn render_html(&self) -> String {
        self.binder.render_html()
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(RuntimeError::NotMounted)
        }
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("strategy", &self.strategy.kind())
            .field("mounted", &self.mounted)
            .field("values", &self.store.snapshot())
            .field("binder", &self.binder)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Action, InputKind};
    use statebind_view::{NodeId, ViewNode};

    fn counter(kind: StrategyKind) -> (Page, NodeId) {
        let store = Store::new([("num", Value::from(0))]);
        let mut view = ViewTree::new();
        let span = view.push(ViewNode::new("span").bind_text("num"));
        view.push(ViewNode::new("button").with_attr("id", "inc"));
        let events = EventMap::new().on(
            "inc",
            InputKind::Press,
            Action::Increment {
                key: "num".into(),
                step: 1.0,
            },
        );
        (Page::new(store, view, kind).with_events(events), span)
    }

    #[test]
    fn three_increments_read_three() {
        for kind in [StrategyKind::Explicit, StrategyKind::Intercepted] {
            let (mut page, span) = counter(kind);
            page.mount().unwrap();
            for _ in 0..3 {
                page.dispatch(&UserInput::press("inc")).unwrap();
            }
            assert_eq!(page.binder().text_of(span).as_deref(), Some("3"), "{kind}");
        }
    }

    #[test]
    fn operations_require_mount() {
        let (mut page, _) = counter(StrategyKind::Explicit);
        assert!(matches!(
            page.dispatch(&UserInput::press("inc")),
            Err(RuntimeError::NotMounted)
        ));
        assert!(matches!(page.set("num", 1), Err(RuntimeError::NotMounted)));
        page.mount().unwrap();
        assert!(page.is_mounted());
        assert!(matches!(page.mount(), Err(RuntimeError::AlreadyMounted)));
    }

    #[test]
    fn mount_reflects_initial_values() {
        let (mut page, span) = counter(StrategyKind::Intercepted);
        assert_eq!(page.binder().text_of(span).as_deref(), Some(""));
        page.mount().unwrap();
        assert_eq!(page.binder().text_of(span).as_deref(), Some("0"));
        assert!(page.is_in_sync());
    }

    #[test]
    fn unhandled_input_is_none() {
        let (mut page, _) = counter(StrategyKind::Explicit);
        page.mount().unwrap();
        assert_eq!(page.dispatch(&UserInput::release("inc")).unwrap(), None);
    }

    #[test]
    fn teardown_disconnects_store() {
        let (mut page, span) = counter(StrategyKind::Intercepted);
        page.mount().unwrap();
        page.set("num", 5).unwrap();
        let store = page.store().clone();
        let binder = page.binder().clone();
        let view = page.teardown();
        assert_eq!(view.node(span).map(|n| n.text()), Some("5"));

        store.set("num", 9);
        assert_eq!(binder.text_of(span).as_deref(), Some("5"));
        assert_eq!(store.subscriber_count("num"), 0);
    }

    #[test]
    fn intercepted_mount_subscribes_each_bound_key_once() {
        let (mut page, _) = counter(StrategyKind::Intercepted);
        assert_eq!(page.store().subscriber_count("num"), 0);
        page.mount().unwrap();
        assert_eq!(page.store().subscriber_count("num"), 1);
    }

    #[test]
    fn missing_targets_lists_unmatched_handlers() {
        let (page, _) = counter(StrategyKind::Explicit);
        assert!(page.missing_targets().is_empty());

        let events = page.events().clone().on(
            "ghost",
            InputKind::Press,
            Action::Set {
                key: "num".into(),
                value: Value::from(1),
            },
        );
        let mut page = page.with_events(events);
        assert_eq!(page.missing_targets(), vec!["ghost".to_owned()]);
        page.mount().unwrap();
        assert!(page.dispatch(&UserInput::press("ghost")).unwrap().is_some());
    }

    #[test]
    fn try_new_rejects_malformed_markers() {
        let mut view = ViewTree::new();
        view.push(ViewNode::new("span").with_attr("data-bind-attr", ":class"));
        let result = Page::try_new(Store::default(), view, StrategyKind::Explicit);
        assert!(matches!(result, Err(RuntimeError::View(_))));
    }

    #[test]
    fn from_config_counter_page() {
        let mut page = Page::from_config(&crate::config::PageConfig::counter()).unwrap();
        page.mount().unwrap();
        page.dispatch(&UserInput::text("name", "Bob")).unwrap();
        let html = page.render_html();
        assert!(html.contains("Hello, Bob!"), "{html}");
        assert!(html.contains("value=\"Bob\""), "{html}");
        assert!(html.contains("Count: 0"), "{html}");
    }
}
