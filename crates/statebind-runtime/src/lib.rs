#![forbid(unsafe_code)]

//! Observable store, update strategies, and view binder for statebind.
//!
//! # Role in statebind
//! `statebind-runtime` keeps a [`Store`] of named values in sync with a
//! [`ViewTree`](statebind_view::ViewTree). A [`Page`] owns the store, the
//! [`ViewBinder`] and one [`UpdateStrategy`]:
//!
//! - [`ExplicitStrategy`]: `set_value` stores the value, then refreshes every
//!   binding.
//! - [`InterceptedStrategy`]: per-key subscriptions refresh only the bindings
//!   of the assigned key, whoever assigns it.
//!
//! # Example
//!
//! ```
//! use statebind_runtime::{Page, StrategyKind, Store, Value};
//! use statebind_view::{ViewNode, ViewTree};
//!
//! let store = Store::new([("num", Value::from(0))]);
//! let mut view = ViewTree::new();
//! let span = view.push(ViewNode::new("span").bind_text("num"));
//!
//! let mut page = Page::new(store, view, StrategyKind::Intercepted);
//! page.mount().unwrap();
//! page.set("num", 3).unwrap();
//! assert_eq!(page.binder().text_of(span).as_deref(), Some("3"));
//! ```

pub mod binder;
pub mod config;
pub mod error;
pub mod event;
pub mod page;
pub mod reactive;
pub mod store;
pub mod strategy;
pub mod value;

pub use binder::{BinderState, RefreshStats, ViewBinder};
pub use config::{EventConfig, NodeConfig, PageConfig};
pub use error::{Result, RuntimeError};
pub use event::{Action, ChangeEvent, EventMap, InputKind, UserInput};
pub use page::Page;
pub use reactive::{BatchScope, Observable, Subscription, SubscriptionScope};
pub use store::{SetOutcome, Store};
pub use strategy::{
    ApplyReport, BatchReport, ExplicitStrategy, InterceptedStrategy, ParseStrategyError,
    StrategyKind, UpdateStrategy,
};
pub use value::Value;
