#![forbid(unsafe_code)]

//! statebind public facade.
//!
//! Re-exports the view layer ([`view`]) and the runtime ([`runtime`]), plus a
//! [`prelude`] with the types most pages need.
//!
//! ```
//! use statebind::prelude::*;
//!
//! let mut page = Page::from_config(&PageConfig::counter()).unwrap();
//! page.mount().unwrap();
//! page.dispatch(&UserInput::press("inc")).unwrap();
//! assert_eq!(page.store().get("num"), Some(Value::from(1)));
//! ```

pub use statebind_runtime as runtime;
pub use statebind_view as view;

pub use statebind_runtime::{Result, RuntimeError};
pub use statebind_view::ViewError;

pub mod prelude {
    pub use statebind_runtime::{
        Action, ApplyReport, BatchReport, ChangeEvent, EventMap, InputKind, Page, PageConfig,
        SetOutcome, Store, StrategyKind, UpdateStrategy, UserInput, Value, ViewBinder,
    };
    pub use statebind_view::{NodeId, ViewNode, ViewTree};
}
