//! User input and change events.
//!
//! Each discrete interaction ([`UserInput`]) resolves through an
//! [`EventMap`] to at most one [`ChangeEvent`]. Inputs without a registered
//! [`Action`] resolve to `None`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::Store;
use crate::value::Value;

/// A single `(key, new value)` update.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent {
    pub key: String,
    pub value: Value,
}

impl ChangeEvent {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// Kind of interaction, used as half of an [`EventMap`] key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Press,
    Release,
    #[serde(alias = "text")]
    TextChange,
}

/// A discrete interaction with a control identified by `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserInput {
    Press { target: String },
    Release { target: String },
    TextChange { target: String, text: String },
}

impl UserInput {
    #[must_use]
    pub fn press(target: impl Into<String>) -> Self {
        Self::Press {
            target: target.into(),
        }
    }

    #[must_use]
    pub fn release(target: impl Into<String>) -> Self {
        Self::Release {
            target: target.into(),
        }
    }

    #[must_use]
    pub fn text(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::TextChange {
            target: target.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Press { .. } => InputKind::Press,
            Self::Release { .. } => InputKind::Release,
            Self::TextChange { .. } => InputKind::TextChange,
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Press { target } | Self::Release { target } | Self::TextChange { target, .. } => {
                target
            }
        }
    }
}

impl fmt::Display for UserInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Press { target } => write!(f, "press:{target}"),
            Self::Release { target } => write!(f, "release:{target}"),
            Self::TextChange { target, text } => write!(f, "text:{target}={text}"),
        }
    }
}

fn default_step() -> f64 {
    1.0
}

/// What an interaction does to the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Add `step` to a numeric key.
    Increment {
        key: String,
        #[serde(default = "default_step")]
        step: f64,
    },
    /// Assign a fixed value.
    Set { key: String, value: Value },
    /// Flip between `on` and `off`: a key holding `off` becomes `on`,
    /// anything else becomes `off`. Numeric keys default to `1`/`0`; text
    /// keys need both values.
    Toggle {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        off: Option<Value>,
    },
    /// Assign the text of a `TextChange`, keeping numeric keys numeric when
    /// the text parses.
    Input { key: String },
}

impl Action {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Increment { key, .. }
            | Self::Set { key, .. }
            | Self::Toggle { key, .. }
            | Self::Input { key } => key,
        }
    }

    /// The change this action produces for `input`, given the current store.
    #[must_use]
    pub fn resolve(&self, store: &Store, input: &UserInput) -> Option<ChangeEvent> {
        match self {
            Self::Increment { key, step } => {
                let Some(n) = store.with_value(key, Value::as_number)? else {
                    tracing::debug!(key = %key, "increment ignored: value is not a number");
                    return None;
                };
                Some(ChangeEvent::new(key.clone(), n + step))
            }
            Self::Set { key, value } => Some(ChangeEvent::new(key.clone(), value.clone())),
            Self::Toggle { key, on, off } => {
                let next = store.with_value(key, |current| {
                    toggled(current, on.as_ref(), off.as_ref())
                })?;
                if next.is_none() {
                    tracing::debug!(key = %key, "toggle ignored: text key without on/off values");
                }
                next.map(|value| ChangeEvent::new(key.clone(), value))
            }
            Self::Input { key } => {
                let UserInput::TextChange { text, .. } = input else {
                    tracing::debug!(key = %key, input = %input, "input action needs a text change");
                    return None;
                };
                let value = match store.get(key) {
                    Some(current) => current.coerce_like(text),
                    None => Value::from(text.as_str()),
                };
                Some(ChangeEvent::new(key.clone(), value))
            }
        }
    }
}

fn toggled(current: &Value, on: Option<&Value>, off: Option<&Value>) -> Option<Value> {
    let (on, off) = match (current, on, off) {
        (_, Some(on), Some(off)) => (on.clone(), off.clone()),
        (Value::Number(_), on, off) => (
            on.cloned().unwrap_or(Value::Number(1.0)),
            off.cloned().unwrap_or(Value::Number(0.0)),
        ),
        (Value::Text(_), _, _) => return None,
    };
    Some(if *current == off { on } else { off })
}

/// Handlers keyed by `(target, kind)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventMap {
    handlers: BTreeMap<(String, InputKind), Action>,
}

impl EventMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for `kind` interactions on `target`, replacing any
    /// previous handler.
    #[must_use]
    pub fn on(mut self, target: impl Into<String>, kind: InputKind, action: Action) -> Self {
        self.insert(target, kind, action);
        self
    }

    pub fn insert(&mut self, target: impl Into<String>, kind: InputKind, action: Action) {
        self.handlers.insert((target.into(), kind), action);
    }

    #[must_use]
    pub fn handler(&self, target: &str, kind: InputKind) -> Option<&Action> {
        self.handlers.get(&(target.to_owned(), kind))
    }

    /// Resolve `input` into at most one change.
    #[must_use]
    pub fn resolve(&self, store: &Store, input: &UserInput) -> Option<ChangeEvent> {
        let Some(action) = self.handler(input.target(), input.kind()) else {
            tracing::trace!(input = %input, "no handler for input");
            return None;
        };
        action.resolve(store, input)
    }

    /// Distinct handler targets, sorted.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        let mut last: Option<&str> = None;
        self.handlers.keys().filter_map(move |(target, _)| {
            let target = target.as_str();
            if last == Some(target) {
                return None;
            }
            last = Some(target);
            Some(target)
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
