#![forbid(unsafe_code)]

//! Page configuration loaded from TOML or JSON.
//!
//! ```toml
//! strategy = "intercepted"
//!
//! [initial]
//! num = 0
//!
//! [[nodes]]
//! tag = "span"
//! attributes = { data-bind = "num" }
//!
//! [[nodes]]
//! tag = "button"
//! text = "+1"
//! attributes = { id = "inc" }
//!
//! [[events]]
//! target = "inc"
//! on = "press"
//! action = { kind = "increment", key = "num" }
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Parse error | Bad syntax, unknown field | `RuntimeError::Toml`/`Json` |
//! | Unknown extension | Not `.toml`/`.json` | `RuntimeError::UnsupportedFormat` |
//! | Malformed marker | e.g. `data-bind = ""` | `RuntimeError::View` at page build |
//! | Invalid tag/attribute name | e.g. `"a b" = "x"` | `RuntimeError::View` at view build |

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use statebind_view::{NodeId, ViewNode, ViewTree};

use crate::error::{Result, RuntimeError};
use crate::event::{Action, EventMap, InputKind};
use crate::store::Store;
use crate::strategy::StrategyKind;
use crate::value::Value;

/// Declarative description of a page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub initial: BTreeMap<String, Value>,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

/// One view node and its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub tag: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<NodeConfig>,
}

/// One handler: `action` runs when `target` receives an `on` interaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventConfig {
    pub target: String,
    #[serde(default = "default_input_kind")]
    pub on: InputKind,
    pub action: Action,
}

fn default_input_kind() -> InputKind {
    InputKind::Press
}

impl NodeConfig {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: NodeConfig) -> Self {
        self.children.push(child);
        self
    }

    fn to_view_node(&self) -> ViewNode {
        self.attributes
            .iter()
            .fold(ViewNode::new(&self.tag).with_text(&self.text), |node, (n, v)| {
                node.with_attr(n, v)
            })
    }
}

impl PageConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Self::from_toml_str(&std::fs::read_to_string(path)?),
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?),
            _ => Err(RuntimeError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Build the store from `initial`.
    #[must_use]
    pub fn build_store(&self) -> Store {
        Store::new(self.initial.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Build the view tree from `nodes`, in declaration order.
    ///
    /// Fails on the first tag or attribute name that is not a valid markup
    /// name.
    pub fn build_view(&self) -> statebind_view::Result<ViewTree> {
        let mut tree = ViewTree::new();
        for node in &self.nodes {
            append_node(&mut tree, NodeId::ROOT, node)?;
        }
        Ok(tree)
    }

    /// Build the event map from `events`. Later entries replace earlier ones
    /// for the same `(target, on)` pair.
    #[must_use]
    pub fn build_events(&self) -> EventMap {
        let mut map = EventMap::new();
        for event in &self.events {
            map.insert(event.target.clone(), event.on, event.action.clone());
        }
        map
    }

    /// The built-in counter page: a counter with increment, decrement and
    /// reset buttons, a value swatch colored by attribute, and a text input
    /// mirrored into a greeting.
    #[must_use]
    pub fn counter() -> Self {
        let nodes = vec![
            NodeConfig::new("div")
                .attr("class", "counter")
                .child(
                    NodeConfig::new("h3")
                        .attr("data-bind", "num")
                        .attr("data-template", "Count: {value}"),
                )
                .child(
                    NodeConfig::new("span")
                        .attr("class", "swatch")
                        .attr("data-bind-attr", "num"),
                )
                .child(NodeConfig::new("button").attr("id", "inc").text("+1"))
                .child(NodeConfig::new("button").attr("id", "dec").text("-1"))
                .child(NodeConfig::new("button").attr("id", "reset").text("Reset")),
            NodeConfig::new("div")
                .attr("class", "greeting")
                .child(
                    NodeConfig::new("input")
                        .attr("id", "name")
                        .attr("data-bind-attr", "name:value"),
                )
                .child(
                    NodeConfig::new("p")
                        .attr("data-bind", "name")
                        .attr("data-template", "Hello, {value}!"),
                ),
        ];

        let events = vec![
            EventConfig {
                target: "inc".into(),
                on: InputKind::Press,
                action: Action::Increment {
                    key: "num".into(),
                    step: 1.0,
                },
            },
            EventConfig {
                target: "dec".into(),
                on: InputKind::Press,
                action: Action::Increment {
                    key: "num".into(),
                    step: -1.0,
                },
            },
            EventConfig {
                target: "reset".into(),
                on: InputKind::Press,
                action: Action::Set {
                    key: "num".into(),
                    value: Value::from(0),
                },
            },
            EventConfig {
                target: "name".into(),
                on: InputKind::TextChange,
                action: Action::Input { key: "name".into() },
            },
        ];

        Self {
            strategy: StrategyKind::default(),
            initial: BTreeMap::from([
                ("name".to_owned(), Value::from("world")),
                ("num".to_owned(), Value::from(0)),
            ]),
            nodes,
            events,
        }
    }
}

fn append_node(
    tree: &mut ViewTree,
    parent: NodeId,
    config: &NodeConfig,
) -> statebind_view::Result<()> {
    let id = tree.append(parent, config.to_view_node())?;
    for child in &config.children {
        append_node(tree, id, child)?;
    }
    Ok(())
}
