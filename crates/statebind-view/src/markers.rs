//! Binding markers and discovery.
//!
//! A view node declares its dependency on a state key through marker
//! attributes:
//!
//! | Marker | Example | Refresh |
//! |--------|---------|---------|
//! | `data-bind` | `data-bind="num"` | node text ← value |
//! | `data-bind-attr` | `data-bind-attr="num"` | `data-value` ← value |
//! | `data-bind-attr` | `data-bind-attr="name:value"` | `value` ← value |
//! | `data-template` | `data-template="Hello, {value}!"` | formats the value first |
//!
//! A node may carry both a text and an attribute marker; each yields its own
//! [`Binding`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Empty key | `data-bind=""` | `discover_strict` errors, `discover` skips |
//! | Empty attribute | `data-bind-attr="num:"` | same as above |
//! | Whitespace in key | `data-bind="a b"` | same as above |
//! | Invalid attribute | `data-bind-attr="num:a>b"` | same as above |
//! | Unknown `{token}` in template | `{other}` | token left as-is |

use crate::error::{Result, ViewError};
use crate::node::{NodeId, is_valid_name};
use crate::tree::ViewTree;

/// Declares a text binding.
pub const BIND_TEXT_MARKER: &str = "data-bind";
/// Declares an attribute binding.
pub const BIND_ATTR_MARKER: &str = "data-bind-attr";
/// Optional format template applied to bound values.
pub const TEMPLATE_MARKER: &str = "data-template";
/// Attribute written by attribute bindings that name no attribute.
pub const DEFAULT_VALUE_ATTR: &str = "data-value";

/// What a binding refreshes on its node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindKind {
    /// The node's displayed text.
    Text,
    /// The named attribute.
    Attribute(String),
}

/// Association between a view node and a state key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub node: NodeId,
    pub key: String,
    pub kind: BindKind,
    pub template: Option<String>,
}

impl Binding {
    /// The string this binding writes for `value`.
    #[must_use]
    pub fn render(&self, value: &str) -> String {
        match &self.template {
            Some(template) => interpolate(template, value),
            None => value.to_owned(),
        }
    }
}

/// Discover bindings in document order, skipping malformed markers.
#[must_use]
pub fn discover(tree: &ViewTree) -> Vec<Binding> {
    let mut bindings = Vec::new();
    scan(tree, |result| match result {
        Ok(binding) => bindings.push(binding),
        Err(err) => tracing::warn!(%err, "skipping malformed binding marker"),
    });
    bindings
}

/// Discover bindings in document order, failing on the first malformed marker.
pub fn discover_strict(tree: &ViewTree) -> Result<Vec<Binding>> {
    let mut bindings = Vec::new();
    let mut first_error = None;
    scan(tree, |result| match result {
        Ok(binding) => bindings.push(binding),
        Err(err) => {
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    });
    match first_error {
        Some(err) => Err(err),
        None => Ok(bindings),
    }
}

fn scan(tree: &ViewTree, mut emit: impl FnMut(Result<Binding>)) {
    for (id, node) in tree.iter() {
        let template = node.attribute(TEMPLATE_MARKER).map(str::to_owned);

        if let Some(raw) = node.attribute(BIND_TEXT_MARKER) {
            emit(parse_key(id, BIND_TEXT_MARKER, raw).map(|key| Binding {
                node: id,
                key,
                kind: BindKind::Text,
                template: template.clone(),
            }));
        }

        if let Some(raw) = node.attribute(BIND_ATTR_MARKER) {
            emit(parse_attr_marker(id, raw).map(|(key, attr)| Binding {
                node: id,
                key,
                kind: BindKind::Attribute(attr),
                template: template.clone(),
            }));
        }
    }
}

fn parse_key(node: NodeId, marker: &'static str, raw: &str) -> Result<String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(malformed(node, marker, "empty key"));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(malformed(node, marker, "key contains whitespace"));
    }
    Ok(key.to_owned())
}

fn parse_attr_marker(node: NodeId, raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        None => Ok((
            parse_key(node, BIND_ATTR_MARKER, raw)?,
            DEFAULT_VALUE_ATTR.to_owned(),
        )),
        Some((key, attr)) => {
            let key = parse_key(node, BIND_ATTR_MARKER, key)?;
            let attr = attr.trim();
            if attr.is_empty() {
                return Err(malformed(node, BIND_ATTR_MARKER, "empty attribute name"));
            }
            if !is_valid_name(attr) {
                return Err(malformed(node, BIND_ATTR_MARKER, "invalid attribute name"));
            }
            Ok((key, attr.to_owned()))
        }
    }
}

fn malformed(node: NodeId, marker: &'static str, reason: &str) -> ViewError {
    ViewError::MalformedMarker {
        node,
        marker,
        reason: reason.to_owned(),
    }
}

/// Single-pass `{value}` interpolation. Other tokens are left as-is.
fn interpolate(template: &str, value: &str) -> String {
    let mut result = String::with_capacity(template.len() + value.len());
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            result.push(ch);
            continue;
        }

        let mut token = String::new();
        let mut found_close = false;
        for c in chars.by_ref() {
            if c == '}' {
                found_close = true;
                break;
            }
            token.push(c);
        }

        if found_close && token == "value" {
            result.push_str(value);
        } else {
            result.push('{');
            result.push_str(&token);
            if found_close {
                result.push('}');
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ViewNode;

    #[test]
    fn discovers_text_and_attr_bindings_in_order() {
        let mut tree = ViewTree::new();
        let a = tree.push(ViewNode::new("span").bind_text("num"));
        let b = tree.push(ViewNode::new("div").bind_attr("num"));
        let c = tree.push(ViewNode::new("input").bind_attr_as("name", "value"));

        let bindings = discover_strict(&tree).unwrap();
        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings[0].node, a);
        assert_eq!(bindings[0].kind, BindKind::Text);
        assert_eq!(bindings[1].node, b);
        assert_eq!(
            bindings[1].kind,
            BindKind::Attribute(DEFAULT_VALUE_ATTR.into())
        );
        assert_eq!(bindings[2].node, c);
        assert_eq!(bindings[2].key, "name");
        assert_eq!(bindings[2].kind, BindKind::Attribute("value".into()));
    }

    #[test]
    fn node_with_both_markers_yields_two_bindings() {
        let mut tree = ViewTree::new();
        tree.push(ViewNode::new("span").bind_text("num").bind_attr("num"));
        assert_eq!(discover(&tree).len(), 2);
    }

    #[test]
    fn unbound_nodes_are_ignored() {
        let mut tree = ViewTree::new();
        tree.push(ViewNode::new("button").with_text("+1"));
        assert!(discover(&tree).is_empty());
    }

    #[test]
    fn strict_rejects_empty_key() {
        let mut tree = ViewTree::new();
        let id = tree.push(ViewNode::new("span").with_attr(BIND_TEXT_MARKER, "  "));
        let err = discover_strict(&tree).unwrap_err();
        assert!(matches!(
            err,
            ViewError::MalformedMarker { node, marker: BIND_TEXT_MARKER, .. } if node == id
        ));
    }

    #[test]
    fn strict_rejects_empty_attr_name() {
        let mut tree = ViewTree::new();
        tree.push(ViewNode::new("span").with_attr(BIND_ATTR_MARKER, "num:"));
        assert!(discover_strict(&tree).is_err());
    }

    #[test]
    fn strict_rejects_invalid_attr_name() {
        let mut tree = ViewTree::new();
        tree.push(ViewNode::new("span").bind_attr_as("num", "x\" onclick=\"y"));
        let err = discover_strict(&tree).unwrap_err();
        assert!(err.to_string().contains("invalid attribute name"), "{err}");
        assert!(discover(&tree).is_empty());
    }

    #[test]
    fn lenient_skips_malformed_but_keeps_valid() {
        let mut tree = ViewTree::new();
        tree.push(ViewNode::new("span").with_attr(BIND_TEXT_MARKER, "a b"));
        tree.push(ViewNode::new("span").bind_text("ok"));
        let bindings = discover(&tree);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].key, "ok");
    }

    #[test]
    fn keys_are_trimmed() {
        let mut tree = ViewTree::new();
        tree.push(ViewNode::new("span").with_attr(BIND_TEXT_MARKER, " num "));
        assert_eq!(discover(&tree)[0].key, "num");
    }

    #[test]
    fn template_applies_to_binding() {
        let mut tree = ViewTree::new();
        tree.push(
            ViewNode::new("p")
                .bind_text("name")
                .with_template("Hello, {value}!"),
        );
        let binding = &discover(&tree)[0];
        assert_eq!(binding.render("Bob"), "Hello, Bob!");
    }

    #[test]
    fn interpolate_leaves_unknown_tokens() {
        assert_eq!(interpolate("{other} {value}", "x"), "{other} x");
        assert_eq!(interpolate("open {value", "x"), "open {value");
        assert_eq!(interpolate("{value}{value}", "ab"), "abab");
        assert_eq!(interpolate("plain", "x"), "plain");
    }
}
