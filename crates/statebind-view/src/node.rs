//! View nodes and their identifiers.

use core::fmt;

use crate::error::{Result, ViewError};
use crate::markers::{BIND_ATTR_MARKER, BIND_TEXT_MARKER, TEMPLATE_MARKER};

/// Whether `name` is usable as a tag or attribute name: an ASCII letter
/// followed by ASCII alphanumerics, `-`, `_`, `:` or `.`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

pub(crate) fn check_name(kind: &'static str, name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ViewError::InvalidName {
            kind,
            name: name.to_owned(),
        })
    }
}

/// Index of a node inside a [`ViewTree`](crate::ViewTree).
///
/// Ids are assigned in insertion order and never reused. `NodeId::ROOT` is
/// the synthetic container every tree starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The synthetic root node.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Position of the node in the tree's arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single element of the view: a tag, its displayed text, ordered
/// attributes and child links.
///
/// Nodes are built with the `with_*`/`bind_*` methods and then handed to
/// [`ViewTree::append`](crate::ViewTree::append). After that, only the tree
/// mutates them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewNode {
    tag: String,
    text: String,
    attributes: Vec<(String, String)>,
    pub(crate) children: Vec<NodeId>,
}

impl ViewNode {
    /// Create an empty node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the displayed text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute, replacing any previous value with the same name.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.put_attribute(name.into(), value.into());
        self
    }

    /// Declare a text binding to `key`.
    #[must_use]
    pub fn bind_text(self, key: &str) -> Self {
        self.with_attr(BIND_TEXT_MARKER, key)
    }

    /// Declare an attribute binding to `key` writing the default value
    /// attribute.
    #[must_use]
    pub fn bind_attr(self, key: &str) -> Self {
        self.with_attr(BIND_ATTR_MARKER, key)
    }

    /// Declare an attribute binding to `key` writing `attr`.
    #[must_use]
    pub fn bind_attr_as(self, key: &str, attr: &str) -> Self {
        self.with_attr(BIND_ATTR_MARKER, format!("{key}:{attr}"))
    }

    /// Format bound values through `template`, replacing `{value}`.
    #[must_use]
    pub fn with_template(self, template: impl Into<String>) -> Self {
        self.with_attr(TEMPLATE_MARKER, template)
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Reject a tag or attribute name that would not serialize as markup.
    pub(crate) fn check_names(&self) -> Result<()> {
        check_name("tag", &self.tag)?;
        for (name, _) in &self.attributes {
            check_name("attribute", name)?;
        }
        Ok(())
    }

    /// Returns true when the text changed.
    pub(crate) fn replace_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        true
    }

    /// Returns true when the attribute was added or changed.
    pub(crate) fn put_attribute(&mut self, name: String, value: String) -> bool {
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) if *existing == value => false,
            Some((_, existing)) => {
                *existing = value;
                true
            }
            None => {
                self.attributes.push((name, value));
                true
            }
        }
    }
}
