//! Arena-backed view tree.
//!
//! # Invariants
//!
//! 1. Node 0 is the synthetic root; it is never rendered and never bound.
//! 2. Every non-root node is the child of exactly one node appended before it.
//! 3. [`ViewTree::iter`] yields nodes in document (pre-order) order, which is
//!    also the order bindings are discovered in.
//! 4. Nodes added with [`ViewTree::append`] and attributes written with
//!    [`ViewTree::set_attribute`] carry only valid tag and attribute names
//!    (see [`is_valid_name`](crate::is_valid_name)).

use crate::error::{Result, ViewError};
use crate::node::{NodeId, ViewNode, check_name};

/// A tree of [`ViewNode`]s addressed by [`NodeId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewTree {
    nodes: Vec<ViewNode>,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    /// Create a tree holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![ViewNode::new("root")],
        }
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// Fails on an unknown parent or an invalid tag or attribute name.
    pub fn append(&mut self, parent: NodeId, mut node: ViewNode) -> Result<NodeId> {
        if parent.index() >= self.nodes.len() {
            return Err(ViewError::UnknownNode(parent));
        }
        node.check_names()?;
        let id = NodeId::from_index(self.nodes.len());
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Append `node` under the root without checking names.
    ///
    /// For trees built in code; [`render_html`](crate::render_html) still
    /// escapes whatever names it finds.
    pub fn push(&mut self, node: ViewNode) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        let mut node = node;
        node.children.clear();
        self.nodes.push(node);
        self.nodes[0].children.push(id);
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ViewNode> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn root(&self) -> &ViewNode {
        &self.nodes[0]
    }

    /// Replace a node's displayed text. Returns whether it changed.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<bool> {
        self.node_mut(id).map(|node| node.replace_text(text))
    }

    /// Set an attribute on a node. Returns whether it changed.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<bool> {
        check_name("attribute", name)?;
        self.node_mut(id)
            .map(|node| node.put_attribute(name.to_owned(), value.to_owned()))
    }

    /// First node (document order) whose `name` attribute equals `value`.
    #[must_use]
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.attribute(name) == Some(value))
            .map(|(id, _)| id)
    }

    /// Non-root nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ViewNode)> {
        let mut stack: Vec<NodeId> = self.nodes[0].children.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = &self.nodes[id.index()];
            stack.extend(node.children.iter().rev().copied());
            Some((id, node))
        })
    }

    /// Number of nodes, excluding the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ViewNode> {
        if id == NodeId::ROOT {
            return Err(ViewError::UnknownNode(id));
        }
        self.nodes
            .get_mut(id.index())
            .ok_or(ViewError::UnknownNode(id))
    }
}
