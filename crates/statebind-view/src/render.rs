//! Deterministic HTML serialization of a [`ViewTree`].
//!
//! One element per line, two-space indentation per depth. Text, attribute
//! values and names are escaped. Void elements (`input`, `br`, `hr`, `img`) have no
//! closing tag and their text is not rendered.

use std::fmt::Write as _;

use v_htmlescape::escape;

use crate::node::{NodeId, ViewNode};
use crate::tree::ViewTree;

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

/// Render every non-root node of `tree` as HTML.
#[must_use]
pub fn render_html(tree: &ViewTree) -> String {
    let mut out = String::new();
    for &child in tree.root().children() {
        render_node(tree, child, 0, &mut out);
    }
    out
}

fn render_node(tree: &ViewTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.node(id) else {
        return;
    };
    let indent = "  ".repeat(depth);

    out.push_str(&indent);
    open_tag(node, out);

    if VOID_TAGS.contains(&node.tag()) {
        out.push('\n');
        return;
    }

    if node.children().is_empty() {
        let _ = writeln!(out, "{}</{}>", escape(node.text()), escape(node.tag()));
        return;
    }

    if !node.text().is_empty() {
        let _ = write!(out, "{}", escape(node.text()));
    }
    out.push('\n');
    for &child in node.children() {
        render_node(tree, child, depth + 1, out);
    }
    let _ = writeln!(out, "{indent}</{}>", escape(node.tag()));
}

fn open_tag(node: &ViewNode, out: &mut String) {
    let _ = write!(out, "<{}", escape(node.tag()));
    for (name, value) in node.attributes() {
        let _ = write!(out, " {}=\"{}\"", escape(name), escape(value));
    }
    out.push('>');
}
