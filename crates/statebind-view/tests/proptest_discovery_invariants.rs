#![forbid(unsafe_code)]

//! Property tests for binding discovery and HTML rendering.
//!
//! # Invariants
//!
//! 1. `discover` yields one binding per well-formed marker, in document order.
//! 2. `discover_strict` succeeds iff every marker is well-formed, and then
//!    agrees with `discover`.
//! 3. A template without `{value}` renders unchanged.
//! 4. Rendering emits one opening tag per node; text never leaks raw `<`.
//!
//! Run: `cargo test -p statebind-view --test proptest_discovery_invariants`

use proptest::prelude::*;
use statebind_view::{
    BindKind, NodeId, ViewNode, ViewTree, discover, discover_strict, render_html,
};

#[derive(Debug, Clone)]
enum Marker {
    None,
    Text(String),
    Attr(String),
    AttrAs(String, String),
    Malformed,
}

#[derive(Debug, Clone)]
struct Spec {
    parent: usize,
    text: String,
    marker: Marker,
}

fn marker() -> impl Strategy<Value = Marker> {
    prop_oneof![
        3 => Just(Marker::None),
        3 => "[a-z]{1,5}".prop_map(Marker::Text),
        2 => "[a-z]{1,5}".prop_map(Marker::Attr),
        2 => ("[a-z]{1,5}", "[a-z]{1,5}").prop_map(|(k, a)| Marker::AttrAs(k, a)),
        1 => Just(Marker::Malformed),
    ]
}

fn specs() -> impl Strategy<Value = Vec<Spec>> {
    prop::collection::vec(
        (any::<prop::sample::Index>(), "[a-z<>&\" ]{0,8}", marker()),
        0..16,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (parent, text, marker))| Spec {
                // 0 is the root, i is the i-th previously created node.
                parent: parent.index(i + 1),
                text,
                marker,
            })
            .collect()
    })
}

fn build(specs: &[Spec]) -> (ViewTree, Vec<NodeId>) {
    let mut tree = ViewTree::new();
    let mut ids = Vec::with_capacity(specs.len());
    for spec in specs {
        let node = ViewNode::new("span").with_text(spec.text.clone());
        let node = match &spec.marker {
            Marker::None => node,
            Marker::Text(key) => node.bind_text(key),
            Marker::Attr(key) => node.bind_attr(key),
            Marker::AttrAs(key, attr) => node.bind_attr_as(key, attr),
            Marker::Malformed => node.bind_text("  "),
        };
        let parent = if spec.parent == 0 {
            NodeId::ROOT
        } else {
            ids[spec.parent - 1]
        };
        ids.push(tree.append(parent, node).unwrap());
    }
    (tree, ids)
}

proptest! {
    #[test]
    fn discovery_follows_document_order(specs in specs()) {
        let (tree, ids) = build(&specs);
        let bindings = discover(&tree);

        let expected: Vec<(NodeId, String, BindKind)> = tree
            .iter()
            .filter_map(|(id, _)| {
                let idx = ids.iter().position(|&n| n == id)?;
                match &specs[idx].marker {
                    Marker::Text(k) => Some((id, k.clone(), BindKind::Text)),
                    Marker::Attr(k) => {
                        Some((id, k.clone(), BindKind::Attribute("data-value".into())))
                    }
                    Marker::AttrAs(k, a) => Some((id, k.clone(), BindKind::Attribute(a.clone()))),
                    Marker::None | Marker::Malformed => None,
                }
            })
            .collect();

        let actual: Vec<(NodeId, String, BindKind)> = bindings
            .into_iter()
            .map(|b| (b.node, b.key, b.kind))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn strict_agrees_with_lenient(specs in specs()) {
        let (tree, _) = build(&specs);
        let any_malformed = specs.iter().any(|s| matches!(s.marker, Marker::Malformed));
        match discover_strict(&tree) {
            Ok(strict) => {
                prop_assert!(!any_malformed);
                prop_assert_eq!(strict, discover(&tree));
            }
            Err(_) => prop_assert!(any_malformed),
        }
    }

    #[test]
    fn template_without_placeholder_is_verbatim(
        template in "[a-zA-Z !]{0,16}",
        value in "[a-z0-9]{0,8}",
    ) {
        let mut tree = ViewTree::new();
        tree.push(ViewNode::new("p").bind_text("k").with_template(template.clone()));
        let bindings = discover(&tree);
        prop_assert_eq!(bindings[0].render(&value), template);
    }

    #[test]
    fn render_opens_each_node_once(specs in specs()) {
        let (tree, _) = build(&specs);
        let html = render_html(&tree);
        let opening = html
            .lines()
            .map(str::trim_start)
            .filter(|line| line.starts_with('<') && !line.starts_with("</"))
            .count();
        prop_assert_eq!(opening, tree.len());
        for line in html.lines() {
            let body = line.trim_start();
            let inner = &body[body.find('>').map_or(0, |i| i + 1)..];
            let text = inner.split("</").next().unwrap_or("");
            prop_assert!(!text.contains('<'), "unescaped text in {line:?}");
        }
    }
}
