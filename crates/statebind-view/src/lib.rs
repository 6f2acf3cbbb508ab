#![forbid(unsafe_code)]

//! View tree and binding declarations for statebind.
//!
//! This crate provides:
//! - [`ViewTree`] an arena of [`ViewNode`]s with text and attributes
//! - [`Binding`] declarations discovered from node markers
//! - [`render_html`] for deterministic HTML serialization

pub mod error;
pub mod markers;
pub mod node;
pub mod render;
pub mod tree;

pub use error::{Result, ViewError};
pub use markers::{
    BIND_ATTR_MARKER, BIND_TEXT_MARKER, BindKind, Binding, DEFAULT_VALUE_ATTR, TEMPLATE_MARKER,
    discover, discover_strict,
};
pub use node::{NodeId, ViewNode, is_valid_name};
pub use render::render_html;
pub use tree::ViewTree;
