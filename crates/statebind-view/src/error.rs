use thiserror::Error;

use crate::node::NodeId;

pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors from view construction and binding discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("malformed {marker} marker on node {node}: {reason}")]
    MalformedMarker {
        node: NodeId,
        marker: &'static str,
        reason: String,
    },

    #[error("unknown view node: {0}")]
    UnknownNode(NodeId),

    #[error("invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },
}
