//! Tree node types.

use std::collections::HashMap;

use quality_model::{ErrorRecord, Priority};

/// Arena slot of a tree node.
///
/// Ids of surviving nodes are stable across refreshes. Once a node is removed
/// its id may be reused for a node created later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Level of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Priority,
    FeatureType,
    Feature,
    Error,
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Root,
    Priority(Priority),
    FeatureType(String),
    Feature {
        feature_type: String,
        feature_id: String,
    },
    Error(ErrorRecord),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Root => NodeKind::Root,
            NodeData::Priority(_) => NodeKind::Priority,
            NodeData::FeatureType(_) => NodeKind::FeatureType,
            NodeData::Feature { .. } => NodeKind::Feature,
            NodeData::Error(_) => NodeKind::Error,
        }
    }

    /// Key unique among siblings.
    pub fn key(&self) -> &str {
        match self {
            NodeData::Root => "",
            NodeData::Priority(priority) => priority.as_str(),
            NodeData::FeatureType(feature_type) => feature_type,
            NodeData::Feature { feature_id, .. } => feature_id,
            NodeData::Error(record) => &record.unique_identifier,
        }
    }

    pub fn record(&self) -> Option<&ErrorRecord> {
        match self {
            NodeData::Error(record) => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) child_lookup: HashMap<String, NodeId>,
}

impl Node {
    pub(crate) fn new(data: NodeData, parent: Option<NodeId>) -> Self {
        Self {
            data,
            parent,
            children: Vec::new(),
            child_lookup: HashMap::new(),
        }
    }
}
