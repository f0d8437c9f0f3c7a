//! Four-level error tree: priority -> feature type -> feature -> error.
//!
//! The tree lives in an arena of nodes addressed by [`NodeId`]. Parents own
//! an ordered child list plus a key lookup; children point back to their
//! parent by id. [`ErrorIndex::refresh`] applies a new result batch as a
//! diff against the current tree and reports every change as an
//! [`IndexEvent`], so views can keep their expansion and selection state.

use std::collections::HashMap;

use quality_model::{ErrorRecord, Priority};
use tracing::{debug, trace, warn};

use crate::event::IndexEvent;
use crate::node::{Node, NodeData, NodeId, NodeKind};

#[derive(Debug)]
pub struct ErrorIndex {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
    /// Priority nodes in `Priority::ALL` order. Never removed.
    priorities: [NodeId; 3],
    errors_by_id: HashMap<String, NodeId>,
    revision: u64,
}

impl Default for ErrorIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorIndex {
    /// Creates the root and one node per priority.
    pub fn new() -> Self {
        let mut index = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            priorities: [NodeId(0); 3],
            errors_by_id: HashMap::new(),
            revision: 0,
        };
        let root = index.alloc(Node::new(NodeData::Root, None));
        index.root = root;
        for (slot, priority) in Priority::ALL.into_iter().enumerate() {
            let (id, _) = index.create_child(root, NodeData::Priority(priority));
            index.priorities[slot] = id;
        }
        index
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Incremented whenever a call changes the tree or any displayed value.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn priority_node(&self, priority: Priority) -> NodeId {
        match priority {
            Priority::Fatal => self.priorities[0],
            Priority::Warning => self.priorities[1],
            Priority::Info => self.priorities[2],
        }
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|node| &node.data)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.data(id).map(NodeData::kind)
    }

    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.data(id).map(NodeData::key)
    }

    pub fn record(&self, id: NodeId) -> Option<&ErrorRecord> {
        self.data(id).and_then(NodeData::record)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn child(&self, id: NodeId, row: usize) -> Option<NodeId> {
        self.children(id).get(row).copied()
    }

    pub fn child_by_key(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.node(id)
            .and_then(|node| node.child_lookup.get(key))
            .copied()
    }

    /// Position of a node among its siblings. Linear in the sibling count.
    pub fn row(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn find_error(&self, identifier: &str) -> Option<NodeId> {
        self.errors_by_id.get(identifier).copied()
    }

    pub fn contains_error(&self, identifier: &str) -> bool {
        self.errors_by_id.contains_key(identifier)
    }

    /// Number of error nodes in the whole tree.
    pub fn error_count(&self) -> usize {
        self.errors_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors_by_id.is_empty()
    }

    /// Error nodes below `id` (or `id` itself) in traversal order.
    pub fn descendant_errors(&self, id: NodeId) -> Vec<NodeId> {
        let mut errors = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if node.data.kind() == NodeKind::Error {
                errors.push(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        errors
    }

    /// All error nodes in traversal order.
    pub fn error_nodes(&self) -> Vec<NodeId> {
        self.descendant_errors(self.root)
    }

    /// Records of all error nodes in traversal order.
    pub fn records(&self) -> Vec<&ErrorRecord> {
        self.error_nodes()
            .into_iter()
            .filter_map(|id| self.record(id))
            .collect()
    }

    /// Applies a new result batch as a diff against the current tree.
    ///
    /// Errors whose identifier is missing from `records` are removed in
    /// reverse traversal order, then new errors are appended in input order.
    /// Feature type and feature nodes emptied by the removal stay in the
    /// tree. Errors present before and after are left in place; only a
    /// changed processed flag is synced and reported as `DataChanged`.
    ///
    /// Identifiers must be unique within one batch; later duplicates are
    /// ignored.
    pub fn refresh(&mut self, records: &[ErrorRecord]) -> Vec<IndexEvent> {
        let mut incoming: HashMap<&str, &ErrorRecord> = HashMap::with_capacity(records.len());
        let mut ordered: Vec<&ErrorRecord> = Vec::with_capacity(records.len());
        for record in records {
            let identifier = record.unique_identifier.as_str();
            let duplicate = incoming.contains_key(identifier);
            if duplicate {
                warn!(identifier, "duplicate error identifier in result batch, keeping the first");
            }
            debug_assert!(!duplicate, "duplicate error identifier in result batch: {identifier}");
            if !duplicate {
                incoming.insert(identifier, record);
                ordered.push(record);
            }
        }

        let stale: Vec<NodeId> = self
            .error_nodes()
            .into_iter()
            .filter(|id| {
                self.key(*id)
                    .is_some_and(|key| !incoming.contains_key(key))
            })
            .collect();
        let fresh: Vec<&ErrorRecord> = ordered
            .iter()
            .copied()
            .filter(|record| !self.errors_by_id.contains_key(&record.unique_identifier))
            .collect();

        let mut events = Vec::new();
        let (removed, added) = (stale.len(), fresh.len());

        for id in stale.into_iter().rev() {
            events.extend(self.remove_error(id));
        }
        for record in fresh {
            events.extend(self.insert_error(record));
        }

        for record in ordered {
            let Some(&id) = self.errors_by_id.get(&record.unique_identifier) else {
                continue;
            };
            let changed = match self.node_mut(id) {
                Some(Node {
                    data: NodeData::Error(current),
                    ..
                }) if current.is_user_processed != record.is_user_processed => {
                    current.is_user_processed = record.is_user_processed;
                    true
                }
                _ => false,
            };
            if changed {
                events.extend(self.data_changed_chain(id));
            }
        }

        if !events.is_empty() {
            self.revision += 1;
        }
        debug!(
            removed,
            added,
            events = events.len(),
            total = self.error_count(),
            "refreshed error index"
        );
        events
    }

    /// Sets the processed flag of one error.
    ///
    /// Returns `None` when no error has `identifier`. Otherwise returns a
    /// `DataChanged` event for the error and each of its ancestors, followed
    /// by an `ErrorChecked` event carrying the new state.
    pub fn set_user_processed(
        &mut self,
        identifier: &str,
        processed: bool,
    ) -> Option<Vec<IndexEvent>> {
        debug_assert!(
            self.errors_by_id.contains_key(identifier),
            "unknown error identifier: {identifier}"
        );
        let Some(&id) = self.errors_by_id.get(identifier) else {
            warn!(identifier, "cannot set processed state of unknown error");
            return None;
        };

        if let Some(Node {
            data: NodeData::Error(record),
            ..
        }) = self.node_mut(id)
        {
            record.is_user_processed = processed;
        }

        let mut events = self.data_changed_chain(id);
        events.push(IndexEvent::ErrorChecked {
            identifier: identifier.to_string(),
            processed,
        });
        self.revision += 1;
        trace!(identifier, processed, "set user processed");
        Some(events)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Appends a new node as the last child of `parent`. Returns the node
    /// and its row.
    fn create_child(&mut self, parent: NodeId, data: NodeData) -> (NodeId, usize) {
        let key = data.key().to_string();
        let id = self.alloc(Node::new(data, Some(parent)));
        let row = match self.node_mut(parent) {
            Some(parent_node) => {
                parent_node.child_lookup.insert(key, id);
                parent_node.children.push(id);
                parent_node.children.len() - 1
            }
            None => 0,
        };
        (id, row)
    }

    fn insert_error(&mut self, record: &ErrorRecord) -> Vec<IndexEvent> {
        let mut events = Vec::with_capacity(3);

        let priority = self.priority_node(record.priority);
        let feature_type = match self.child_by_key(priority, &record.feature_type) {
            Some(existing) => existing,
            None => {
                let (id, row) = self.create_child(
                    priority,
                    NodeData::FeatureType(record.feature_type.clone()),
                );
                events.push(IndexEvent::RowsInserted {
                    parent: priority,
                    first: row,
                    last: row,
                });
                id
            }
        };

        let feature = match self.child_by_key(feature_type, &record.feature_id) {
            Some(existing) => existing,
            None => {
                let (id, row) = self.create_child(
                    feature_type,
                    NodeData::Feature {
                        feature_type: record.feature_type.clone(),
                        feature_id: record.feature_id.clone(),
                    },
                );
                events.push(IndexEvent::RowsInserted {
                    parent: feature_type,
                    first: row,
                    last: row,
                });
                id
            }
        };

        let (error, row) = self.create_child(feature, NodeData::Error(record.clone()));
        self.errors_by_id
            .insert(record.unique_identifier.clone(), error);
        events.push(IndexEvent::RowsInserted {
            parent: feature,
            first: row,
            last: row,
        });
        trace!(identifier = %record.unique_identifier, row, "inserted error");
        events
    }

    fn remove_error(&mut self, id: NodeId) -> Option<IndexEvent> {
        let node = self.nodes.get_mut(id.0)?.take()?;
        let key = node.data.key();
        let parent = node.parent?;
        let parent_node = self.node_mut(parent)?;
        let row = parent_node.children.iter().position(|child| *child == id)?;
        parent_node.children.remove(row);
        parent_node.child_lookup.remove(key);
        self.errors_by_id.remove(key);
        self.free.push(id.0);
        trace!(identifier = key, row, "removed error");
        Some(IndexEvent::RowsRemoved {
            parent,
            first: row,
            last: row,
        })
    }

    /// `DataChanged` for `id` and each ancestor below the root.
    fn data_changed_chain(&self, id: NodeId) -> Vec<IndexEvent> {
        let mut events = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                break;
            }
            events.push(IndexEvent::DataChanged { node });
            current = self.parent(node);
        }
        events
    }
}
