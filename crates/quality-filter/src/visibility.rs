//! Row visibility derived from the index and the stage chain.

use std::collections::HashMap;

use quality_index::{ErrorIndex, NodeData, NodeId, NodeKind};

/// Visibility of every node plus the number of visible errors below it.
///
/// Error rows are visible when every stage accepts them. Feature type and
/// feature rows are visible when any child is. The root and the priority
/// rows are always visible, even with nothing below them.
#[derive(Debug, Clone, Default)]
pub struct Visibility {
    visible: HashMap<NodeId, usize>,
}

impl Visibility {
    pub fn compute(index: &ErrorIndex, accepts: impl Fn(&NodeData) -> bool) -> Self {
        let mut visibility = Self::default();
        visibility.visit(index, index.root(), &accepts);
        visibility
    }

    /// Returns the visible error count below `id`, recording `id` when it
    /// is visible.
    fn visit(
        &mut self,
        index: &ErrorIndex,
        id: NodeId,
        accepts: &impl Fn(&NodeData) -> bool,
    ) -> usize {
        let Some(data) = index.data(id) else {
            return 0;
        };
        let (count, visible) = match data.kind() {
            NodeKind::Error => {
                let accepted = accepts(data);
                (usize::from(accepted), accepted)
            }
            kind => {
                let mut count = 0;
                let mut any_visible = false;
                for child in index.children(id) {
                    count += self.visit(index, *child, accepts);
                    any_visible |= self.visible.contains_key(child);
                }
                let always = matches!(kind, NodeKind::Root | NodeKind::Priority);
                (count, always || any_visible)
            }
        };
        if visible {
            self.visible.insert(id, count);
        }
        count
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.visible.contains_key(&id)
    }

    /// Visible errors below `id`. Zero for hidden nodes.
    pub fn visible_error_count(&self, id: NodeId) -> usize {
        self.visible.get(&id).copied().unwrap_or(0)
    }

    /// Visible children of `id` in row order.
    pub fn visible_children(&self, index: &ErrorIndex, id: NodeId) -> Vec<NodeId> {
        index
            .children(id)
            .iter()
            .copied()
            .filter(|child| self.is_visible(*child))
            .collect()
    }

    /// Visible error nodes in traversal order.
    pub fn visible_errors(&self, index: &ErrorIndex) -> Vec<NodeId> {
        index
            .error_nodes()
            .into_iter()
            .filter(|id| self.is_visible(*id))
            .collect()
    }
}
