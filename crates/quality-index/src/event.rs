use crate::node::NodeId;

/// Change notification returned by every mutating index call.
///
/// Structural events name the parent and the inclusive row range they touch,
/// so an observer can apply them one by one without a full reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    /// Rows `first..=last` were inserted under `parent`.
    RowsInserted {
        parent: NodeId,
        first: usize,
        last: usize,
    },
    /// Rows `first..=last` were removed from `parent`. Positions refer to the
    /// state before the removal.
    RowsRemoved {
        parent: NodeId,
        first: usize,
        last: usize,
    },
    /// The displayed value of `node` changed.
    DataChanged { node: NodeId },
    /// The user toggled the processed flag of an error. Consumers forward
    /// this to the service that persists processed state.
    ErrorChecked { identifier: String, processed: bool },
}

impl IndexEvent {
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            IndexEvent::RowsInserted { .. } | IndexEvent::RowsRemoved { .. }
        )
    }
}
