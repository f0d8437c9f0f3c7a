pub mod event;
pub mod index;
pub mod node;

pub use event::IndexEvent;
pub use index::ErrorIndex;
pub use node::{NodeData, NodeId, NodeKind};
