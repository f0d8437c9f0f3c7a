//! Quality result manager.
//!
//! [`QualityResultManager`] feeds result batches through the error index,
//! the filter pipeline and the map visualizer, and reports what changed as a
//! [`ManagerUpdate`].

pub mod error;
pub mod logging;
pub mod manager;
pub mod settings;
pub mod status;

pub use error::{ManagerError, Result};
pub use manager::{CheckedChange, ManagerUpdate, QualityResultManager, UNKNOWN_STATUS_LABEL};
pub use settings::{DEFAULT_POLL_INTERVAL_SECS, ManagerSettings};
pub use status::{CheckStatus, ResultSource};
