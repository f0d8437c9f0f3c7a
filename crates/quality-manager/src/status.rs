//! Result fetching.

use std::fmt;

use quality_model::ErrorRecord;

use crate::error::Result;

/// Outcome of the latest poll of the result service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckStatus {
    Checking,
    /// The service is still running the quality check.
    ResultOngoing,
    ResultUpdated,
    ResultFailed,
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checking => "Checking quality results",
            Self::ResultOngoing => "Quality check in progress",
            Self::ResultUpdated => "Quality results updated",
            Self::ResultFailed => "Fetching quality results failed",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Service that produces quality results.
pub trait ResultSource {
    /// Latest complete result set, or `None` while the check is still
    /// running. An empty set means there are no errors.
    fn fetch_results(&mut self) -> Result<Option<Vec<ErrorRecord>>>;
}

impl<F> ResultSource for F
where
    F: FnMut() -> Result<Option<Vec<ErrorRecord>>>,
{
    fn fetch_results(&mut self) -> Result<Option<Vec<ErrorRecord>>> {
        self()
    }
}
