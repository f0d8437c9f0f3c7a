//! Manager error types.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    /// The request to the result service failed.
    #[error("quality result request failed: {0}")]
    Client(String),

    /// The quality check itself failed on the service side.
    #[error("quality result service error: {0}")]
    Server(String),

    #[error("invalid settings")]
    Settings {
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("failed to open log file")]
    LogFile {
        #[source]
        source: io::Error,
    },

    #[error("logging already initialized")]
    LoggingInitialized {
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

impl ManagerError {
    /// Fetch failures are retried on the next poll; everything else needs
    /// a configuration change.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Client(_) | Self::Server(_))
    }
}

pub type Result<T> = std::result::Result<T, ManagerError>;
