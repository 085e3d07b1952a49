//! Error types for trainer operations.
//!
//! The taxonomy follows the service boundaries: readiness, the answer
//! lifecycle, optimization, persistence, and the upstream session transport.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for trainer operations.
pub type TrainerResult<T> = Result<T, TrainerError>;

/// Main error type for all trainer operations.
#[derive(Error, Debug)]
pub enum TrainerError {
    /// Catalogue sync is incomplete; card-serving operations refuse.
    #[error("trainer is not ready: catalogue sync incomplete")]
    NotReady,

    /// An answer was submitted while no card was checked out.
    #[error("no active card: draw the next card before answering")]
    NoActiveCard,

    /// Batch parameter optimization failed. Non-fatal: prior parameters
    /// and due dates are retained.
    #[error("optimization failed: {message}")]
    Optimization { message: String },

    /// Writing the state snapshot failed. The in-memory state change is
    /// not rolled back, but the on-disk snapshot may be stale.
    #[error("persistence failed, snapshot may be stale: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The session transport or another upstream collaborator failed.
    #[error("upstream error: {message}")]
    Upstream { message: String },

    /// An upstream request got no reply within the correlation timeout.
    #[error("upstream request timed out after {0:?}")]
    UpstreamTimeout(Duration),

    /// The scheduling algorithm rejected an input or computation.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A song id that is not part of the working catalogue.
    #[error("unknown song id: {0}")]
    UnknownSong(i64),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TrainerError {
    /// Create an optimization error.
    pub fn optimization(message: impl Into<String>) -> Self {
        Self::Optimization {
            message: message.into(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            source: None,
        }
    }

    /// Create a persistence error wrapping its cause.
    pub fn persistence_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Whether the front end should surface this as service-unavailable
    /// rather than a caller mistake.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NotReady | Self::Upstream { .. } | Self::UpstreamTimeout(_)
        )
    }
}

impl From<fsrs::FSRSError> for TrainerError {
    fn from(err: fsrs::FSRSError) -> Self {
        Self::Scheduler(err.to_string())
    }
}
