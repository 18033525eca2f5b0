//! Storage error types.

use std::fmt;
use thiserror::Error;

/// Result type for single-backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type for synchronizer operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from one backend operation.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The backend's query matched several stored documents where exactly
    /// one was expected. Nothing at this layer can pick the right one.
    #[error("more than one stored document matches {document}")]
    Ambiguous { document: String },

    #[error("invalid stored timestamp: {0}")]
    Timestamp(String),

    #[error("backend failure: {0}")]
    Other(String),
}

/// One backend's failure, tagged with the backend's name for reporting.
#[derive(Debug)]
pub struct BackendFailure {
    pub backend: String,
    pub error: BackendError,
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.backend, self.error)
    }
}

/// Errors from a synchronizer operation over the whole backend set.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Every backend read failed; nothing could be consulted.
    #[error("no usable backend: {}", format_failures(.failures))]
    NoUsableBackend { failures: Vec<BackendFailure> },

    /// One or more backend writes failed. Backends that succeeded keep the
    /// new content; nothing is rolled back or retried.
    #[error(
        "{failed} of {total} backend writes failed: {causes}",
        failed = .failures.len(),
        total = .total,
        causes = format_failures(.failures)
    )]
    PartialWriteFailure {
        total: usize,
        failures: Vec<BackendFailure>,
    },

    /// A backend reported ambiguous document state; converging replicas
    /// could clobber the wrong candidate, so the whole read aborts.
    #[error("unrecoverable backend state: {0}")]
    Ambiguous(BackendFailure),
}

fn format_failures(failures: &[BackendFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
