//! Error types for sf-bulk.

/// Result type alias for bulk operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Returns true if the remote job ended in a failure state.
    pub fn is_job_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::JobFailed(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Batch input that cannot be turned into a CSV payload. Raised before
    /// any network call.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Transport-level failure, propagated unmodified from the HTTP layer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed CSV in a result set.
    #[error("CSV error: {0}")]
    Csv(String),

    /// The remote job reached a failure-class terminal state. Carries the
    /// remote-reported error message.
    #[error("Bulk job failed: {0}")]
    JobFailed(String),

    /// Operation this client does not implement.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl From<drover_sf_client::Error> for Error {
    fn from(err: drover_sf_client::Error) -> Self {
        Error {
            kind: ErrorKind::Transport(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error {
            kind: ErrorKind::Csv(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_failure_classification() {
        let err = Error::new(ErrorKind::JobFailed("InvalidBatch".into()));
        assert!(err.is_job_failure());
        assert_eq!(err.to_string(), "Bulk job failed: InvalidBatch");

        let err = Error::new(ErrorKind::Unsupported("select".into()));
        assert!(!err.is_job_failure());
    }

    #[test]
    fn transport_errors_keep_source() {
        let inner = drover_sf_client::Error::new(drover_sf_client::ErrorKind::Timeout);
        let err: Error = inner.into();
        assert!(matches!(err.kind, ErrorKind::Transport(_)));
        assert!(err.source.is_some());
    }
}
