use thiserror::Error;

/// Error taxonomy for the scan pipeline.
///
/// Deliberately small: a failed title classification is not an error (the
/// classifier returns `None` and the event is dropped), and an ambiguous
/// friend match is not an error (it is a first-class outcome on the event).
/// Only permission loss and total data-source unavailability fail a scan.
#[derive(Error, Debug)]
pub enum WeaveError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Data source unavailable: {0}")]
    DataSource(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Rebuild an owned error from a shared one. Used by the coalescing cache,
/// whose in-flight future hands the same error to every waiter. The anyhow
/// variant is not cloneable and collapses to `DataSource` with its message.
impl From<std::sync::Arc<WeaveError>> for WeaveError {
    fn from(e: std::sync::Arc<WeaveError>) -> Self {
        match &*e {
            WeaveError::PermissionDenied(s) => WeaveError::PermissionDenied(s.clone()),
            WeaveError::DataSource(s) => WeaveError::DataSource(s.clone()),
            WeaveError::Persistence(s) => WeaveError::Persistence(s.clone()),
            WeaveError::Anyhow(err) => WeaveError::DataSource(err.to_string()),
        }
    }
}
