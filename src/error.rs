//! Error types for the migration adapter
//!
//! Every expected failure of a migration run maps to one of the
//! `MigrationError` classifications and is returned to the caller;
//! nothing is logged as a side channel and nothing panics.

/// Result type alias for migration adapter operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Terminal classifications of a migration run
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The connection exposes no SQL handle the migration engine can use.
    /// Carries the concrete runtime type name of the connection. Produced
    /// before any database I/O; not retryable.
    #[error("unsupported connection kind `{0}`: no SQL handle capability")]
    UnsupportedConnectionKind(&'static str),

    /// Building the engine session failed: unrecognized dialect or an
    /// unreadable/missing migration source. Not retryable without fixing
    /// the configuration.
    #[error("failed to construct engine session: {0}")]
    SessionConstructionFailed(String),

    /// The engine rejected a migration script or failed reading one. The
    /// engine's original message is preserved. The adapter never retries;
    /// already-committed scripts stay committed.
    #[error("migration execution failed: {0}")]
    MigrationExecutionFailed(String),

    /// The caller's cancellation token fired before or during the run.
    #[error("migration run cancelled")]
    Cancelled,
}

/// Error surfaced by the consumed `DatabaseConnection` interface.
///
/// Connection providers map their driver errors into this; the adapter
/// itself never produces it.
#[derive(Debug, thiserror::Error)]
#[error("connection error: {0}")]
pub struct ConnectionError(pub String);
