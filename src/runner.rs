//! Migration runner
//!
//! [`MigrationRunner`] is the crate's public surface: an immutable
//! configuration value (source, dialect, engine options) plus the single
//! `run_migrations` operation the template-database lifecycle manager
//! invokes once per template database, before the template is cloned
//! into test databases.

use tokio_util::sync::CancellationToken;

use crate::config::{Dialect, EngineOption, MigrationReport, MigrationSource};
use crate::connection::{resolve_sql_handle, DatabaseConnection};
use crate::error::MigrationResult;
use crate::session::EngineSession;

/// Applies a directory of versioned migration scripts against a
/// connection supplied by a pluggable connection provider.
///
/// Configuration mutators consume and return the runner, so call order is
/// chain order: `with_dialect` replaces (last call wins) and
/// `with_engine_options` appends. Construction performs no validation and
/// no I/O; both are deferred to the run.
///
/// ```no_run
/// use pgtemplate_migrate::{MigrationRunner, MigrationSource, EngineOption};
///
/// let runner = MigrationRunner::new(MigrationSource::from_path("./migrations"))
///     .with_engine_options([EngineOption::Locking(true)]);
/// ```
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    source: MigrationSource,
    dialect: Dialect,
    options: Vec<EngineOption>,
}

impl MigrationRunner {
    /// Create a runner for the given migration source. Defaults: postgres
    /// dialect, no engine options.
    pub fn new(source: MigrationSource) -> Self {
        Self {
            source,
            dialect: Dialect::default(),
            options: Vec::new(),
        }
    }

    /// Replace the target SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Append engine options, preserving the order supplied. Repeated
    /// calls accumulate rather than replace.
    pub fn with_engine_options(
        mut self,
        options: impl IntoIterator<Item = EngineOption>,
    ) -> Self {
        self.options.extend(options);
        self
    }

    pub fn source(&self) -> &MigrationSource {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn engine_options(&self) -> &[EngineOption] {
        &self.options
    }

    /// Apply all pending migrations, exactly once, up to the latest
    /// version.
    ///
    /// One best-effort attempt: the adapter never retries and keeps no
    /// state between calls, so concurrent invocations against independent
    /// connections and runners do not interfere. All failure modes map to
    /// [`crate::MigrationError`]; the connection is never closed here.
    pub async fn run_migrations(
        &self,
        cancel: &CancellationToken,
        conn: &dyn DatabaseConnection,
    ) -> MigrationResult<MigrationReport> {
        let handle = resolve_sql_handle(conn)?;

        tracing::info!(
            source = %self.source.path().display(),
            dialect = %self.dialect,
            shimmed = handle.is_shimmed(),
            "running migrations"
        );

        let session =
            EngineSession::new(self.dialect, handle, &self.source, &self.options).await?;
        session.apply_pending(cancel).await
    }
}
