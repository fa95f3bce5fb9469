//! Engine session
//!
//! An [`EngineSession`] is built per `run_migrations` call from the
//! resolved handle plus the runner configuration, and lives only for that
//! call. Construction is where deferred validation happens: the dialect
//! is checked against the handle and the migration source is enumerated.
//! Execution itself is delegated to the engine; this module only drives
//! it and translates outcomes.

use std::collections::HashSet;
use std::time::Instant;

use sqlx::migrate::{Migrate, Migrator};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::{Dialect, EngineOption, MigrationReport, MigrationSource};
use crate::connection::ResolvedHandle;
use crate::error::{MigrationError, MigrationResult};

/// Ephemeral migration-engine session bound to one handle, one dialect,
/// one source, and one option set.
#[derive(Debug)]
pub(crate) struct EngineSession {
    migrator: Migrator,
    handle: ResolvedHandle,
}

impl EngineSession {
    /// Build a session, validating the dialect and enumerating the source.
    ///
    /// Engine options are applied in the order supplied; for scalar knobs
    /// the last write wins, which is the engine's own semantics for
    /// repeated setter calls.
    pub(crate) async fn new(
        dialect: Dialect,
        handle: ResolvedHandle,
        source: &MigrationSource,
        options: &[EngineOption],
    ) -> MigrationResult<Self> {
        // The resolved handle is Postgres-typed; any other dialect is
        // unknown to the engine session it would configure.
        if dialect != Dialect::PostgreSQL {
            return Err(MigrationError::SessionConstructionFailed(format!(
                "dialect `{dialect}` is not recognized for a postgres handle"
            )));
        }

        let mut migrator = Migrator::new(source.path()).await.map_err(|e| {
            MigrationError::SessionConstructionFailed(format!(
                "failed to enumerate migration source `{}`: {e}",
                source.path().display()
            ))
        })?;

        for option in options {
            match *option {
                EngineOption::IgnoreMissing(value) => {
                    migrator.set_ignore_missing(value);
                }
                EngineOption::Locking(value) => {
                    migrator.set_locking(value);
                }
            }
        }

        Ok(Self { migrator, handle })
    }

    /// Apply all pending migrations up to the latest version.
    ///
    /// Cancellation is observed at await points, i.e. at least between
    /// migration scripts; scripts already committed stay committed since
    /// each script is the engine's unit of atomicity.
    pub(crate) async fn apply_pending(
        &self,
        cancel: &CancellationToken,
    ) -> MigrationResult<MigrationReport> {
        if cancel.is_cancelled() {
            return Err(MigrationError::Cancelled);
        }

        let start = Instant::now();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MigrationError::Cancelled),
            result = self.execute() => {
                let (applied_versions, skipped_count) = result?;
                let report = MigrationReport {
                    applied_count: applied_versions.len(),
                    applied_versions,
                    skipped_count,
                    execution_time_ms: start.elapsed().as_millis(),
                };
                tracing::debug!(
                    applied = report.applied_count,
                    skipped = report.skipped_count,
                    "migration run complete"
                );
                Ok(report)
            }
        }
    }

    async fn execute(&self) -> MigrationResult<(Vec<i64>, usize)> {
        let pool = self.handle.pool();

        let before = self.applied_versions(pool).await?;
        self.migrator
            .run(pool)
            .await
            .map_err(|e| MigrationError::MigrationExecutionFailed(e.to_string()))?;
        let after = self.applied_versions(pool).await?;

        let previously: HashSet<i64> = before.iter().copied().collect();
        let mut newly: Vec<i64> = after
            .into_iter()
            .filter(|version| !previously.contains(version))
            .collect();
        newly.sort_unstable();

        Ok((newly, before.len()))
    }

    /// Versions recorded in the engine's bookkeeping table.
    async fn applied_versions(&self, pool: &PgPool) -> MigrationResult<Vec<i64>> {
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| MigrationError::MigrationExecutionFailed(e.to_string()))?;
        let conn = &mut *conn;

        conn.ensure_migrations_table()
            .await
            .map_err(|e| MigrationError::MigrationExecutionFailed(e.to_string()))?;
        let applied = conn
            .list_applied_migrations()
            .await
            .map_err(|e| MigrationError::MigrationExecutionFailed(e.to_string()))?;

        Ok(applied.into_iter().map(|m| m.version).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_handle() -> ResolvedHandle {
        let pool = PgPool::connect_lazy("postgres://postgres@localhost:5432/unused")
            .expect("lazy pool");
        ResolvedHandle::Direct(pool)
    }

    #[tokio::test]
    async fn unknown_dialect_rejected_at_session_construction() {
        let dir = tempfile::tempdir().unwrap();
        let source = MigrationSource::from_path(dir.path());

        let err = EngineSession::new(Dialect::MySQL, lazy_handle(), &source, &[])
            .await
            .unwrap_err();
        match err {
            MigrationError::SessionConstructionFailed(msg) => {
                assert!(msg.contains("mysql"), "got {msg}");
            }
            other => panic!("expected SessionConstructionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_source_fails_session_construction() {
        let source = MigrationSource::from_path("/definitely/not/a/real/dir");

        let err = EngineSession::new(Dialect::PostgreSQL, lazy_handle(), &source, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::SessionConstructionFailed(_)));
    }

    #[tokio::test]
    async fn engine_options_forwarded_in_call_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = MigrationSource::from_path(dir.path());

        let session = EngineSession::new(
            Dialect::PostgreSQL,
            lazy_handle(),
            &source,
            &[
                EngineOption::IgnoreMissing(true),
                EngineOption::Locking(false),
                EngineOption::IgnoreMissing(false),
            ],
        )
        .await
        .unwrap();

        // Last write wins for repeated scalar knobs.
        assert!(!session.migrator.ignore_missing);
        assert!(!session.migrator.locking);
    }

    #[tokio::test]
    async fn already_cancelled_token_returns_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("0001_create_t.sql"),
            "CREATE TABLE t (id BIGINT PRIMARY KEY);\n",
        )
        .unwrap();
        let source = MigrationSource::from_path(dir.path());

        let session = EngineSession::new(Dialect::PostgreSQL, lazy_handle(), &source, &[])
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        // Returns before any database contact is attempted.
        let err = session.apply_pending(&cancel).await.unwrap_err();
        assert!(matches!(err, MigrationError::Cancelled));
    }
}
