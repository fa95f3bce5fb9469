//! Connection capability resolution
//!
//! The adapter receives connections as opaque `dyn DatabaseConnection`
//! values owned by the template-database lifecycle manager. The only
//! thing it needs from them is a handle the migration engine can drive:
//! providers opt in through the [`SqlHandleProvider`] capability
//! interface, and everything else lands in the explicit unsupported
//! branch. Resolution itself performs no database I/O.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{ConnectionError, MigrationError, MigrationResult};

/// Pluggable database connection, as supplied by a connection provider.
///
/// Establishment, health checking, and teardown of the underlying handle
/// stay with the provider; the adapter never closes a connection.
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// Execute a single statement on the underlying connection.
    async fn execute(&self, sql: &str) -> Result<u64, ConnectionError>;

    /// Execute a query and return the first column of the first row,
    /// decoded as text, or `None` when the query yields no rows.
    async fn query_row(&self, sql: &str) -> Result<Option<String>, ConnectionError>;

    /// Concrete type name of this connection, for diagnostics.
    ///
    /// Implementations return `std::any::type_name::<Self>()`.
    fn kind_name(&self) -> &'static str;

    /// The SQL-handle capability, if this connection has one.
    ///
    /// The default is `None`: a provider that does not implement
    /// [`SqlHandleProvider`] is reported as unsupported rather than
    /// probed any further.
    fn sql_capability(&self) -> Option<&dyn SqlHandleProvider> {
        None
    }
}

/// Capability interface a connection provider implements to expose a
/// handle the migration engine can operate on.
pub trait SqlHandleProvider: Send + Sync {
    fn sql_handle(&self) -> SqlHandle<'_>;
}

/// The handle shapes known to the adapter, in resolution priority order.
pub enum SqlHandle<'a> {
    /// The connection already wraps an sqlx pool; borrowed verbatim.
    Pool(&'a PgPool),
    /// The connection wraps a handle from an alternate driver family and
    /// exposes the connect spec the compatibility shim needs to
    /// synthesize an engine-facing pool.
    ConnectSpec(&'a str),
}

/// Outcome of capability resolution.
///
/// `Shimmed` pools connect lazily and never own the provider's own
/// handle, so dropping one after the run releases nothing of the
/// caller's.
#[derive(Debug)]
pub(crate) enum ResolvedHandle {
    Direct(PgPool),
    Shimmed(PgPool),
}

impl ResolvedHandle {
    pub(crate) fn pool(&self) -> &PgPool {
        match self {
            ResolvedHandle::Direct(pool) | ResolvedHandle::Shimmed(pool) => pool,
        }
    }

    pub(crate) fn is_shimmed(&self) -> bool {
        matches!(self, ResolvedHandle::Shimmed(_))
    }
}

/// Resolve an opaque connection to a handle the engine can drive.
///
/// Fixed priority: direct pool, then shim-wrapped connect spec, then the
/// unsupported branch carrying the connection's concrete type name. No
/// database I/O happens on any path.
pub(crate) fn resolve_sql_handle(
    conn: &dyn DatabaseConnection,
) -> MigrationResult<ResolvedHandle> {
    let Some(provider) = conn.sql_capability() else {
        return Err(MigrationError::UnsupportedConnectionKind(conn.kind_name()));
    };

    match provider.sql_handle() {
        SqlHandle::Pool(pool) => {
            tracing::debug!(kind = conn.kind_name(), "resolved direct sqlx pool handle");
            Ok(ResolvedHandle::Direct(pool.clone()))
        }
        SqlHandle::ConnectSpec(spec) => {
            // Lazy: no connection is made until the engine first uses it.
            let pool = PgPool::connect_lazy(spec).map_err(|e| {
                MigrationError::SessionConstructionFailed(format!(
                    "invalid connect spec for shim pool: {e}"
                ))
            })?;
            tracing::debug!(kind = conn.kind_name(), "synthesized shim pool handle");
            Ok(ResolvedHandle::Shimmed(pool))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OpaqueConnection;

    #[async_trait]
    impl DatabaseConnection for OpaqueConnection {
        async fn execute(&self, _sql: &str) -> Result<u64, ConnectionError> {
            Ok(0)
        }

        async fn query_row(&self, _sql: &str) -> Result<Option<String>, ConnectionError> {
            Ok(None)
        }

        fn kind_name(&self) -> &'static str {
            std::any::type_name::<Self>()
        }
    }

    struct SpecConnection {
        spec: String,
    }

    #[async_trait]
    impl DatabaseConnection for SpecConnection {
        async fn execute(&self, _sql: &str) -> Result<u64, ConnectionError> {
            Ok(0)
        }

        async fn query_row(&self, _sql: &str) -> Result<Option<String>, ConnectionError> {
            Ok(None)
        }

        fn kind_name(&self) -> &'static str {
            std::any::type_name::<Self>()
        }

        fn sql_capability(&self) -> Option<&dyn SqlHandleProvider> {
            Some(self)
        }
    }

    impl SqlHandleProvider for SpecConnection {
        fn sql_handle(&self) -> SqlHandle<'_> {
            SqlHandle::ConnectSpec(&self.spec)
        }
    }

    #[test]
    fn capability_less_connection_is_unsupported() {
        let conn = OpaqueConnection;
        let err = resolve_sql_handle(&conn).unwrap_err();
        match err {
            MigrationError::UnsupportedConnectionKind(kind) => {
                assert!(kind.contains("OpaqueConnection"), "got {kind}");
            }
            other => panic!("expected UnsupportedConnectionKind, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn direct_pool_resolves_without_shim() {
        // Lazy pool: nothing connects during resolution.
        let pool = PgPool::connect_lazy("postgres://postgres@localhost:5432/unused")
            .expect("lazy pool");
        let conn = crate::providers::PgPoolConnection::new(pool);
        let handle = resolve_sql_handle(&conn).expect("direct shape must resolve");
        assert!(!handle.is_shimmed());
    }

    #[tokio::test]
    async fn connect_spec_resolves_through_shim() {
        let conn = SpecConnection {
            spec: "postgres://postgres@localhost:5432/unused".into(),
        };
        let handle = resolve_sql_handle(&conn).expect("pool shape must resolve");
        assert!(handle.is_shimmed());
    }

    #[test]
    fn malformed_connect_spec_fails_session_construction() {
        let conn = SpecConnection {
            spec: "not-a-connect-spec".into(),
        };
        let err = resolve_sql_handle(&conn).unwrap_err();
        assert!(matches!(err, MigrationError::SessionConstructionFailed(_)));
    }
}
