//! sqlx-backed connection provider (direct shape)

use async_trait::async_trait;
use sqlx::PgPool;

use crate::connection::{DatabaseConnection, SqlHandle, SqlHandleProvider};
use crate::error::ConnectionError;

/// Connection wrapping an externally owned `sqlx::PgPool`.
///
/// Resolution extracts the pool verbatim; nothing is wrapped or
/// allocated. The pool's lifecycle remains with the caller and is never
/// closed here.
pub struct PgPoolConnection {
    pool: PgPool,
}

impl PgPoolConnection {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DatabaseConnection for PgPoolConnection {
    async fn execute(&self, sql: &str) -> Result<u64, ConnectionError> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| ConnectionError(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn query_row(&self, sql: &str) -> Result<Option<String>, ConnectionError> {
        sqlx::query_scalar::<_, String>(sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ConnectionError(e.to_string()))
    }

    fn kind_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn sql_capability(&self) -> Option<&dyn SqlHandleProvider> {
        Some(self)
    }
}

impl SqlHandleProvider for PgPoolConnection {
    fn sql_handle(&self) -> SqlHandle<'_> {
        SqlHandle::Pool(&self.pool)
    }
}
