//! tokio-postgres-backed connection provider (alternate driver family)

use async_trait::async_trait;
use tokio_postgres::Client;

use crate::connection::{DatabaseConnection, SqlHandle, SqlHandleProvider};
use crate::error::ConnectionError;

/// Connection wrapping a `tokio_postgres::Client` from the alternate
/// driver family.
///
/// The engine cannot drive this client directly, so the provider keeps
/// the connect spec the client was opened with and exposes it through the
/// capability interface; the adapter's compatibility shim synthesizes an
/// engine-facing pool from it. The client itself stays untouched and is
/// never closed here.
pub struct PgClientConnection {
    client: Client,
    connect_spec: String,
}

impl PgClientConnection {
    pub fn new(client: Client, connect_spec: impl Into<String>) -> Self {
        Self {
            client,
            connect_spec: connect_spec.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DatabaseConnection for PgClientConnection {
    async fn execute(&self, sql: &str) -> Result<u64, ConnectionError> {
        self.client
            .execute(sql, &[])
            .await
            .map_err(|e| ConnectionError(e.to_string()))
    }

    async fn query_row(&self, sql: &str) -> Result<Option<String>, ConnectionError> {
        let row = self
            .client
            .query_opt(sql, &[])
            .await
            .map_err(|e| ConnectionError(e.to_string()))?;
        row.map(|row| {
            row.try_get::<_, String>(0)
                .map_err(|e| ConnectionError(e.to_string()))
        })
        .transpose()
    }

    fn kind_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn sql_capability(&self) -> Option<&dyn SqlHandleProvider> {
        Some(self)
    }
}

impl SqlHandleProvider for PgClientConnection {
    fn sql_handle(&self) -> SqlHandle<'_> {
        SqlHandle::ConnectSpec(&self.connect_spec)
    }
}
