//! Reference connection providers
//!
//! Thin implementations of the consumed connection interface for the two
//! driver families the adapter knows how to resolve. Pool establishment
//! and teardown stay with the caller; these types only wrap handles that
//! already exist.

mod pg_client;
mod pg_pool;

pub use pg_client::PgClientConnection;
pub use pg_pool::PgPoolConnection;
