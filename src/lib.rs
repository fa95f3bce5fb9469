//! # pgtemplate-migrate: migration execution for template databases
//!
//! Bridges the pluggable connection abstraction of a template-database
//! provisioning framework to the sqlx migration engine. Given an
//! already-open connection from any supported provider,
//! [`MigrationRunner::run_migrations`] resolves it to a handle the engine
//! can drive and applies every pending migration script, exactly once, up
//! to the latest version. This is the step that turns a fresh template
//! database into one ready for cloning into test databases.
//!
//! The runner keeps no state between calls and no global configuration:
//! dialect, source, and engine options travel with each runner value, so
//! concurrent template bootstraps never interfere.

pub mod config;
pub mod connection;
pub mod error;
pub mod providers;
pub mod runner;

mod session;

// Re-export the public surface at the crate root.
pub use config::{Dialect, EngineOption, MigrationReport, MigrationSource};
pub use connection::{DatabaseConnection, SqlHandle, SqlHandleProvider};
pub use error::{ConnectionError, MigrationError, MigrationResult};
pub use providers::{PgClientConnection, PgPoolConnection};
pub use runner::MigrationRunner;
