//! Runner configuration leaf types
//!
//! Everything in this module is cheap and side-effect-free to construct:
//! validation and all I/O are deferred to session construction so
//! configuration values can be built, cloned, and reused without touching
//! any external resource.

use std::fmt;
use std::path::{Path, PathBuf};

/// Handle to a directory of versioned migration scripts.
///
/// Construction performs no I/O; the directory is enumerated when the
/// engine session is built, so a missing or unreadable path surfaces as a
/// runtime error at the point of use, not here.
#[derive(Debug, Clone)]
pub struct MigrationSource {
    path: PathBuf,
}

impl MigrationSource {
    /// Create a source from a filesystem path containing
    /// `<version>_<name>.sql` scripts.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Root of the migration script tree.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// SQL dialect the engine must target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    PostgreSQL,
    MySQL,
    SQLite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "postgres",
            Dialect::MySQL => "mysql",
            Dialect::SQLite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-specific configuration knob, forwarded to the engine session in
/// the order supplied. The adapter accumulates these without interpreting
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOption {
    /// Tolerate applied versions that are missing from the source tree.
    IgnoreMissing(bool),
    /// Hold the engine's advisory lock while applying.
    Locking(bool),
}

/// Result of one migration run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Number of migrations applied by this run
    pub applied_count: usize,
    /// Versions applied by this run, in ascending order
    pub applied_versions: Vec<i64>,
    /// Number of migrations already applied and skipped
    pub skipped_count: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_construction_does_no_io() {
        // A path that does not exist is fine until the session is built.
        let source = MigrationSource::from_path("/definitely/not/a/real/dir");
        assert_eq!(source.path(), Path::new("/definitely/not/a/real/dir"));
    }

    #[test]
    fn dialect_defaults_to_postgres() {
        assert_eq!(Dialect::default(), Dialect::PostgreSQL);
        assert_eq!(Dialect::default().to_string(), "postgres");
    }
}
