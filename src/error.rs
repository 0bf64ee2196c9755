//! Domain-specific error types for the deployment engine.
//!
//! Structured errors via [`thiserror`]; command handlers at the CLI boundary
//! convert them to [`anyhow::Error`] with the standard `?` operator.
//!
//! Two propagation classes:
//!
//! - **structural** ([`DeployError::InvalidSourceRoot`],
//!   [`DeployError::IgnoreFileUnreadable`]) — abort before any mutation,
//!   since they invalidate the entire plan;
//! - **per-entry** (everything else) — recorded in the run report, the walk
//!   continues, and the process exits non-zero at the end.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while planning or performing a deployment.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Two or more variants of one base name are active at the same
    /// specificity tier. The group is skipped; the run continues.
    #[error("ambiguous variants for '{base}': {}", .candidates.join(", "))]
    AmbiguousVariant {
        /// Destination-relative path of the contested base name.
        base: String,
        /// Raw basenames of the tied entries.
        candidates: Vec<String>,
    },

    /// Something other than the correct symlink occupies a planned
    /// destination path and `--force` was not given.
    #[error("destination already exists: {path} (pass --force to overwrite)")]
    DestinationExists {
        /// The occupied destination path.
        path: PathBuf,
    },

    /// An explicitly requested or malformed ignore file could not be used.
    /// Fatal: ignore behaviour affects the whole plan.
    #[error("cannot use ignore file {path}: {message}")]
    IgnoreFileUnreadable {
        /// Path of the ignore-spec file.
        path: PathBuf,
        /// What went wrong (I/O failure or a malformed glob pattern).
        message: String,
    },

    /// The source root does not exist or is not a directory. Fatal.
    #[error("invalid source root {path}: {message}")]
    InvalidSourceRoot {
        /// The offending path as given on the command line.
        path: PathBuf,
        /// Why it cannot be used.
        message: String,
    },

    /// A source entry whose file name is not valid UTF-8. Tag parsing and
    /// glob matching operate on strings, and a lossily converted name would
    /// link to a path that does not exist, so the entry is recorded as a
    /// failure instead of deployed.
    #[error("file name is not valid UTF-8: {}", .path.display())]
    NonUtf8Name {
        /// Path of the undeployable entry.
        path: PathBuf,
    },

    /// An I/O failure on a single entry (directory creation, link creation,
    /// removal, traversal). The run continues with remaining entries.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        /// Path of the entry that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
