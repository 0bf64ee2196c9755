//! Ignore-pattern filtering.
//!
//! Patterns come from a newline-separated spec file (default
//! `.deployignore` at the source root): one glob per line, `#`-led comments
//! and blank lines skipped. Matching is **basename-only** — a pattern is
//! tested against each entry's raw filename, never against the full relative
//! path — which mirrors typical ignore-file ergonomics. An ignored directory
//! prunes its entire subtree.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::DeployError;

/// Conventional ignore-spec filename looked up at the source root.
pub const DEFAULT_IGNORE_FILE: &str = ".deployignore";

/// A compiled set of ignore globs.
#[derive(Debug)]
pub struct IgnoreFilter {
    set: GlobSet,
    len: usize,
}

impl IgnoreFilter {
    /// A filter that ignores nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            len: 0,
        }
    }

    /// Compile a filter from pattern lines (comments and blanks included —
    /// they are skipped here).
    ///
    /// # Errors
    ///
    /// Returns the underlying [`globset::Error`] when a pattern is malformed.
    pub fn from_lines<'a, I>(lines: I) -> Result<Self, globset::Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut len = 0;
        for line in lines {
            let pattern = line.trim();
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }
            builder.add(Glob::new(pattern)?);
            len += 1;
        }
        Ok(Self {
            set: builder.build()?,
            len,
        })
    }

    /// Load the spec file at `path`.
    ///
    /// A missing file is tolerated (empty filter) unless the path was given
    /// explicitly on the command line, in which case — like any other read
    /// failure or a malformed pattern — the whole run must abort, since
    /// ignore behaviour shapes the entire plan.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::IgnoreFileUnreadable`] as described above.
    pub fn load(path: &Path, explicit: bool) -> Result<Self, DeployError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                return Ok(Self::empty());
            }
            Err(e) => {
                return Err(DeployError::IgnoreFileUnreadable {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };
        Self::from_lines(contents.lines()).map_err(|e| DeployError::IgnoreFileUnreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Whether an entry with this basename should be skipped.
    #[must_use]
    pub fn is_ignored(&self, basename: &str) -> bool {
        self.set.is_match(basename)
    }

    /// Number of compiled patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the filter holds no patterns at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
