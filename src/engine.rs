//! The deployment engine.
//!
//! Walks the source tree depth-first, groups sibling entries by tag-stripped
//! base name, selects the active variant per group, and materialises each
//! accepted entry as an absolute symlink under the destination root. Errors
//! on individual entries are recorded and the walk continues; only a failed
//! destination-directory creation abandons the subtree below it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::DeployContext;
use crate::error::DeployError;
use crate::logging::Logger;
use crate::matcher;

/// Outcome counters and per-entry failures for one run.
#[derive(Debug, Default)]
pub struct DeployReport {
    /// Links created (or, in a dry run, links that would be created).
    pub created: u32,
    /// Destinations that were already the correct symlink.
    pub unchanged: u32,
    /// Entries skipped: ignored, or variant groups with no active entry.
    pub skipped: u32,
    /// Per-entry errors accumulated during the walk.
    pub errors: Vec<DeployError>,
}

impl DeployReport {
    /// Whether any per-entry error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Single-pass deployment over one [`DeployContext`].
#[derive(Debug)]
pub struct Deployer<'a> {
    ctx: &'a DeployContext,
    log: &'a Logger,
    report: DeployReport,
}

impl<'a> Deployer<'a> {
    /// Create a deployer over an immutable context.
    #[must_use]
    pub fn new(ctx: &'a DeployContext, log: &'a Logger) -> Self {
        Self {
            ctx,
            log,
            report: DeployReport::default(),
        }
    }

    /// Walk the source tree and perform (or preview) every planned link.
    #[must_use]
    pub fn run(mut self) -> DeployReport {
        let root = self.ctx.source_root.clone();
        self.walk(&root, Path::new(""));
        self.report
    }

    /// Process one source directory: mirror it at the destination, deploy
    /// its leaf entries, then recurse into real subdirectories.
    fn walk(&mut self, src_dir: &Path, rel: &Path) {
        let ctx = self.ctx;
        let dest_dir = ctx.dest_root.join(rel);
        if !self.ensure_dir(&dest_dir) {
            // Abandon the whole subtree: nothing below can be linked.
            return;
        }

        let entries = match fs::read_dir(src_dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.record(DeployError::Filesystem {
                    path: src_dir.to_path_buf(),
                    source: e,
                });
                return;
            }
        };

        let mut subdirs: Vec<String> = Vec::new();
        let mut leaves: Vec<String> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.record(DeployError::Filesystem {
                        path: src_dir.to_path_buf(),
                        source: e,
                    });
                    continue;
                }
            };
            if entry.path() == ctx.ignore_path {
                // The ignore spec itself is never payload.
                continue;
            }
            // Tag parsing and glob matching need real strings; a lossy
            // conversion would produce a link target that does not exist.
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => {
                    self.record(DeployError::NonUtf8Name { path: entry.path() });
                    continue;
                }
            };
            if ctx.ignore.is_ignored(&name) {
                self.log
                    .debug(&format!("ignoring {}", rel.join(&name).display()));
                self.report.skipped += 1;
                continue;
            }
            match entry.file_type() {
                // Symlinked directories are leaves: linked, never descended.
                Ok(ft) if ft.is_dir() && !ft.is_symlink() => subdirs.push(name),
                Ok(_) => leaves.push(name),
                Err(e) => self.record(DeployError::Filesystem {
                    path: entry.path(),
                    source: e,
                }),
            }
        }
        subdirs.sort();

        let mut groups: BTreeMap<String, Vec<matcher::Variant>> = BTreeMap::new();
        for name in leaves {
            let variant = matcher::resolve(&name, &ctx.username, &ctx.hostname);
            groups.entry(variant.base.clone()).or_default().push(variant);
        }

        for (base, variants) in &groups {
            match matcher::select(variants) {
                Ok(Some(winner)) => self.link(src_dir, rel, &winner.name, base),
                Ok(None) => {
                    self.log.debug(&format!(
                        "no active variant for {}",
                        rel.join(base).display()
                    ));
                    self.report.skipped += 1;
                }
                Err(tied) => self.record(DeployError::AmbiguousVariant {
                    base: rel.join(base).display().to_string(),
                    candidates: tied.iter().map(|v| v.name.clone()).collect(),
                }),
            }
        }

        for name in subdirs {
            self.walk(&src_dir.join(&name), &rel.join(&name));
        }
    }

    /// Make sure the mirror directory exists. Returns `false` when creation
    /// failed (or, in a dry run, would fail) and the subtree must be
    /// abandoned.
    fn ensure_dir(&mut self, dest_dir: &Path) -> bool {
        if dest_dir.is_dir() {
            return true;
        }
        if self.ctx.dry_run {
            // Something other than a directory occupies the path; a real run
            // would fail here, so the preview must too.
            if fs::symlink_metadata(dest_dir).is_ok() {
                self.record(DeployError::Filesystem {
                    path: dest_dir.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "exists and is not a directory",
                    ),
                });
                return false;
            }
            self.log
                .dry_run(&format!("would create directory {}", dest_dir.display()));
            return true;
        }
        match fs::create_dir_all(dest_dir) {
            Ok(()) => {
                self.log
                    .debug(&format!("created directory {}", dest_dir.display()));
                true
            }
            Err(e) => {
                self.record(DeployError::Filesystem {
                    path: dest_dir.to_path_buf(),
                    source: e,
                });
                false
            }
        }
    }

    /// Apply the link protocol for one selected entry.
    fn link(&mut self, src_dir: &Path, rel: &Path, name: &str, base: &str) {
        let ctx = self.ctx;
        let source = src_dir.join(name);
        let dest = ctx.dest_root.join(rel).join(base);

        match fs::symlink_metadata(&dest) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.create(&source, &dest),
            Err(e) => self.record(DeployError::Filesystem {
                path: dest,
                source: e,
            }),
            Ok(meta) => {
                let correct = meta.is_symlink()
                    && fs::read_link(&dest).is_ok_and(|target| paths_equal(&target, &source));
                if correct {
                    self.log.debug(&format!("already linked: {}", dest.display()));
                    self.report.unchanged += 1;
                } else if !ctx.force {
                    self.record(DeployError::DestinationExists { path: dest });
                } else if ctx.dry_run {
                    self.log.dry_run(&format!(
                        "would replace {} -> {}",
                        dest.display(),
                        source.display()
                    ));
                    self.report.created += 1;
                } else if let Err(e) = remove_entry(&dest) {
                    self.record(DeployError::Filesystem {
                        path: dest,
                        source: e,
                    });
                } else {
                    self.log.debug(&format!("removed existing {}", dest.display()));
                    self.create(&source, &dest);
                }
            }
        }
    }

    /// Create (or preview) the symlink `dest -> source`.
    fn create(&mut self, source: &Path, dest: &Path) {
        if self.ctx.dry_run {
            self.log.dry_run(&format!(
                "would link {} -> {}",
                dest.display(),
                source.display()
            ));
            self.report.created += 1;
            return;
        }
        match create_symlink(source, dest) {
            Ok(()) => {
                self.log
                    .debug(&format!("linked {} -> {}", dest.display(), source.display()));
                self.report.created += 1;
            }
            Err(e) => self.record(DeployError::Filesystem {
                path: dest.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Log an error immediately and keep it for the final report.
    fn record(&mut self, err: DeployError) {
        self.log.error(&err.to_string());
        self.report.errors.push(err);
    }
}

/// Compare two paths, normalising the `\\?\` prefix that Windows
/// `read_link` prepends to extended-length paths.
fn paths_equal(a: &Path, b: &Path) -> bool {
    strip_win_prefix(a) == strip_win_prefix(b)
}

fn strip_win_prefix(p: &Path) -> PathBuf {
    let s = p.to_string_lossy();
    s.strip_prefix(r"\\?\")
        .map_or_else(|| p.to_path_buf(), PathBuf::from)
}

/// Create a symlink (platform-specific).
#[cfg(unix)]
fn create_symlink(source: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, dest)
}

/// Create a symlink (platform-specific).
#[cfg(windows)]
fn create_symlink(source: &Path, dest: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, dest)
    } else {
        std::os::windows::fs::symlink_file(source, dest)
    }
}

/// Remove whatever occupies a destination path under `--force`.
///
/// Symlinks are unlinked (with `remove_dir` for Windows directory symlinks,
/// which report `FILE_ATTRIBUTE_DIRECTORY`); real directories are removed
/// recursively; everything else with `remove_file`.
fn remove_entry(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_symlink() {
        if is_dir_like(&meta) {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        }
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Check if metadata represents a directory-like entry.
/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory
/// symlinks, so the raw `FILE_ATTRIBUTE_DIRECTORY` bit is checked instead.
fn is_dir_like(meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
