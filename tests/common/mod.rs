// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed source tree and a fluent builder so
// each integration test can set up an isolated environment without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use dotdeploy::context::DeployContext;
use dotdeploy::engine::{DeployReport, Deployer};
use dotdeploy::ignore::IgnoreFilter;
use dotdeploy::logging::Logger;

/// An isolated source/destination pair backed by [`tempfile::TempDir`]s.
///
/// Both directories are deleted automatically when dropped.
pub struct TestRepo {
    /// Temporary source tree to deploy from.
    pub source: tempfile::TempDir,
    /// Temporary destination tree to deploy into.
    pub destination: tempfile::TempDir,
}

impl TestRepo {
    /// Create an empty source/destination pair.
    pub fn new() -> Self {
        Self {
            source: tempfile::tempdir().expect("create source temp dir"),
            destination: tempfile::tempdir().expect("create destination temp dir"),
        }
    }

    /// Absolute path of `rel` inside the source tree.
    pub fn source_path(&self, rel: &str) -> PathBuf {
        self.source.path().join(rel)
    }

    /// Absolute path of `rel` inside the destination tree.
    pub fn dest_path(&self, rel: &str) -> PathBuf {
        self.destination.path().join(rel)
    }

    /// Build a context over this pair for the given identity.
    ///
    /// The ignore filter is loaded from `.deployignore` at the source root
    /// if one was written, mirroring the default CLI behaviour.
    pub fn context(&self, username: &str, hostname: &str) -> DeployContext {
        let ignore_path = self.source_path(".deployignore");
        let ignore = IgnoreFilter::load(&ignore_path, false).expect("load ignore file");
        DeployContext {
            source_root: self.source.path().to_path_buf(),
            dest_root: self.destination.path().to_path_buf(),
            username: username.to_string(),
            hostname: hostname.to_string(),
            ignore,
            ignore_path,
            dry_run: false,
            force: false,
        }
    }

    /// Run a deployment over this pair and return the report.
    pub fn deploy(&self, ctx: &DeployContext) -> DeployReport {
        let log = Logger::new(false);
        Deployer::new(ctx, &log).run()
    }

    /// Recursively list every entry under `root`, as sorted relative paths.
    ///
    /// Symlinks are listed but never followed, so the listing is a faithful
    /// snapshot for before/after comparisons.
    pub fn list_tree(root: &Path) -> Vec<PathBuf> {
        fn visit(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
            for entry in std::fs::read_dir(dir).expect("read dir") {
                let entry = entry.expect("dir entry");
                let path = entry.path();
                out.push(path.strip_prefix(root).expect("under root").to_path_buf());
                let ft = entry.file_type().expect("file type");
                if ft.is_dir() && !ft.is_symlink() {
                    visit(&path, root, out);
                }
            }
        }
        let mut out = Vec::new();
        visit(root, root, &mut out);
        out.sort();
        out
    }
}

/// Fluent builder for [`TestRepo`].
pub struct TestRepoBuilder {
    repo: TestRepo,
}

impl TestRepoBuilder {
    /// Begin building a new empty pair.
    pub fn new() -> Self {
        Self {
            repo: TestRepo::new(),
        }
    }

    /// Write a payload file at `rel` inside the source tree, creating
    /// parent directories as needed.
    pub fn with_file(self, rel: &str, contents: &str) -> Self {
        let path = self.repo.source_path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create source parent");
        }
        std::fs::write(&path, contents).expect("write source file");
        self
    }

    /// Create an (empty) directory at `rel` inside the source tree.
    pub fn with_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.repo.source_path(rel)).expect("create source dir");
        self
    }

    /// Write `.deployignore` at the source root.
    pub fn with_ignore_file(self, contents: &str) -> Self {
        std::fs::write(self.repo.source_path(".deployignore"), contents)
            .expect("write ignore file");
        self
    }

    /// Create a symlink at `rel` in the source tree pointing to `target`
    /// (also source-relative). Unix only.
    #[cfg(unix)]
    pub fn with_source_symlink(self, rel: &str, target: &str) -> Self {
        std::os::unix::fs::symlink(self.repo.source_path(target), self.repo.source_path(rel))
            .expect("create source symlink");
        self
    }

    /// Write a pre-existing regular file at `rel` inside the destination.
    pub fn with_existing_dest_file(self, rel: &str, contents: &str) -> Self {
        let path = self.repo.dest_path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create destination parent");
        }
        std::fs::write(&path, contents).expect("write destination file");
        self
    }

    /// Finish building and return the configured pair.
    pub fn build(self) -> TestRepo {
        self.repo
    }
}
