//! Immutable per-run configuration.
//!
//! Built once from CLI input plus environment defaults and consumed
//! read-only by the engine. The operating-environment queries (current
//! user, machine hostname, home directory) happen only here, so the matcher
//! and engine stay pure and testable with explicit values.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::Cli;
use crate::error::DeployError;
use crate::ignore::{DEFAULT_IGNORE_FILE, IgnoreFilter};

/// Configuration for one deployment run.
#[derive(Debug)]
pub struct DeployContext {
    /// Canonical absolute root of the source tree.
    pub source_root: PathBuf,
    /// Absolute root the structure is mirrored into.
    pub dest_root: PathBuf,
    /// Username matched against variant tags.
    pub username: String,
    /// Hostname matched against variant tags.
    pub hostname: String,
    /// Compiled ignore patterns.
    pub ignore: IgnoreFilter,
    /// Absolute path of the ignore-spec file, excluded from deployment.
    pub ignore_path: PathBuf,
    /// Report intended actions without mutating the filesystem.
    pub dry_run: bool,
    /// Allow replacing pre-existing destination entries.
    pub force: bool,
}

impl DeployContext {
    /// Resolve a context from CLI arguments and environment defaults.
    ///
    /// # Errors
    ///
    /// Fails before any mutation when the source root is missing or not a
    /// directory, when the destination/home or user/host identity cannot be
    /// determined, or when the ignore file is explicitly given but
    /// unreadable or malformed.
    pub fn resolve(args: &Cli) -> Result<Self> {
        let source_root =
            dunce::canonicalize(&args.source).map_err(|e| DeployError::InvalidSourceRoot {
                path: args.source.clone(),
                message: e.to_string(),
            })?;
        if !source_root.is_dir() {
            return Err(DeployError::InvalidSourceRoot {
                path: args.source.clone(),
                message: "not a directory".to_string(),
            }
            .into());
        }

        let dest = match &args.destination {
            Some(dest) => dest.clone(),
            None => dirs::home_dir().context("cannot determine the home directory")?,
        };
        let dest_root = std::path::absolute(&dest)
            .with_context(|| format!("cannot resolve destination: {}", dest.display()))?;

        let username = args.username.clone().unwrap_or_else(whoami::username);
        let hostname = match &args.hostname {
            Some(hostname) => hostname.clone(),
            None => hostname::get()
                .context("cannot determine the machine hostname")?
                .to_string_lossy()
                .into_owned(),
        };

        let explicit = args.ignorefile.is_some();
        let ignore_path = source_root.join(
            args.ignorefile
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_IGNORE_FILE)),
        );
        let ignore = IgnoreFilter::load(&ignore_path, explicit)?;

        Ok(Self {
            source_root,
            dest_root,
            username,
            hostname,
            ignore,
            ignore_path,
            dry_run: args.dry,
            force: args.force,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("dotdeploy").chain(args.iter().copied()))
    }

    #[test]
    fn resolve_canonicalizes_source_root() {
        let src = tempfile::tempdir().expect("create temp dir");
        let dst = tempfile::tempdir().expect("create temp dir");
        let cli = parse(&[
            &src.path().display().to_string(),
            &dst.path().display().to_string(),
        ]);
        let ctx = DeployContext::resolve(&cli).expect("resolve context");
        assert!(ctx.source_root.is_absolute());
        assert!(ctx.dest_root.is_absolute());
    }

    #[test]
    fn resolve_rejects_missing_source_root() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("nope");
        let cli = parse(&[&missing.display().to_string()]);
        let err = DeployContext::resolve(&cli).expect_err("missing source must fail");
        assert!(err.to_string().contains("invalid source root"));
    }

    #[test]
    fn resolve_rejects_file_as_source_root() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let file = dir.path().join("plain");
        std::fs::write(&file, "x").expect("write file");
        let cli = parse(&[&file.display().to_string()]);
        assert!(DeployContext::resolve(&cli).is_err());
    }

    #[test]
    fn resolve_defaults_username_and_hostname() {
        let src = tempfile::tempdir().expect("create temp dir");
        let dst = tempfile::tempdir().expect("create temp dir");
        let cli = parse(&[
            &src.path().display().to_string(),
            &dst.path().display().to_string(),
        ]);
        let ctx = DeployContext::resolve(&cli).expect("resolve context");
        assert!(!ctx.username.is_empty());
        assert!(!ctx.hostname.is_empty());
    }

    #[test]
    fn resolve_honours_identity_overrides() {
        let src = tempfile::tempdir().expect("create temp dir");
        let dst = tempfile::tempdir().expect("create temp dir");
        let cli = parse(&[
            &src.path().display().to_string(),
            &dst.path().display().to_string(),
            "--username",
            "archie",
            "--hostname",
            "tower",
        ]);
        let ctx = DeployContext::resolve(&cli).expect("resolve context");
        assert_eq!(ctx.username, "archie");
        assert_eq!(ctx.hostname, "tower");
    }

    #[test]
    fn resolve_loads_default_ignore_file() {
        let src = tempfile::tempdir().expect("create temp dir");
        let dst = tempfile::tempdir().expect("create temp dir");
        std::fs::write(src.path().join(DEFAULT_IGNORE_FILE), "*.log\n").expect("write ignore");
        let cli = parse(&[
            &src.path().display().to_string(),
            &dst.path().display().to_string(),
        ]);
        let ctx = DeployContext::resolve(&cli).expect("resolve context");
        assert!(ctx.ignore.is_ignored("debug.log"));
    }

    #[test]
    fn resolve_fails_on_missing_explicit_ignore_file() {
        let src = tempfile::tempdir().expect("create temp dir");
        let dst = tempfile::tempdir().expect("create temp dir");
        let cli = parse(&[
            &src.path().display().to_string(),
            &dst.path().display().to_string(),
            "--ignorefile",
            "custom.ignore",
        ]);
        let err = DeployContext::resolve(&cli).expect_err("explicit ignore file must exist");
        assert!(err.to_string().contains("ignore file"));
    }

    #[test]
    fn resolve_joins_relative_ignorefile_to_source_root() {
        let src = tempfile::tempdir().expect("create temp dir");
        let dst = tempfile::tempdir().expect("create temp dir");
        std::fs::write(src.path().join("custom.ignore"), "*.bak\n").expect("write ignore");
        let cli = parse(&[
            &src.path().display().to_string(),
            &dst.path().display().to_string(),
            "--ignorefile",
            "custom.ignore",
        ]);
        let ctx = DeployContext::resolve(&cli).expect("resolve context");
        assert!(ctx.ignore.is_ignored("old.bak"));
        assert!(ctx.ignore_path.ends_with("custom.ignore"));
    }
}
