//! Top-level orchestration of one deployment run.
//!
//! Resolves the [`DeployContext`] (structural errors abort here, before any
//! mutation), drives the engine, prints the summary, and maps recorded
//! per-entry errors to a non-zero exit status.

use anyhow::Result;

use crate::cli::Cli;
use crate::context::DeployContext;
use crate::engine::Deployer;
use crate::logging::Logger;

/// Run a deployment as described by the parsed CLI arguments.
///
/// # Errors
///
/// Returns an error when the context cannot be resolved (invalid source
/// root, unusable ignore file, undeterminable destination or identity), or
/// when any entry failed during the walk — in both cases the process exits
/// non-zero.
pub fn run(args: &Cli, log: &Logger) -> Result<()> {
    let ctx = DeployContext::resolve(args)?;

    log.stage(&format!(
        "Deploying {} -> {}",
        ctx.source_root.display(),
        ctx.dest_root.display()
    ));
    log.debug(&format!("context: {}@{}", ctx.username, ctx.hostname));
    if !ctx.ignore.is_empty() {
        log.debug(&format!(
            "ignore: {} patterns from {}",
            ctx.ignore.len(),
            ctx.ignore_path.display()
        ));
    }
    if ctx.dry_run {
        log.info("dry run: no changes will be made");
    }

    let report = Deployer::new(&ctx, log).run();

    log.stage("Summary");
    let failed = report.errors.len();
    if ctx.dry_run {
        log.info(&format!(
            "{} would link, {} already linked, {} skipped, {failed} failed (dry run)",
            report.created, report.unchanged, report.skipped
        ));
    } else {
        log.info(&format!(
            "{} linked, {} already linked, {} skipped, {failed} failed",
            report.created, report.unchanged, report.skipped
        ));
    }

    if report.has_errors() {
        anyhow::bail!("{failed} entries failed to deploy");
    }
    Ok(())
}
