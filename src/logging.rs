//! Terminal and file logging.
//!
//! All messages are always written to a persistent log file at
//! `$XDG_CACHE_HOME/dotdeploy/deploy.log` (default
//! `~/.cache/dotdeploy/deploy.log`) with timestamps and ANSI codes stripped,
//! regardless of the verbose flag. Per-action detail (`debug`) reaches the
//! terminal only with `--verbose`; dry-run lines are always shown and carry a
//! distinguishing marker so preview output cannot be mistaken for applied
//! changes.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Logger with verbosity and dry-run awareness.
#[derive(Debug)]
pub struct Logger {
    verbose: bool,
    log_file: Option<PathBuf>,
}

/// Return the log file path under `$XDG_CACHE_HOME/dotdeploy/` (or `~/.cache/dotdeploy/`).
fn log_file_path() -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cache")
        });
    let dir = cache_dir.join("dotdeploy");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("deploy.log"))
}

/// Strip ANSI escape sequences from a string.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm' (end of SGR sequence)
            for inner in chars.by_ref() {
                if inner == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl Logger {
    /// Create a logger, truncating the log file (new run = fresh log).
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        let log_file = log_file_path();

        if let Some(ref path) = log_file {
            let header = format!(
                "==========================================\n\
                 dotdeploy {} {}\n\
                 ==========================================\n",
                env!("CARGO_PKG_VERSION"),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            );
            let _ = fs::write(path, header);
        }

        Self { verbose, log_file }
    }

    /// Whether per-action output is enabled.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Append a line to the persistent log file.
    fn write_to_file(&self, level: &str, msg: &str) {
        if let Some(ref path) = self.log_file
            && let Ok(mut f) = fs::OpenOptions::new().append(true).open(path)
        {
            let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let clean = strip_ansi(msg);
            let _ = writeln!(f, "{ts} {level} {clean}");
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// An error that will fail the run.
    pub fn error(&self, msg: &str) {
        eprintln!("\x1b[31mERROR\x1b[0m {msg}");
        self.write_to_file("ERR", msg);
    }

    /// A top-level stage heading.
    pub fn stage(&self, msg: &str) {
        println!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m");
        self.write_to_file("STG", msg);
    }

    /// An unconditional informational line.
    pub fn info(&self, msg: &str) {
        println!("  {msg}");
        self.write_to_file("INF", msg);
    }

    /// Per-action detail; shown on the terminal only when verbose.
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            println!("  \x1b[2m{msg}\x1b[0m");
        }
        // Always log debug to file, even when not verbose on terminal
        self.write_to_file("DBG", msg);
    }

    /// A mutation that was planned but not performed.
    pub fn dry_run(&self, msg: &str) {
        println!("  \x1b[33m[DRY RUN]\x1b[0m {msg}");
        self.write_to_file("DRY", msg);
    }
}
