//! Dotfile deployment engine.
//!
//! Deploys a tree of configuration files from a source repository into a
//! destination directory (typically `$HOME`): the relative directory
//! structure is mirrored and every accepted file becomes an absolute
//! symbolic link back into the repository. Files may carry a variant tag
//! (`name<user>`, `name<host>`, `name<user@host>`) selecting them for a
//! specific context; an ignore file filters entries out by glob.
//!
//! The public API is organised into small layers:
//!
//! - **[`matcher`]** — variant-tag parsing and precedence (pure)
//! - **[`ignore`]** — glob-based ignore filtering
//! - **[`context`]** — immutable per-run configuration
//! - **[`engine`]** — tree walk, planning and filesystem mutation
//! - **[`commands`]** — one-run orchestration and exit-status policy
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod context;
pub mod engine;
pub mod error;
pub mod ignore;
pub mod logging;
pub mod matcher;
