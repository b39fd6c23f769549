//! cli
//!
//! Command-line interface layer for rdeploy.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise logging
//! - Wire the content source, walker, staging and deployer together
//!
//! # Architecture
//!
//! The CLI layer is thin. Library modules report failures as typed errors;
//! command handlers attach context with `anyhow` and `main` prints the chain.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::ui::output::Verbosity;
use anyhow::Result;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// GitHub token, if any.
    pub token: Option<String>,
    /// API base URL override.
    pub api_base: Option<String>,
    /// Cap on in-flight requests.
    pub max_concurrency: Option<usize>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context {
        token: cli.token.filter(|t| !t.is_empty()),
        api_base: cli.api_base,
        max_concurrency: cli.max_concurrency,
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}

/// `warn` by default, `debug` with `--debug`; `RUST_LOG` overrides both.
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    // A logger may already be installed when embedded in tests.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
