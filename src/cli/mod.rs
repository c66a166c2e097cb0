//! Command-line interface definitions for the `conbind` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `conbind` binary.
#[derive(Debug, Parser)]
#[command(
    name = "conbind",
    about = "Verify that a runtime's console binds to the real stdout",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Run the child with every standard stream detached from a terminal.
    #[command(
        name = "redirect-all",
        about = "Run the launcher with stdin closed and stdout/stderr piped"
    )]
    RedirectAll(ScenarioArgs),
    /// Attach this process to a fresh pty and redirect only the child's stdout.
    ///
    /// The scenario is skipped, with exit status 0, when `openpty` or
    /// `login_tty` cannot be resolved on this platform. Once the pty is
    /// attached this process's own stderr points at it, so only the exit
    /// status reports the result.
    #[command(
        name = "redirect-out-only",
        about = "Run the launcher on a fresh pty with stdout sent to a file"
    )]
    RedirectOutOnly(ScenarioArgs),
}

/// Arguments shared by both scenario subcommands.
#[derive(Debug, Default, Parser)]
pub(crate) struct ScenarioArgs {
    /// Override the runtime test root for this run.
    ///
    /// Takes precedence over `CONBIND_TEST_ROOT` and `test_root` in
    /// `conbind.toml`.
    #[arg(long, value_name = "DIR")]
    pub(crate) test_root: Option<String>,
    /// Override the text the entry point is expected to print.
    #[arg(long, value_name = "TEXT")]
    pub(crate) expect: Option<String>,
}
