//! Binary entry point for the `conbind` harness.
//!
//! Each invocation runs one scenario. Passed and skipped scenarios exit with
//! status 0; any failure is written to stderr and exits with status 1.

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::AsFd;
use std::process;
use std::sync::Mutex;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use conbind::{
    ConfigError, DefaultNamespace, HarnessConfig, ProcessLauncher, ScenarioError, ScenarioOutcome,
};

mod cli;

use cli::{Cli, ScenarioArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{scenario} failed: {source}")]
    Scenario {
        scenario: &'static str,
        source: ScenarioError,
    },
}

fn main() {
    // redirect-out-only points fd 2 at its pty, so diagnostics go to a copy
    // of the stderr this process was started with.
    let diagnostics = original_stderr().ok();
    init_tracing(diagnostics.as_ref());
    let cli = Cli::parse();
    let exit_code = match dispatch(cli) {
        Ok(_) => 0,
        Err(err) => {
            report_error(diagnostics.as_ref(), &err);
            1
        }
    };

    process::exit(exit_code);
}

/// Duplicates the current stderr. The copy is close-on-exec, so children
/// never inherit it.
fn original_stderr() -> io::Result<File> {
    let fd = io::stderr().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}

fn init_tracing(diagnostics: Option<&File>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let writer = match diagnostics.and_then(|file| file.try_clone().ok()) {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(io::stderr),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(writer),
        )
        .init();
}

fn dispatch(cli: Cli) -> Result<ScenarioOutcome, CliError> {
    match cli {
        Cli::RedirectAll(args) => {
            let scenario = load_config(args)?.redirect_all()?;
            scenario
                .run(&ProcessLauncher)
                .map_err(|source| CliError::Scenario {
                    scenario: "redirect-all",
                    source,
                })
        }
        Cli::RedirectOutOnly(args) => {
            let scenario = load_config(args)?.redirect_out_only()?;
            scenario
                .run(&ProcessLauncher, &DefaultNamespace::new())
                .map_err(|source| CliError::Scenario {
                    scenario: "redirect-out-only",
                    source,
                })
        }
    }
}

fn load_config(args: ScenarioArgs) -> Result<HarnessConfig, CliError> {
    let config = HarnessConfig::load_without_cli_args()?;
    Ok(apply_overrides(config, args))
}

fn apply_overrides(mut config: HarnessConfig, args: ScenarioArgs) -> HarnessConfig {
    if let Some(test_root) = args.test_root {
        config.test_root = Some(test_root);
    }
    if let Some(expect) = args.expect {
        config.expected_output = expect;
    }
    config
}

fn report_error(diagnostics: Option<&File>, err: &CliError) {
    match diagnostics {
        Some(file) => write_error(file, err),
        None => write_error(io::stderr(), err),
    }
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
