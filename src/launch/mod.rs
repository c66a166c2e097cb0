//! Child-process launching with explicit stream-redirection policies.
//!
//! The [`Launcher`] trait is the seam between scenarios and the operating
//! system. [`ProcessLauncher`] spawns real processes; tests substitute
//! recording or refusing launchers.

use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

mod types;

pub use types::{LaunchCommand, ProcessHandle, RedirectionPolicy};

use crate::capture_file::CaptureFileError;

/// Errors raised while starting or reaping a child process.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum LaunchError {
    /// Raised when the child cannot be spawned (missing binary, permission
    /// denied, and similar).
    #[error("failed to launch {command}: {message}")]
    Spawn {
        /// Shell-escaped command line.
        command: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the stdout redirection target cannot be created.
    #[error("failed to prepare stdout redirection for {command}: {source}")]
    Redirect {
        /// Shell-escaped command line.
        command: String,
        /// Underlying capture file error.
        source: CaptureFileError,
    },
    /// Raised when waiting for the child fails.
    #[error("failed to wait for {command}: {message}")]
    Wait {
        /// Shell-escaped command line.
        command: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the child ends without an exit code.
    #[error("{command} terminated without an exit code ({status})")]
    MissingExitCode {
        /// Shell-escaped command line.
        command: String,
        /// Rendered exit status, typically naming the signal.
        status: String,
    },
}

/// Abstraction over process creation to support fakes in tests.
pub trait Launcher {
    /// Starts `command` with the given stream wiring.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the child cannot be started.
    fn launch(
        &self,
        command: &LaunchCommand,
        policy: &RedirectionPolicy,
    ) -> Result<ProcessHandle, LaunchError>;
}

/// Launcher that spawns real OS processes.
#[derive(Clone, Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(
        &self,
        command: &LaunchCommand,
        policy: &RedirectionPolicy,
    ) -> Result<ProcessHandle, LaunchError> {
        let command_line = command.command_line();
        let mut process = Command::new(command.program());
        process.args(command.arguments());

        match policy {
            RedirectionPolicy::PipeBoth => {
                process
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
            RedirectionPolicy::InheritWithStdoutFile(file) => {
                let stdout = file.create().map_err(|source| LaunchError::Redirect {
                    command: command_line.clone(),
                    source,
                })?;
                process
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::from(stdout))
                    .stderr(Stdio::inherit());
            }
        }

        let child = process.spawn().map_err(|err| LaunchError::Spawn {
            command: command_line.clone(),
            message: err.to_string(),
        })?;
        debug!(pid = child.id(), command = %command_line, ?policy, "launched child");
        Ok(ProcessHandle::new(command_line, child))
    }
}

#[cfg(test)]
mod tests;
