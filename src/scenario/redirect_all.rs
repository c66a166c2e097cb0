//! Scenario with every child stream detached from a terminal.

use tracing::{debug, info};

use super::{ScenarioError, ScenarioOutcome};
use crate::compare::compare;
use crate::drain::{DrainError, DrainWorker};
use crate::launch::{LaunchCommand, Launcher, RedirectionPolicy};
use crate::outcome::{CapturedOutcome, ExpectedOutcome};

/// Runs the child with piped stdout/stderr and compares all three fields.
#[derive(Clone, Debug)]
pub struct RedirectAll {
    command: LaunchCommand,
    expected: ExpectedOutcome,
}

impl RedirectAll {
    /// Creates the scenario.
    #[must_use]
    pub const fn new(command: LaunchCommand, expected: ExpectedOutcome) -> Self {
        Self { command, expected }
    }

    /// Launches the child, drains both pipes, and compares the result.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] on launch, drain or comparison failure.
    pub fn run<L: Launcher + ?Sized>(
        &self,
        launcher: &L,
    ) -> Result<ScenarioOutcome, ScenarioError> {
        let captured = self.capture(launcher)?;
        compare(&self.expected, &captured)?;
        info!(command = %self.command.command_line(), "redirect-all passed");
        Ok(ScenarioOutcome::Passed)
    }

    /// Launches the child and returns what it produced, once it has exited
    /// and both drain workers have joined.
    ///
    /// Once the child is running it is always reaped, and every worker that
    /// started is joined, before any error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] on launch or drain failure.
    pub fn capture<L: Launcher + ?Sized>(
        &self,
        launcher: &L,
    ) -> Result<CapturedOutcome, ScenarioError> {
        let mut handle = launcher.launch(&self.command, &RedirectionPolicy::PipeBoth)?;
        let stdout_worker = handle
            .take_stdout()
            .map(|stdout| DrainWorker::spawn("stdout", stdout));
        let stderr_worker = handle
            .take_stderr()
            .map(|stderr| DrainWorker::spawn("stderr", stderr));

        let exit_code = handle.wait();
        let stdout_bytes = finish("stdout", stdout_worker);
        let stderr_bytes = finish("stderr", stderr_worker);
        debug!(pid = handle.id(), ?exit_code, "child exited and drains joined");

        let stdout = stdout_bytes?;
        let stderr = stderr_bytes?;
        Ok(CapturedOutcome::from_finished(exit_code?, stdout, stderr))
    }
}

/// Joins a worker, or explains why there is none.
fn finish(
    stream: &'static str,
    worker: Option<Result<DrainWorker, DrainError>>,
) -> Result<Vec<u8>, ScenarioError> {
    match worker {
        Some(Ok(worker)) => Ok(worker.join()?),
        Some(Err(err)) => Err(err.into()),
        None => Err(ScenarioError::StreamNotPiped { stream }),
    }
}
