//! Scenario with stdin on a fresh pty and stdout redirected to a file.

use tracing::{debug, info, warn};

use super::{ScenarioError, ScenarioOutcome};
use crate::capture_file::CaptureFile;
use crate::compare::compare;
use crate::launch::{LaunchCommand, Launcher, RedirectionPolicy};
use crate::outcome::{CapturedOutcome, ExpectedOutcome};
use crate::pty::{self, PtyProvision, SymbolResolver};

/// Attaches this process to a new pty, then runs the child with stdout sent
/// to `stdout_file`.
///
/// Stderr is inherited rather than captured, so the captured outcome carries
/// an empty stderr.
#[derive(Clone, Debug)]
pub struct RedirectOutOnly {
    command: LaunchCommand,
    expected: ExpectedOutcome,
    stdout_file: CaptureFile,
}

impl RedirectOutOnly {
    /// Creates the scenario.
    #[must_use]
    pub const fn new(
        command: LaunchCommand,
        expected: ExpectedOutcome,
        stdout_file: CaptureFile,
    ) -> Self {
        Self {
            command,
            expected,
            stdout_file,
        }
    }

    /// Runs the scenario.
    ///
    /// The capture file is removed first. When either pty primitive is
    /// missing the scenario stops with [`ScenarioOutcome::Skipped`] and no
    /// child is launched.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when a native call, the launch, the capture
    /// file, or the comparison fails.
    pub fn run<L, S>(&self, launcher: &L, resolver: &S) -> Result<ScenarioOutcome, ScenarioError>
    where
        L: Launcher + ?Sized,
        S: SymbolResolver + ?Sized,
    {
        if self.stdout_file.remove_if_exists()? {
            debug!(path = %self.stdout_file.path(), "removed stale stdout file");
        }

        // The parent end is never closed: this process now leads the session
        // owning the terminal, and closing it would hang the terminal up.
        let _parent = match pty::provision(resolver)? {
            PtyProvision::Attached(terminal) => terminal.hold_for_process(),
            PtyProvision::Skipped(missing) => {
                warn!(symbol = missing.name, "skipping redirect-out-only");
                return Ok(ScenarioOutcome::Skipped(missing));
            }
        };

        let policy = RedirectionPolicy::InheritWithStdoutFile(self.stdout_file.clone());
        let mut handle = launcher.launch(&self.command, &policy)?;
        let exit_code = handle.wait()?;
        let stdout = self.stdout_file.read()?;

        let captured = CapturedOutcome::from_finished(exit_code, stdout, Vec::new());
        compare(&self.expected, &captured)?;
        info!(command = %self.command.command_line(), "redirect-out-only passed");
        Ok(ScenarioOutcome::Passed)
    }
}
