//! The two console-binding scenarios.
//!
//! - [`RedirectAll`]: every standard stream of the child is detached from any
//!   terminal; stdout and stderr are pipes drained concurrently.
//! - [`RedirectOutOnly`]: this process first takes a fresh pty as its
//!   controlling terminal, then launches the child with stdin and stderr
//!   inherited and stdout sent to a file.
//!
//! Each scenario is independent. A failure aborts only the scenario that
//! raised it and nothing is retried.

use thiserror::Error;

mod redirect_all;
mod redirect_out_only;

pub use redirect_all::RedirectAll;
pub use redirect_out_only::RedirectOutOnly;

use crate::capture_file::CaptureFileError;
use crate::compare::MismatchError;
use crate::drain::DrainError;
use crate::launch::LaunchError;
use crate::pty::{MissingSymbol, PtyError};

/// Text the probe writes through its console.
pub const DEFAULT_OUTPUT: &str = "Hello!";

/// Non-failing end states of a scenario.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScenarioOutcome {
    /// The captured outcome matched the expectation.
    Passed,
    /// A required platform capability is absent.
    Skipped(MissingSymbol),
}

/// Hard scenario failures.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ScenarioError {
    /// The child could not be started or reaped.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// A drain worker failed.
    #[error(transparent)]
    Drain(#[from] DrainError),
    /// The launcher returned a handle without the expected pipe.
    #[error("child {stream} was not piped")]
    StreamNotPiped {
        /// Stream name.
        stream: &'static str,
    },
    /// A native pty call failed.
    #[error(transparent)]
    Pty(#[from] PtyError),
    /// The stdout capture file could not be prepared or read.
    #[error(transparent)]
    CaptureFile(#[from] CaptureFileError),
    /// The captured outcome differs from the expectation.
    #[error(transparent)]
    Mismatch(#[from] MismatchError),
}
