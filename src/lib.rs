//! Core library for the `conbind` console-binding harness.
//!
//! The crate launches a runtime's launcher binary under two terminal
//! topologies and checks that whatever the runtime's console prints reaches
//! the process's real stdout:
//!
//! - redirect-all: stdin closed, stdout and stderr piped and drained by
//!   concurrent workers;
//! - redirect-out-only: this process attaches to a fresh pty obtained through
//!   dynamically resolved `openpty`/`login_tty`, and only the child's stdout
//!   is redirected, to a file.
//!
//! The captured exit code and byte streams are compared exactly against an
//! expected outcome.

pub mod capture_file;
pub mod compare;
pub mod config;
pub mod console;
pub mod drain;
pub mod launch;
pub mod outcome;
pub mod pty;
pub mod scenario;
pub mod test_support;

pub use capture_file::{CaptureFile, CaptureFileError};
pub use compare::{FieldMismatch, MismatchError, OutcomeField, compare};
pub use config::{ConfigError, DEFAULT_ENTRY, DEFAULT_LAUNCHER, HarnessConfig};
pub use console::Console;
pub use drain::{DrainError, DrainWorker};
pub use launch::{
    LaunchCommand, LaunchError, Launcher, ProcessHandle, ProcessLauncher, RedirectionPolicy,
};
pub use outcome::{CapturedOutcome, ExpectedOutcome};
pub use pty::{
    DefaultNamespace, MissingSymbol, PtyError, PtyProvision, SymbolResolver, provision,
};
pub use scenario::{DEFAULT_OUTPUT, RedirectAll, RedirectOutOnly, ScenarioError, ScenarioOutcome};
