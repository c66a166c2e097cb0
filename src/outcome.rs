//! Expected and captured scenario outcomes.
//!
//! [`ExpectedOutcome`] is the ground truth a scenario is judged against.
//! [`CapturedOutcome`] is what the child actually produced; it can only be
//! assembled from a finished process, so comparison never observes a buffer
//! that is still being filled.

/// Exit code and exact output a scenario expects from its child.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpectedOutcome {
    exit_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ExpectedOutcome {
    /// Builds an expectation from explicit values.
    #[must_use]
    pub fn new(exit_code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Expects exit code `0`, the given stdout, and no stderr.
    #[must_use]
    pub fn success_with_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self::new(0, stdout, Vec::new())
    }

    /// Expected exit code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Expected stdout bytes.
    #[must_use]
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Expected stderr bytes.
    #[must_use]
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }
}

/// Exit code and output captured from a child that has already exited.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CapturedOutcome {
    exit_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl CapturedOutcome {
    /// Assembles a captured outcome.
    ///
    /// Callers pass the exit code obtained from a completed wait and buffers
    /// returned by joined drain workers (or a file read after exit).
    #[must_use]
    pub const fn from_finished(exit_code: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
        }
    }

    /// Captured exit code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Captured stdout bytes.
    #[must_use]
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Captured stderr bytes.
    #[must_use]
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }
}
