//! Interactive console bound to the process's real standard output.
//!
//! A [`Console`] is available whether or not any standard stream is a
//! terminal. Output always goes to file descriptor 1, so it lands wherever
//! stdout currently points: a pipe, a regular file, or a terminal. This is
//! the behaviour the harness scenarios verify.

use std::io::{self, IsTerminal, Write};

/// Console writer over the process's stdout.
#[derive(Debug)]
pub struct Console {
    stdout: io::Stdout,
    stdin_is_terminal: bool,
    stdout_is_terminal: bool,
}

impl Console {
    /// Binds a console to the current stdout.
    #[must_use]
    pub fn open() -> Self {
        let stdout = io::stdout();
        Self {
            stdin_is_terminal: io::stdin().is_terminal(),
            stdout_is_terminal: stdout.is_terminal(),
            stdout,
        }
    }

    /// Writes `text` verbatim, with no trailing newline, and flushes.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when stdout cannot be written.
    pub fn printf(&self, text: &str) -> io::Result<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Writes raw bytes and flushes.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when stdout cannot be written.
    pub fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        let mut lock = self.stdout.lock();
        lock.write_all(bytes)?;
        lock.flush()
    }

    /// Whether stdin was a terminal when the console was opened.
    #[must_use]
    pub const fn stdin_is_terminal(&self) -> bool {
        self.stdin_is_terminal
    }

    /// Whether stdout was a terminal when the console was opened.
    #[must_use]
    pub const fn stdout_is_terminal(&self) -> bool {
        self.stdout_is_terminal
    }
}
