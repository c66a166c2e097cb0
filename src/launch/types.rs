//! Launch request types and the owned child-process handle.

use std::ffi::OsString;
use std::process::{Child, ChildStderr, ChildStdout};

use camino::{Utf8Path, Utf8PathBuf};
use shell_escape::unix::escape;

use super::LaunchError;
use crate::capture_file::CaptureFile;

/// Executable path plus argument list for a child process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LaunchCommand {
    program: Utf8PathBuf,
    args: Vec<OsString>,
}

impl LaunchCommand {
    /// Creates a command with no arguments.
    #[must_use]
    pub fn new(program: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Executable path.
    #[must_use]
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// Argument list.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Shell-escaped rendering used in logs and error messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut rendered = escape(self.program.as_str().into()).into_owned();
        for arg in &self.args {
            let lossy = arg.to_string_lossy();
            rendered.push(' ');
            rendered.push_str(escape(lossy).as_ref());
        }
        rendered
    }
}

/// How the child's standard streams are wired.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirectionPolicy {
    /// stdin detached; stdout and stderr are pipes read by the parent.
    PipeBoth,
    /// stdin and stderr inherited from the parent; stdout written to a file.
    InheritWithStdoutFile(CaptureFile),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum WaitState {
    Running,
    Exited(i32),
}

/// Exclusive handle to a launched child.
///
/// The handle remembers whether it has already been waited on; a second
/// [`ProcessHandle::wait`] returns the recorded exit code instead of touching
/// a reaped process.
#[derive(Debug)]
pub struct ProcessHandle {
    command_line: String,
    child: Child,
    state: WaitState,
}

impl ProcessHandle {
    pub(crate) const fn new(command_line: String, child: Child) -> Self {
        Self {
            command_line,
            child,
            state: WaitState::Running,
        }
    }

    /// OS process identifier.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Rendered command line the child was started with.
    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    #[cfg(test)]
    pub(crate) const fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }

    /// Takes the read end of the child's stdout pipe, if piped and not yet
    /// taken.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Takes the read end of the child's stderr pipe, if piped and not yet
    /// taken.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Exit code, once [`ProcessHandle::wait`] has completed.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self.state {
            WaitState::Running => None,
            WaitState::Exited(code) => Some(code),
        }
    }

    /// Blocks until the child terminates and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Wait`] when the OS wait fails, or
    /// [`LaunchError::MissingExitCode`] when the child was terminated by a
    /// signal.
    pub fn wait(&mut self) -> Result<i32, LaunchError> {
        if let WaitState::Exited(code) = self.state {
            return Ok(code);
        }

        let status = self.child.wait().map_err(|err| LaunchError::Wait {
            command: self.command_line.clone(),
            message: err.to_string(),
        })?;
        let Some(code) = status.code() else {
            return Err(LaunchError::MissingExitCode {
                command: self.command_line.clone(),
                status: status.to_string(),
            });
        };

        self.state = WaitState::Exited(code);
        Ok(code)
    }
}
