//! Concurrent draining of a child's output pipes.
//!
//! Each stream gets its own OS thread that reads to end-of-stream into a
//! buffer only that thread touches. The buffer is handed back through
//! [`DrainWorker::join`], so no locking is involved.

use std::io::{self, Read};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::debug;

/// Errors surfaced when a drain worker finishes.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DrainError {
    /// Raised when reading the stream fails.
    #[error("failed to drain {stream}: {message}")]
    Read {
        /// Stream name, for example `stdout`.
        stream: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the worker thread cannot be started.
    #[error("failed to start drain worker for {stream}: {message}")]
    Spawn {
        /// Stream name.
        stream: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the worker thread panicked.
    #[error("drain worker for {stream} panicked")]
    Panicked {
        /// Stream name.
        stream: String,
    },
}

/// Reads `reader` to end-of-stream.
///
/// # Errors
///
/// Returns the underlying I/O error; bytes read before the error are
/// discarded.
pub fn drain<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// A running drain thread for one stream.
#[derive(Debug)]
pub struct DrainWorker {
    stream: String,
    handle: JoinHandle<io::Result<Vec<u8>>>,
}

impl DrainWorker {
    /// Starts draining `reader` on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns [`DrainError::Spawn`] when the OS refuses a new thread.
    pub fn spawn<R>(stream: &str, reader: R) -> Result<Self, DrainError>
    where
        R: Read + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("drain-{stream}"))
            .spawn(move || drain(reader))
            .map_err(|err| DrainError::Spawn {
                stream: stream.to_owned(),
                message: err.to_string(),
            })?;
        Ok(Self {
            stream: stream.to_owned(),
            handle,
        })
    }

    /// Stream name this worker drains.
    #[must_use]
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Waits for end-of-stream and returns everything read.
    ///
    /// # Errors
    ///
    /// Returns [`DrainError::Read`] when the stream failed, or
    /// [`DrainError::Panicked`] when the thread panicked.
    pub fn join(self) -> Result<Vec<u8>, DrainError> {
        let Self { stream, handle } = self;
        match handle.join() {
            Ok(Ok(bytes)) => {
                debug!(stream = %stream, len = bytes.len(), "drain finished");
                Ok(bytes)
            }
            Ok(Err(err)) => Err(DrainError::Read {
                stream,
                message: err.to_string(),
            }),
            Err(_) => Err(DrainError::Panicked { stream }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::{LaunchCommand, Launcher, ProcessLauncher, RedirectionPolicy};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("boom"))
        }
    }

    #[test]
    fn drain_reads_to_end() {
        let bytes = drain(&b"payload"[..]).expect("drain should succeed");

        assert_eq!(bytes, b"payload");
    }

    #[test]
    fn read_failure_names_stream_and_cause() {
        let worker = DrainWorker::spawn("stderr", FailingReader).expect("spawn worker");

        let err = worker.join().expect_err("read should fail");
        assert_eq!(
            err,
            DrainError::Read {
                stream: String::from("stderr"),
                message: String::from("boom"),
            }
        );
    }

    #[test]
    fn failing_worker_does_not_abort_sibling() {
        let failing = DrainWorker::spawn("stdout", FailingReader).expect("spawn failing");
        let healthy = DrainWorker::spawn("stderr", &b"still here"[..]).expect("spawn healthy");

        assert!(failing.join().is_err());
        assert_eq!(healthy.join().expect("sibling drains"), b"still here");
    }

    #[test]
    fn concurrent_workers_drain_large_payloads_without_deadlock() {
        // 1 MiB on each stream is far past any pipe buffer.
        let script = "head -c 1048576 /dev/zero; head -c 1048576 /dev/zero 1>&2";
        let mut handle = ProcessLauncher
            .launch(
                &LaunchCommand::new("sh").arg("-c").arg(script),
                &RedirectionPolicy::PipeBoth,
            )
            .expect("launch should succeed");
        let stdout = DrainWorker::spawn("stdout", handle.take_stdout().expect("stdout"))
            .expect("spawn stdout worker");
        let stderr = DrainWorker::spawn("stderr", handle.take_stderr().expect("stderr"))
            .expect("spawn stderr worker");

        let code = handle.wait().expect("wait should succeed");
        let out = stdout.join().expect("stdout drains");
        let err = stderr.join().expect("stderr drains");

        assert_eq!(code, 0);
        assert_eq!(out.len(), 1_048_576);
        assert_eq!(err.len(), 1_048_576);
    }
}
