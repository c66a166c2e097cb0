//! Capability-scoped access to the file that receives a child's stdout.
//!
//! The redirect-out-only scenario sends the child's stdout to a plain file and
//! reads it back once the child has exited. All access goes through a
//! `cap_std` directory handle opened on the file's parent.

use std::fs::File;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

/// Errors raised while preparing or reading a capture file.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum CaptureFileError {
    /// Raised when the path cannot name a file.
    #[error("invalid capture file path {path}: {message}")]
    InvalidPath {
        /// Offending path.
        path: Utf8PathBuf,
        /// Human-readable reason.
        message: String,
    },
    /// Raised when a file system operation fails.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
}

/// A file path that receives redirected stdout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaptureFile {
    path: Utf8PathBuf,
}

impl CaptureFile {
    /// Wraps `path`; relative paths resolve against the current directory at
    /// access time.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the capture file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Deletes the file if it exists, establishing a clean precondition.
    ///
    /// Returns `true` when a stale file was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureFileError`] when the parent directory cannot be
    /// opened or removal fails for a reason other than absence.
    pub fn remove_if_exists(&self) -> Result<bool, CaptureFileError> {
        let file_name = self.file_name()?;
        let dir = match Dir::open_ambient_dir(self.parent(), ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(self.io_error(&err)),
        };

        match dir.remove_file(file_name) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.io_error(&err)),
        }
    }

    /// Creates (or truncates) the file and returns a std handle suitable for
    /// a child's stdout.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureFileError::Io`] when the file cannot be created.
    pub fn create(&self) -> Result<File, CaptureFileError> {
        let file_name = self.file_name()?;
        let dir = self.open_parent()?;
        dir.create(file_name)
            .map(cap_std::fs_utf8::File::into_std)
            .map_err(|err| self.io_error(&err))
    }

    /// Reads the full contents of the file.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureFileError::Io`] when the file cannot be read.
    pub fn read(&self) -> Result<Vec<u8>, CaptureFileError> {
        let file_name = self.file_name()?;
        let dir = self.open_parent()?;
        dir.read(file_name).map_err(|err| self.io_error(&err))
    }

    fn parent(&self) -> &Utf8Path {
        match self.path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        }
    }

    fn file_name(&self) -> Result<&str, CaptureFileError> {
        self.path
            .file_name()
            .ok_or_else(|| CaptureFileError::InvalidPath {
                path: self.path.clone(),
                message: String::from("path is missing a file name"),
            })
    }

    fn open_parent(&self) -> Result<Dir, CaptureFileError> {
        Dir::open_ambient_dir(self.parent(), ambient_authority()).map_err(|err| {
            CaptureFileError::Io {
                path: self.parent().to_path_buf(),
                message: err.to_string(),
            }
        })
    }

    fn io_error(&self, err: &io::Error) -> CaptureFileError {
        CaptureFileError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}
