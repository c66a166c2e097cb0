//! Pseudo-terminal provisioning through dynamically resolved primitives.
//!
//! The harness needs exactly two native functions: `openpty`, which allocates
//! a parent/child terminal pair, and `login_tty`, which makes the child end
//! the controlling terminal of the current process and its stdin, stdout and
//! stderr. Both are looked up by name at run time. A host that lacks either
//! one yields [`PtyProvision::Skipped`]; that is a platform property, not a
//! failure.
//!
//! Attaching replaces the calling process's standard streams, so the
//! redirect-out-only scenario must run in a process of its own.

use std::ffi::{c_char, c_int};
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::ptr;

use thiserror::Error;
use tracing::{debug, info};

mod symbol;

pub use symbol::{DefaultNamespace, NativeSymbol, SymbolResolver};

/// Name of the pty allocation primitive.
pub const OPENPTY_SYMBOL: &str = "openpty";

/// Name of the controlling-terminal primitive.
pub const LOGIN_TTY_SYMBOL: &str = "login_tty";

type OpenPtyFn = unsafe extern "C" fn(
    *mut c_int,
    *mut c_int,
    *mut c_char,
    *const libc::termios,
    *const libc::winsize,
) -> c_int;

type LoginTtyFn = unsafe extern "C" fn(c_int) -> c_int;

/// A native primitive the host does not provide.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("cannot look up {name}")]
pub struct MissingSymbol {
    /// Symbol that failed to resolve.
    pub name: &'static str,
}

/// Hard failures from the native layer.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum PtyError {
    /// Raised when `openpty` returns a non-zero status.
    #[error("openpty failed with status {status}: {message}")]
    Allocate {
        /// Return value of the call.
        status: c_int,
        /// OS error captured right after the call.
        message: String,
    },
    /// Raised when `openpty` reports success but hands back unusable
    /// descriptors.
    #[error("openpty returned invalid descriptors (parent {parent}, child {child})")]
    InvalidDescriptors {
        /// Parent descriptor value.
        parent: RawFd,
        /// Child descriptor value.
        child: RawFd,
    },
    /// Raised when `login_tty` returns a non-zero status.
    #[error("login_tty failed with status {status}: {message}")]
    Attach {
        /// Return value of the call.
        status: c_int,
        /// OS error captured right after the call.
        message: String,
    },
}

/// Both primitives, resolved.
#[derive(Clone, Copy, Debug)]
pub struct PtyPrimitives {
    openpty: OpenPtyFn,
    login_tty: LoginTtyFn,
}

impl PtyPrimitives {
    /// Resolves `openpty` then `login_tty`.
    ///
    /// # Errors
    ///
    /// Returns the first [`MissingSymbol`] encountered; `login_tty` is not
    /// looked up when `openpty` is absent.
    pub fn resolve<S: SymbolResolver + ?Sized>(resolver: &S) -> Result<Self, MissingSymbol> {
        let openpty = resolver.resolve(OPENPTY_SYMBOL).ok_or(MissingSymbol {
            name: OPENPTY_SYMBOL,
        })?;
        let login_tty = resolver.resolve(LOGIN_TTY_SYMBOL).ok_or(MissingSymbol {
            name: LOGIN_TTY_SYMBOL,
        })?;

        // SAFETY: `NativeSymbol` guarantees each address is a function with
        // the C signature conventionally bound to its name.
        let (openpty, login_tty) = unsafe {
            (
                std::mem::transmute::<*mut std::ffi::c_void, OpenPtyFn>(
                    openpty.address().as_ptr(),
                ),
                std::mem::transmute::<*mut std::ffi::c_void, LoginTtyFn>(
                    login_tty.address().as_ptr(),
                ),
            )
        };
        Ok(Self { openpty, login_tty })
    }

    /// Allocates a pty pair with no name buffer, terminal attributes or
    /// window size.
    ///
    /// # Errors
    ///
    /// Returns [`PtyError::Allocate`] on a non-zero status and
    /// [`PtyError::InvalidDescriptors`] when the reported descriptors are
    /// negative.
    pub fn open(&self) -> Result<PtyPair, PtyError> {
        let mut parent: c_int = -1;
        let mut child: c_int = -1;
        // SAFETY: both out-pointers reference live stack locals; the
        // remaining arguments are documented as optional and passed null.
        let status = unsafe {
            (self.openpty)(
                &raw mut parent,
                &raw mut child,
                ptr::null_mut(),
                ptr::null(),
                ptr::null(),
            )
        };
        if status != 0 {
            return Err(PtyError::Allocate {
                status,
                message: io::Error::last_os_error().to_string(),
            });
        }
        if parent < 0 || child < 0 {
            return Err(PtyError::InvalidDescriptors { parent, child });
        }

        debug!(parent, child, "allocated pty pair");
        // SAFETY: a successful `openpty` hands ownership of both descriptors
        // to the caller.
        let pair = unsafe {
            PtyPair {
                parent: OwnedFd::from_raw_fd(parent),
                child: OwnedFd::from_raw_fd(child),
            }
        };
        Ok(pair)
    }

    /// Makes the pair's child end the controlling terminal and standard
    /// streams of this process, consuming the child descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PtyError::Attach`] on a non-zero status; the child
    /// descriptor is closed in that case.
    pub fn attach(&self, pair: PtyPair) -> Result<AttachedPty, PtyError> {
        let PtyPair { parent, child } = pair;
        // SAFETY: `child` is an open descriptor owned by this pair.
        let status = unsafe { (self.login_tty)(child.as_raw_fd()) };
        if status != 0 {
            return Err(PtyError::Attach {
                status,
                message: io::Error::last_os_error().to_string(),
            });
        }

        // `login_tty` has duplicated the descriptor onto 0, 1 and 2 and
        // closed the original.
        let consumed = child.into_raw_fd();
        debug!(child = consumed, "attached controlling terminal");
        Ok(AttachedPty { parent })
    }
}

/// Parent and child ends of a freshly allocated pty.
#[derive(Debug)]
pub struct PtyPair {
    parent: OwnedFd,
    child: OwnedFd,
}

impl PtyPair {
    /// Parent (controller) end.
    #[must_use]
    pub fn parent(&self) -> BorrowedFd<'_> {
        self.parent.as_fd()
    }

    /// Child (terminal) end.
    #[must_use]
    pub fn child(&self) -> BorrowedFd<'_> {
        self.child.as_fd()
    }
}

/// A pty whose child end now backs this process's standard streams.
///
/// Dropping it closes the parent end. While this process leads the session
/// that owns the terminal, that hangs the terminal up and delivers `SIGHUP`
/// to this process; use [`AttachedPty::hold_for_process`] once attached.
#[derive(Debug)]
pub struct AttachedPty {
    parent: OwnedFd,
}

impl AttachedPty {
    /// Parent (controller) end.
    #[must_use]
    pub fn parent(&self) -> BorrowedFd<'_> {
        self.parent.as_fd()
    }

    /// Releases ownership of the parent end so it stays open until the
    /// process exits, and returns its descriptor number.
    #[must_use = "the descriptor stays open for the rest of the process"]
    pub fn hold_for_process(self) -> RawFd {
        let parent = self.parent.into_raw_fd();
        debug!(parent, "holding pty parent open until exit");
        parent
    }
}

/// Result of [`provision`].
#[derive(Debug)]
pub enum PtyProvision {
    /// Both primitives resolved and succeeded.
    Attached(AttachedPty),
    /// A primitive is not available on this host.
    Skipped(MissingSymbol),
}

/// Resolves both primitives, allocates a pty and attaches it as this
/// process's controlling terminal.
///
/// # Errors
///
/// Returns [`PtyError`] when either native call reports failure. A missing
/// primitive is not an error; it yields [`PtyProvision::Skipped`].
pub fn provision<S: SymbolResolver + ?Sized>(resolver: &S) -> Result<PtyProvision, PtyError> {
    let primitives = match PtyPrimitives::resolve(resolver) {
        Ok(primitives) => primitives,
        Err(missing) => {
            info!(symbol = missing.name, "pty primitive unavailable");
            return Ok(PtyProvision::Skipped(missing));
        }
    };

    let pair = primitives.open()?;
    let attached = primitives.attach(pair)?;
    Ok(PtyProvision::Attached(attached))
}
