//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void};
use std::ptr::NonNull;
use std::rc::Rc;

use crate::launch::{LaunchCommand, LaunchError, Launcher, ProcessHandle, RedirectionPolicy};
use crate::pty::{LOGIN_TTY_SYMBOL, NativeSymbol, OPENPTY_SYMBOL, SymbolResolver};

/// Records a single launch made through [`RecordingLauncher`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LaunchInvocation {
    /// Command that was requested.
    pub command: LaunchCommand,
    /// Redirection policy that was requested.
    pub policy: RedirectionPolicy,
}

/// Launcher that records every request and then either delegates to an inner
/// launcher or refuses.
#[derive(Clone, Debug)]
pub struct RecordingLauncher<L> {
    inner: Option<L>,
    invocations: Rc<RefCell<Vec<LaunchInvocation>>>,
}

impl<L: Launcher> RecordingLauncher<L> {
    /// Records launches and forwards them to `inner`.
    #[must_use]
    pub fn delegating(inner: L) -> Self {
        Self {
            inner: Some(inner),
            invocations: Rc::default(),
        }
    }

    /// Returns a snapshot of all launches recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<LaunchInvocation> {
        self.invocations.borrow().clone()
    }
}

impl RecordingLauncher<crate::launch::ProcessLauncher> {
    /// Records launches and refuses every one with a spawn error.
    #[must_use]
    pub fn refusing() -> Self {
        Self {
            inner: None,
            invocations: Rc::default(),
        }
    }
}

impl<L: Launcher> Launcher for RecordingLauncher<L> {
    fn launch(
        &self,
        command: &LaunchCommand,
        policy: &RedirectionPolicy,
    ) -> Result<ProcessHandle, LaunchError> {
        self.invocations.borrow_mut().push(LaunchInvocation {
            command: command.clone(),
            policy: policy.clone(),
        });
        match &self.inner {
            Some(inner) => inner.launch(command, policy),
            None => Err(LaunchError::Spawn {
                command: command.command_line(),
                message: String::from("launch refused by test double"),
            }),
        }
    }
}

/// Resolver backed by an explicit name-to-function table.
#[derive(Clone, Debug, Default)]
pub struct ScriptedResolver {
    symbols: HashMap<&'static str, NativeSymbol>,
    lookups: Rc<RefCell<Vec<&'static str>>>,
}

impl ScriptedResolver {
    /// Resolver that knows no symbols.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a fake `openpty`.
    #[must_use]
    pub fn with_openpty(mut self, function: FakeOpenPty) -> Self {
        // SAFETY: `FakeOpenPty` has the exact `openpty` C signature.
        let symbol =
            unsafe { NativeSymbol::from_raw(OPENPTY_SYMBOL, fn_address(function as *const ())) };
        self.symbols.insert(OPENPTY_SYMBOL, symbol);
        self
    }

    /// Adds a fake `login_tty`.
    #[must_use]
    pub fn with_login_tty(mut self, function: FakeLoginTty) -> Self {
        // SAFETY: `FakeLoginTty` has the exact `login_tty` C signature.
        let symbol =
            unsafe { NativeSymbol::from_raw(LOGIN_TTY_SYMBOL, fn_address(function as *const ())) };
        self.symbols.insert(LOGIN_TTY_SYMBOL, symbol);
        self
    }

    /// Names looked up so far, in order.
    #[must_use]
    pub fn lookups(&self) -> Vec<&'static str> {
        self.lookups.borrow().clone()
    }
}

impl SymbolResolver for ScriptedResolver {
    fn resolve(&self, name: &'static str) -> Option<NativeSymbol> {
        self.lookups.borrow_mut().push(name);
        self.symbols.get(name).copied()
    }
}

/// C signature of a fake `openpty`.
pub type FakeOpenPty = unsafe extern "C" fn(
    *mut c_int,
    *mut c_int,
    *mut c_char,
    *const libc::termios,
    *const libc::winsize,
) -> c_int;

/// C signature of a fake `login_tty`.
pub type FakeLoginTty = unsafe extern "C" fn(c_int) -> c_int;

fn fn_address(function: *const ()) -> NonNull<c_void> {
    NonNull::new(function.cast_mut().cast::<c_void>()).unwrap_or(NonNull::dangling())
}

/// Fake `openpty` that always fails with status `-1`.
///
/// # Safety
///
/// Matches the `openpty` contract; the pointers are not touched.
pub unsafe extern "C" fn openpty_fails(
    _parent: *mut c_int,
    _child: *mut c_int,
    _name: *mut c_char,
    _termp: *const libc::termios,
    _winp: *const libc::winsize,
) -> c_int {
    -1
}

/// Fake `openpty` that hands out the two ends of a fresh pipe.
///
/// # Safety
///
/// `parent` and `child` must be valid for writes.
pub unsafe extern "C" fn openpty_pipe(
    parent: *mut c_int,
    child: *mut c_int,
    _name: *mut c_char,
    _termp: *const libc::termios,
    _winp: *const libc::winsize,
) -> c_int {
    let mut fds: [c_int; 2] = [-1, -1];
    // SAFETY: `fds` is a two-element array as `pipe` requires.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return -1;
    }
    let [read_end, write_end] = fds;
    // SAFETY: the caller guarantees both out-pointers are writable.
    unsafe {
        parent.write(read_end);
        child.write(write_end);
    }
    0
}

/// Fake `openpty` that reports success without producing descriptors.
///
/// # Safety
///
/// Matches the `openpty` contract; the pointers are not touched.
pub unsafe extern "C" fn openpty_no_descriptors(
    _parent: *mut c_int,
    _child: *mut c_int,
    _name: *mut c_char,
    _termp: *const libc::termios,
    _winp: *const libc::winsize,
) -> c_int {
    0
}

/// Fake `login_tty` that fails with status `-1` and leaves `fd` open.
///
/// # Safety
///
/// Matches the `login_tty` contract.
pub unsafe extern "C" fn login_tty_fails(_fd: c_int) -> c_int {
    -1
}

/// Fake `login_tty` that consumes `fd` by closing it, without touching the
/// process's standard streams.
///
/// # Safety
///
/// `fd` must be an open descriptor owned by the caller.
pub unsafe extern "C" fn login_tty_closes(fd: c_int) -> c_int {
    // SAFETY: ownership of `fd` passes to this call.
    unsafe { libc::close(fd) }
}
