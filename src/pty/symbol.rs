//! By-name lookup of native functions.

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

use libloading::os::unix::Library;
use tracing::debug;

/// Address of a resolved native function.
///
/// Absence of a symbol is modelled as `Option<NativeSymbol>::None` by
/// [`SymbolResolver::resolve`]; a `NativeSymbol` always holds a non-null
/// address.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct NativeSymbol {
    name: &'static str,
    address: NonNull<c_void>,
}

impl NativeSymbol {
    /// Wraps a raw function address.
    ///
    /// # Safety
    ///
    /// `address` must point to a function whose C signature matches the one
    /// conventionally named by `name`, and it must stay valid for as long as
    /// the symbol (or anything derived from it) is used.
    #[must_use]
    pub const unsafe fn from_raw(name: &'static str, address: NonNull<c_void>) -> Self {
        Self { name, address }
    }

    /// Symbol name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Raw address.
    #[must_use]
    pub const fn address(&self) -> NonNull<c_void> {
        self.address
    }
}

impl fmt::Debug for NativeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSymbol")
            .field("name", &self.name)
            .field("address", &self.address.as_ptr())
            .finish()
    }
}

/// Capability lookup for native functions.
pub trait SymbolResolver {
    /// Looks `name` up, returning `None` when the host does not provide it.
    fn resolve(&self, name: &'static str) -> Option<NativeSymbol>;
}

/// Resolver over the process's default dynamic symbol namespace: the main
/// program and every library loaded with it.
pub struct DefaultNamespace {
    library: Library,
}

impl DefaultNamespace {
    /// Opens the default namespace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            library: Library::this(),
        }
    }
}

impl Default for DefaultNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultNamespace").finish_non_exhaustive()
    }
}

impl SymbolResolver for DefaultNamespace {
    fn resolve(&self, name: &'static str) -> Option<NativeSymbol> {
        // SAFETY: the symbol is read as an untyped address; callers only
        // reinterpret it through `NativeSymbol`'s documented contract. The
        // default namespace is never unloaded while the process runs.
        let raw = unsafe { self.library.get::<*mut c_void>(name.as_bytes()) };
        match raw {
            Ok(symbol) => {
                let address = NonNull::new(*symbol)?;
                debug!(symbol = name, "resolved native symbol");
                // SAFETY: `address` came from the dynamic linker for `name`.
                Some(unsafe { NativeSymbol::from_raw(name, address) })
            }
            Err(err) => {
                debug!(symbol = name, error = %err, "native symbol not found");
                None
            }
        }
    }
}
