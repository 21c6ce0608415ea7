use std::ffi::OsStr;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use libloading::Library;
use tracing::debug;

use crate::runtime::jit::error::{SpecializationError, SpecializationResult};
use crate::runtime::jit::specialization::{Artifact, Invoke};

/// Artifact backed by a symbol in a loaded shared object.
///
/// Resolution yields a [`DylibEntry`], which holds its own reference to the
/// library. The shared object stays loaded while any artifact or entry
/// point taken from it is alive, including copies made after eviction.
pub struct DylibArtifact<T> {
    library: Arc<Library>,
    symbol: String,
    _entry: PhantomData<fn() -> T>,
}

impl<T: Copy> DylibArtifact<T> {
    /// Wrap `symbol` from an already loaded library.
    ///
    /// # Safety
    ///
    /// `T` must be the exact function pointer type of `symbol`. Calling an
    /// entry point resolved with a different signature is undefined
    /// behaviour.
    pub unsafe fn new(library: Arc<Library>, symbol: impl Into<String>) -> Self {
        Self {
            library,
            symbol: symbol.into(),
            _entry: PhantomData,
        }
    }

    /// Load the shared object at `path` and wrap `symbol` from it.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers, and `T` must match the
    /// symbol's signature as for [`DylibArtifact::new`].
    pub unsafe fn open(
        path: impl AsRef<OsStr>,
        symbol: impl Into<String>,
    ) -> SpecializationResult<Self> {
        let symbol = symbol.into();
        let path = path.as_ref();
        // SAFETY: forwarded to the caller of `open`.
        let library = unsafe { Library::new(path) }
            .map_err(|err| SpecializationError::resolution(symbol.clone(), err))?;
        debug!(library = ?path, %symbol, "loaded shared object");
        // SAFETY: forwarded to the caller of `open`.
        Ok(unsafe { Self::new(Arc::new(library), symbol) })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }
}

impl<T: Copy> Artifact for DylibArtifact<T> {
    type EntryPoint = DylibEntry<T>;

    fn resolve(&self) -> SpecializationResult<DylibEntry<T>> {
        // SAFETY: the constructor's contract guarantees `T` is the symbol's type.
        let symbol = unsafe { self.library.get::<T>(self.symbol.as_bytes()) }
            .map_err(|err| SpecializationError::resolution(self.symbol.clone(), err))?;
        Ok(DylibEntry {
            library: Arc::clone(&self.library),
            func: *symbol,
        })
    }
}

impl<T> fmt::Debug for DylibArtifact<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DylibArtifact")
            .field("symbol", &self.symbol)
            .finish_non_exhaustive()
    }
}

/// Resolved entry point of a [`DylibArtifact`].
///
/// The raw function pointer is never handed out; it is only called through
/// [`Invoke`], with the library kept loaded by the entry itself.
#[derive(Clone)]
pub struct DylibEntry<T> {
    library: Arc<Library>,
    func: T,
}

impl<T> DylibEntry<T> {
    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }
}

impl<T, Args> Invoke<Args> for DylibEntry<T>
where
    T: Invoke<Args>,
{
    type Output = T::Output;

    fn invoke_with(&self, args: Args) -> Self::Output {
        self.func.invoke_with(args)
    }
}

impl<T> fmt::Debug for DylibEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DylibEntry").finish_non_exhaustive()
    }
}
