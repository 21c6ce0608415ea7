use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::runtime::jit::cache::SpecializationMetadata;
use crate::runtime::jit::error::SpecializationResult;

/// Stable identity of a stored specialization.
///
/// Ids are handed out by a monotonically increasing counter and are never
/// reused, so an id stays meaningful across any number of later stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecializationId(u64);

impl SpecializationId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SpecializationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle produced by a code-generation backend.
///
/// Resolution turns the handle into a callable entry point. It may perform
/// backend work such as symbol lookup or relocation, and is only attempted
/// on first use.
pub trait Artifact {
    type EntryPoint;

    fn resolve(&self) -> SpecializationResult<Self::EntryPoint>;
}

/// Calls an entry point with a tuple of arguments, moving each one in.
pub trait Invoke<Args> {
    type Output;

    fn invoke_with(&self, args: Args) -> Self::Output;
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg),*> Invoke<($($arg,)*)> for Arc<Func>
        where
            Func: ?Sized + Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke_with(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (**self)($($arg),*)
            }
        }

        impl<Func, Ret, $($arg),*> Invoke<($($arg,)*)> for Box<Func>
        where
            Func: ?Sized + Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke_with(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (**self)($($arg),*)
            }
        }

        impl<Ret, $($arg),*> Invoke<($($arg,)*)> for fn($($arg),*) -> Ret {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke_with(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Ret, $($arg),*> Invoke<($($arg,)*)> for extern "C" fn($($arg),*) -> Ret {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke_with(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A1);
impl_invoke!(A1, A2);
impl_invoke!(A1, A2, A3);
impl_invoke!(A1, A2, A3, A4);

/// One compiled artifact paired with the binding it was generated for.
///
/// Owned by a [`SpecializationStore`](super::SpecializationStore) for its
/// whole life; never copied.
pub struct Specialization<A: Artifact, B> {
    id: SpecializationId,
    artifact: A,
    binding: B,
    entry: OnceCell<A::EntryPoint>,
    metadata: SpecializationMetadata,
}

impl<A: Artifact, B> Specialization<A, B> {
    pub(crate) fn new(
        id: SpecializationId,
        artifact: A,
        binding: B,
        metadata: SpecializationMetadata,
    ) -> Self {
        Self {
            id,
            artifact,
            binding,
            entry: OnceCell::new(),
            metadata,
        }
    }

    pub fn id(&self) -> SpecializationId {
        self.id
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn artifact(&self) -> &A {
        &self.artifact
    }

    pub fn metadata(&self) -> &SpecializationMetadata {
        &self.metadata
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut SpecializationMetadata {
        &mut self.metadata
    }

    pub fn is_resolved(&self) -> bool {
        self.entry.get().is_some()
    }

    /// Resolve the artifact to its entry point, once.
    ///
    /// A failed resolution is not cached; the next call asks the backend
    /// again.
    pub fn entry_point(&self) -> SpecializationResult<&A::EntryPoint> {
        self.entry.get_or_try_init(|| {
            trace!(specialization = %self.id, "resolving entry point");
            self.artifact.resolve()
        })
    }

    /// Resolve if necessary, then call the entry point.
    pub fn invoke<Args>(
        &self,
        args: Args,
    ) -> SpecializationResult<<A::EntryPoint as Invoke<Args>>::Output>
    where
        A::EntryPoint: Invoke<Args>,
    {
        Ok(self.entry_point()?.invoke_with(args))
    }
}

impl<A: Artifact, B: fmt::Debug> fmt::Debug for Specialization<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specialization")
            .field("id", &self.id)
            .field("binding", &self.binding)
            .field("resolved", &self.entry.get().is_some())
            .field("access_count", &self.metadata.access_count)
            .finish()
    }
}
