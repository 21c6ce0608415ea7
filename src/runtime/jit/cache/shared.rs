use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::runtime::jit::error::{SpecializationError, SpecializationResult};
use crate::runtime::jit::specialization::{
    Artifact, Binding, FindStrategy, Invoke, Lookup, MatchScore, SpecializationId,
    SpecializationStore,
};

/// Specialization store shareable across threads.
///
/// Lookups and invocations take the read lock and may run concurrently;
/// `store` and `evict` take the write lock.
pub struct SharedSpecializationStore<A: Artifact, B> {
    inner: Arc<RwLock<SpecializationStore<A, B>>>,
}

impl<A: Artifact, B: Binding> SharedSpecializationStore<A, B> {
    pub fn new() -> Self {
        Self::from_store(SpecializationStore::new())
    }

    pub fn from_store(store: SpecializationStore<A, B>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn store(&self, artifact: A, binding: B) -> SpecializationId {
        self.inner.write().store(artifact, binding)
    }

    pub fn evict(&self, id: SpecializationId) -> bool {
        self.inner.write().evict(id)
    }

    /// Run `f` on the lookup result while the read lock is held
    pub fn find_with<R>(
        &self,
        requested: &B,
        strategy: FindStrategy,
        f: impl FnOnce(Lookup<'_, A, B>) -> R,
    ) -> R {
        let guard = self.inner.read();
        f(guard.find(requested, strategy))
    }

    pub fn find(
        &self,
        requested: &B,
        strategy: FindStrategy,
    ) -> (Option<SpecializationId>, MatchScore) {
        self.find_with(requested, strategy, |lookup| (lookup.id(), lookup.score))
    }

    pub fn invoke<Args>(
        &self,
        id: SpecializationId,
        args: Args,
    ) -> SpecializationResult<<A::EntryPoint as Invoke<Args>>::Output>
    where
        A::EntryPoint: Invoke<Args>,
    {
        let guard = self.inner.read();
        guard
            .get(id)
            .ok_or(SpecializationError::UnknownSpecialization(id))?
            .invoke(args)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, SpecializationStore<A, B>> {
        self.inner.read()
    }
}

impl<A: Artifact, B: Binding> Default for SharedSpecializationStore<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Artifact, B> Clone for SharedSpecializationStore<A, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
