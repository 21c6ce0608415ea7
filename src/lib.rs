//! Runtime specialization cache.
//!
//! A [`SpecializationStore`] keeps compiled variants of a function together
//! with the [`Binding`] each was generated for. Lookups score every stored
//! binding against the request and pick one by [`FindStrategy`]; a
//! [`Specializer`] adds the cache-aside loop around an external
//! [`CodeGenerator`].

pub mod glob;
pub mod runtime;
pub mod utils;

pub use runtime::jit::backend::{ClosureArtifact, DylibArtifact, DylibEntry};
pub use runtime::jit::cache::{
    EvictionKind, EvictionPolicy, FifoEvictionPolicy, LruEvictionPolicy, SharedSpecializationStore,
    SpecializationMetadata,
};
pub use runtime::jit::config::SpecializerConfig;
pub use runtime::jit::error::{SpecializationError, SpecializationResult};
pub use runtime::jit::specialization::{
    Artifact, Binding, CodeGenerator, FindStrategy, Invoke, Lookup, MatchScore, NoBinding,
    Specialization, SpecializationId, SpecializationStore, Specializer, SpecializerStats,
};
