// Specialization cache policies and sharing
pub mod eviction;
pub mod metadata;
pub mod shared;

pub use eviction::{EvictionKind, EvictionPolicy, FifoEvictionPolicy, LruEvictionPolicy};
pub use metadata::SpecializationMetadata;
pub use shared::SharedSpecializationStore;
