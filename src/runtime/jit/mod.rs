// JIT Runtime System Module
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod specialization;

pub use cache::SharedSpecializationStore;
pub use config::SpecializerConfig;
pub use error::{SpecializationError, SpecializationResult};
pub use specialization::{
    Artifact, Binding, CodeGenerator, FindStrategy, MatchScore, SpecializationId,
    SpecializationStore, Specializer,
};
