// Artifact backends
pub mod closure;
pub mod dylib;

pub use closure::ClosureArtifact;
pub use dylib::{DylibArtifact, DylibEntry};
