use crate::runtime::jit::error::SpecializationResult;
use crate::runtime::jit::specialization::Artifact;

/// Artifact whose entry point was built in-process, e.g. a composed closure
/// or a plain function pointer. Resolution always succeeds.
#[derive(Debug, Clone)]
pub struct ClosureArtifact<F> {
    name: String,
    entry: F,
}

impl<F: Clone> ClosureArtifact<F> {
    pub fn new(name: impl Into<String>, entry: F) -> Self {
        Self {
            name: name.into(),
            entry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F: Clone> Artifact for ClosureArtifact<F> {
    type EntryPoint = F;

    fn resolve(&self) -> SpecializationResult<F> {
        Ok(self.entry.clone())
    }
}
