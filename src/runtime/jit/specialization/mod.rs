// Function specialization: match protocol, stored variants and the
// cache-aside client that ties them to a code generator
pub mod binding;
pub mod function;
pub mod specializer;
pub mod store;

pub use binding::{Binding, MatchScore, NoBinding};
pub use function::{Artifact, Invoke, Specialization, SpecializationId};
pub use specializer::{CodeGenerator, Specializer, SpecializerStats};
pub use store::{FindStrategy, Lookup, SpecializationStore};
