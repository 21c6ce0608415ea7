//! Glob matching on top of the specialization cache.
//!
//! Each distinct pattern is compiled once into a chain of closures and kept
//! in a [`GlobMatcherCache`]; later requests for an equivalent pattern reuse
//! it. Stored shape and generic matchers let a request be served without
//! compiling, at a lower score.

pub mod binding;
pub mod compiler;
pub mod pattern;

pub use binding::{GENERIC_SCORE, GlobBinding, SHAPE_SCORE};
pub use compiler::{GlobArtifact, GlobCompiler, GlobEntry, GlobMatcherCache};
pub use pattern::{GlobPattern, GlobShape, GlobToken, ShapeToken};
