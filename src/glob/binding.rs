use super::pattern::{GlobPattern, GlobShape};
use crate::runtime::jit::specialization::{Binding, MatchScore};

/// Score of a matcher specialised on wildcard structure only
pub const SHAPE_SCORE: MatchScore = MatchScore::new(1);
/// Score of the generic backtracking matcher
pub const GENERIC_SCORE: MatchScore = MatchScore::new(0);

/// What a compiled glob matcher was specialised for.
///
/// Requests are always `Exact`; the other variants only appear on stored
/// matchers that read part of the pattern at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobBinding {
    /// Every character of the pattern is baked in.
    Exact(GlobPattern),
    /// Wildcards are baked in, literal characters come from the request.
    Shape(GlobShape),
    /// Nothing is baked in.
    Generic,
}

impl GlobBinding {
    pub fn request(pattern: impl Into<String>) -> Self {
        Self::Exact(GlobPattern::new(pattern))
    }

    pub fn pattern(&self) -> Option<&GlobPattern> {
        match self {
            Self::Exact(pattern) => Some(pattern),
            Self::Shape(_) | Self::Generic => None,
        }
    }
}

impl Binding for GlobBinding {
    fn match_with(&self, requested: &Self) -> MatchScore {
        let Some(pattern) = requested.pattern() else {
            return MatchScore::MISMATCH;
        };
        match self {
            Self::Exact(stored) if stored.is_equivalent(pattern) => MatchScore::MATCH,
            Self::Shape(shape) if *shape == pattern.shape() => SHAPE_SCORE,
            Self::Generic => GENERIC_SCORE,
            Self::Exact(_) | Self::Shape(_) => MatchScore::MISMATCH,
        }
    }
}
