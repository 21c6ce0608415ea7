use thiserror::Error;

use super::specialization::SpecializationId;

/// Errors surfaced by the specialization cache.
///
/// Mismatches and cache misses are not errors: they come back as a
/// [`MatchScore`](super::specialization::MatchScore) and an empty lookup.
#[derive(Debug, Error)]
pub enum SpecializationError {
    #[error("failed to resolve entry point `{symbol}`: {reason}")]
    Resolution { symbol: String, reason: String },
    #[error("unknown find strategy `{0}` (expected one of: first, last, best)")]
    UnknownStrategy(String),
    #[error("unknown eviction policy `{0}` (expected one of: lru, fifo)")]
    UnknownEvictionPolicy(String),
    #[error("code generation failed")]
    Generation(#[source] anyhow::Error),
    #[error("specialization {0} is not present in the store")]
    UnknownSpecialization(SpecializationId),
    #[error("invalid configuration value for `{key}`: {reason}")]
    InvalidConfig { key: String, reason: String },
}

impl SpecializationError {
    pub fn resolution(symbol: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resolution {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

pub type SpecializationResult<T> = Result<T, SpecializationError>;
