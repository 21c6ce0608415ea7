use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cache::EvictionKind;
use super::error::{SpecializationError, SpecializationResult};
use super::specialization::{FindStrategy, MatchScore};

pub const ENV_STRATEGY: &str = "OTTER_SPEC_STRATEGY";
pub const ENV_THRESHOLD: &str = "OTTER_SPEC_THRESHOLD";
pub const ENV_MAX_ENTRIES: &str = "OTTER_SPEC_MAX_ENTRIES";
pub const ENV_EVICTION: &str = "OTTER_SPEC_EVICTION";

/// Reuse policy for a [`Specializer`](super::specialization::Specializer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecializerConfig {
    /// Lookup strategy used for every request
    pub strategy: FindStrategy,
    /// Lowest intermediate score that still counts as a reuse; `None`
    /// accepts anything that is not a mismatch
    pub accept_threshold: Option<i32>,
    /// Upper bound on live specializations; `None` is unbounded
    pub max_entries: Option<usize>,
    /// Policy consulted when `max_entries` is reached
    pub eviction: EvictionKind,
}

impl Default for SpecializerConfig {
    fn default() -> Self {
        Self {
            strategy: FindStrategy::Best,
            accept_threshold: None,
            max_entries: None,
            eviction: EvictionKind::Lru,
        }
    }
}

impl SpecializerConfig {
    /// Read overrides from `OTTER_SPEC_*` environment variables.
    ///
    /// Unset variables keep their defaults; malformed ones are errors.
    pub fn from_env() -> SpecializationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SpecializationResult<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_STRATEGY) {
            config.strategy = value.parse()?;
        }
        if let Some(value) = lookup(ENV_THRESHOLD) {
            config.accept_threshold = Some(parse_value(ENV_THRESHOLD, &value)?);
        }
        if let Some(value) = lookup(ENV_MAX_ENTRIES) {
            config.max_entries = Some(parse_value(ENV_MAX_ENTRIES, &value)?);
        }
        if let Some(value) = lookup(ENV_EVICTION) {
            config.eviction = value.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(source: &str) -> SpecializationResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| SpecializationError::invalid_config("toml", err))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: &std::path::Path) -> SpecializationResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|err| SpecializationError::invalid_config(path.display().to_string(), err))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> SpecializationResult<()> {
        if self.max_entries == Some(0) {
            return Err(SpecializationError::invalid_config(
                "max_entries",
                "capacity must be at least 1",
            ));
        }
        Ok(())
    }

    /// Whether a lookup score is good enough to reuse.
    ///
    /// A perfect match is always accepted and a mismatch never is.
    pub fn accepts(&self, score: MatchScore) -> bool {
        if score.is_mismatch() {
            return false;
        }
        score.is_match()
            || self
                .accept_threshold
                .is_none_or(|threshold| score.value() >= threshold)
    }
}

fn parse_value<T>(key: &str, value: &str) -> SpecializationResult<T>
where
    T: FromStr,
    T::Err: ToString,
{
    value
        .trim()
        .parse()
        .map_err(|err: T::Err| SpecializationError::invalid_config(key, err))
}
