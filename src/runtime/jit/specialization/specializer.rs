use std::time::Instant;

use tracing::{debug, warn};

use super::binding::Binding;
use super::function::{Artifact, Invoke, Specialization, SpecializationId};
use super::store::SpecializationStore;
use crate::runtime::jit::cache::EvictionPolicy;
use crate::runtime::jit::config::SpecializerConfig;
use crate::runtime::jit::error::{SpecializationError, SpecializationResult};

/// Backend that turns a binding into a freshly compiled artifact.
///
/// Retry policy, if any, lives here; the specializer never retries.
pub trait CodeGenerator<B> {
    type Artifact: Artifact;

    fn generate(&mut self, binding: &B) -> anyhow::Result<Self::Artifact>;
}

/// Look up a reusable specialization, or generate and remember a new one.
pub struct Specializer<G: CodeGenerator<B>, B: Binding> {
    store: SpecializationStore<G::Artifact, B>,
    generator: G,
    config: SpecializerConfig,
    eviction: Box<dyn EvictionPolicy>,
    stats: SpecializerStats,
}

impl<G: CodeGenerator<B>, B: Binding> Specializer<G, B> {
    pub fn new(generator: G) -> Self {
        Self::with_config(generator, SpecializerConfig::default())
    }

    pub fn with_config(generator: G, config: SpecializerConfig) -> Self {
        let eviction = config.eviction.build();
        Self {
            store: SpecializationStore::new(),
            generator,
            config,
            eviction,
            stats: SpecializerStats::default(),
        }
    }

    /// Build with overrides from the `OTTER_SPEC_*` environment variables
    pub fn from_env(generator: G) -> SpecializationResult<Self> {
        Ok(Self::with_config(generator, SpecializerConfig::from_env()?))
    }

    /// Replace the eviction policy chosen by the config
    pub fn with_eviction_policy(mut self, policy: Box<dyn EvictionPolicy>) -> Self {
        self.eviction = policy;
        for id in self.store.ids() {
            self.eviction.on_add(id);
        }
        self
    }

    /// Resolve `request` to a stored specialization, generating one on a miss.
    pub fn specialize(&mut self, request: B) -> SpecializationResult<SpecializationId> {
        self.stats.lookups += 1;

        let lookup = self.store.find(&request, self.config.strategy);
        let reuse = lookup.id().filter(|_| self.config.accepts(lookup.score));
        if let Some(id) = reuse {
            debug!(specialization = %id, score = %lookup.score, "reusing specialization");
            self.stats.hits += 1;
            self.store.record_access(id);
            self.eviction.on_access(id);
            return Ok(id);
        }
        if let Some(id) = lookup.id() {
            debug!(
                specialization = %id,
                score = %lookup.score,
                "candidate below acceptance threshold"
            );
        }
        self.stats.misses += 1;

        let start = Instant::now();
        let artifact = self
            .generator
            .generate(&request)
            .map_err(SpecializationError::Generation)?;
        let generation_time = start.elapsed();

        self.make_room();
        let id = self
            .store
            .store_with_generation_time(artifact, request, generation_time);
        self.eviction.on_add(id);
        self.stats.generated += 1;
        debug!(specialization = %id, ?generation_time, "generated specialization");
        Ok(id)
    }

    /// Specialize for `request`, then call the entry point with `args`.
    pub fn call<Args>(
        &mut self,
        request: B,
        args: Args,
    ) -> SpecializationResult<<<G::Artifact as Artifact>::EntryPoint as Invoke<Args>>::Output>
    where
        <G::Artifact as Artifact>::EntryPoint: Invoke<Args>,
    {
        let id = self.specialize(request)?;
        self.specialization(id)
            .ok_or(SpecializationError::UnknownSpecialization(id))?
            .invoke(args)
    }

    /// Store an artifact produced outside the generator, e.g. a generic fallback.
    pub fn seed(&mut self, artifact: G::Artifact, binding: B) -> SpecializationId {
        self.make_room();
        let id = self.store.store(artifact, binding);
        self.eviction.on_add(id);
        id
    }

    pub fn evict(&mut self, id: SpecializationId) -> bool {
        if !self.store.evict(id) {
            return false;
        }
        self.eviction.on_remove(id);
        self.stats.evictions += 1;
        true
    }

    fn make_room(&mut self) {
        let Some(max_entries) = self.config.max_entries else {
            return;
        };
        while self.store.len() >= max_entries {
            let live: Vec<_> = self.store.ids().collect();
            let Some(victim) = self.eviction.select_victim(&live) else {
                warn!(live = live.len(), max_entries, "eviction policy found no victim");
                break;
            };
            if !self.evict(victim) {
                warn!(specialization = %victim, "eviction policy chose an unknown specialization");
                break;
            }
        }
    }

    pub fn specialization(
        &self,
        id: SpecializationId,
    ) -> Option<&Specialization<G::Artifact, B>> {
        self.store.get(id)
    }

    pub fn store(&self) -> &SpecializationStore<G::Artifact, B> {
        &self.store
    }

    pub fn config(&self) -> &SpecializerConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn stats(&self) -> SpecializerStats {
        SpecializerStats {
            live: self.store.len(),
            ..self.stats
        }
    }
}

/// Counters describing how the specializer has been used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecializerStats {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    pub generated: u64,
    pub evictions: u64,
    pub live: usize,
}

impl SpecializerStats {
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / self.lookups as f64
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::runtime::jit::backend::ClosureArtifact;
    use crate::runtime::jit::specialization::MatchScore;

    /// Binding keyed by a multiplier; only identical multipliers match.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Factor(u32);

    impl Binding for Factor {
        fn match_with(&self, requested: &Self) -> MatchScore {
            if self == requested {
                MatchScore::MATCH
            } else {
                MatchScore::MISMATCH
            }
        }
    }

    type Entry = std::sync::Arc<dyn Fn(u32) -> u32 + Send + Sync>;

    #[derive(Default)]
    struct Multiplier {
        generated: Vec<u32>,
        refuse: bool,
    }

    impl CodeGenerator<Factor> for Multiplier {
        type Artifact = ClosureArtifact<Entry>;

        fn generate(&mut self, binding: &Factor) -> anyhow::Result<Self::Artifact> {
            if self.refuse {
                bail!("backend refused factor {}", binding.0);
            }
            self.generated.push(binding.0);
            let factor = binding.0;
            let entry: Entry = std::sync::Arc::new(move |x: u32| x * factor);
            Ok(ClosureArtifact::new(format!("mul{factor}"), entry))
        }
    }

    #[test]
    fn miss_generates_then_hit_reuses() {
        let mut specializer = Specializer::new(Multiplier::default());
        assert_eq!(specializer.call(Factor(3), (7,)).unwrap(), 21);
        assert_eq!(specializer.call(Factor(3), (5,)).unwrap(), 15);
        assert_eq!(specializer.call(Factor(4), (5,)).unwrap(), 20);

        assert_eq!(specializer.generator().generated, vec![3, 4]);
        let stats = specializer.stats();
        assert_eq!((stats.lookups, stats.hits, stats.misses), (3, 1, 2));
        assert_eq!(stats.live, 2);
    }

    #[test]
    fn generation_failure_is_surfaced_and_stores_nothing() {
        let mut specializer = Specializer::new(Multiplier {
            refuse: true,
            ..Multiplier::default()
        });
        let err = specializer.specialize(Factor(2)).unwrap_err();
        assert!(matches!(err, SpecializationError::Generation(_)));
        assert!(specializer.store().is_empty());
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let config = SpecializerConfig {
            max_entries: Some(2),
            ..SpecializerConfig::default()
        };
        let mut specializer = Specializer::with_config(Multiplier::default(), config);
        let two = specializer.specialize(Factor(2)).unwrap();
        let three = specializer.specialize(Factor(3)).unwrap();
        assert_eq!(specializer.specialize(Factor(2)).unwrap(), two);

        let four = specializer.specialize(Factor(4)).unwrap();
        assert!(specializer.specialization(three).is_none());
        assert!(specializer.specialization(two).is_some());
        assert!(specializer.specialization(four).is_some());
        assert_eq!(specializer.stats().evictions, 1);
    }

    #[test]
    fn seeded_entries_take_part_in_eviction() {
        let config = SpecializerConfig {
            max_entries: Some(1),
            eviction: crate::runtime::jit::cache::EvictionKind::Fifo,
            ..SpecializerConfig::default()
        };
        let mut specializer = Specializer::with_config(Multiplier::default(), config);
        let entry: Entry = std::sync::Arc::new(|x: u32| x);
        let seeded = specializer.seed(ClosureArtifact::new("identity", entry), Factor(1));
        assert_eq!(specializer.call(Factor(1), (9,)).unwrap(), 9);

        specializer.specialize(Factor(6)).unwrap();
        assert!(specializer.specialization(seeded).is_none());
        assert_eq!(specializer.store().len(), 1);
    }

    #[test]
    fn custom_policy_replaces_configured_one() {
        let config = SpecializerConfig {
            max_entries: Some(2),
            ..SpecializerConfig::default()
        };
        let mut specializer = Specializer::with_config(Multiplier::default(), config)
            .with_eviction_policy(Box::new(crate::runtime::jit::cache::FifoEvictionPolicy));
        let two = specializer.specialize(Factor(2)).unwrap();
        specializer.specialize(Factor(3)).unwrap();
        specializer.specialize(Factor(2)).unwrap();
        specializer.specialize(Factor(5)).unwrap();

        assert!(specializer.specialization(two).is_none());
        assert_eq!(specializer.stats().hit_rate(), 0.25);
    }

    #[test]
    fn capacity_read_from_environment_lookup_bounds_the_store() {
        use crate::runtime::jit::config::{ENV_EVICTION, ENV_MAX_ENTRIES};

        let config = SpecializerConfig::from_lookup(|key| match key {
            ENV_MAX_ENTRIES => Some("1".to_string()),
            ENV_EVICTION => Some("fifo".to_string()),
            _ => None,
        })
        .unwrap();
        let mut specializer = Specializer::with_config(Multiplier::default(), config);
        let two = specializer.specialize(Factor(2)).unwrap();
        let three = specializer.specialize(Factor(3)).unwrap();

        assert!(specializer.specialization(two).is_none());
        assert!(specializer.specialization(three).is_some());
        assert_eq!(
            specializer.config().strategy,
            crate::runtime::jit::specialization::FindStrategy::Best
        );
    }
}
