use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::binding::{Binding, MatchScore};
use super::function::{Artifact, Specialization, SpecializationId};
use crate::runtime::jit::cache::SpecializationMetadata;
use crate::runtime::jit::error::SpecializationError;

/// Which acceptable specialization a lookup returns when several could match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindStrategy {
    /// Earliest stored entry that does not mismatch.
    First,
    /// Most recently stored entry that does not mismatch.
    Last,
    /// Highest score; the earliest entry wins ties.
    #[default]
    Best,
}

impl FindStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Best => "best",
        }
    }
}

impl fmt::Display for FindStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindStrategy {
    type Err = SpecializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "best" => Ok(Self::Best),
            _ => Err(SpecializationError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Result of [`SpecializationStore::find`].
///
/// A miss carries no specialization and [`MatchScore::MISMATCH`].
pub struct Lookup<'a, A: Artifact, B> {
    pub specialization: Option<&'a Specialization<A, B>>,
    pub score: MatchScore,
}

impl<'a, A: Artifact, B> Lookup<'a, A, B> {
    pub const fn miss() -> Self {
        Self {
            specialization: None,
            score: MatchScore::MISMATCH,
        }
    }

    const fn hit(specialization: &'a Specialization<A, B>, score: MatchScore) -> Self {
        Self {
            specialization: Some(specialization),
            score,
        }
    }

    pub const fn is_hit(&self) -> bool {
        self.specialization.is_some()
    }

    pub fn id(&self) -> Option<SpecializationId> {
        self.specialization.map(Specialization::id)
    }
}

impl<A: Artifact, B> Clone for Lookup<'_, A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Artifact, B> Copy for Lookup<'_, A, B> {}

impl<A: Artifact, B> fmt::Debug for Lookup<'_, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("id", &self.id())
            .field("score", &self.score)
            .finish()
    }
}

/// Insertion-ordered owner of every live specialization.
///
/// Entries are addressed by [`SpecializationId`]; an id issued by `store`
/// keeps naming the same entry until that entry is evicted, however much the
/// store grows in between.
pub struct SpecializationStore<A: Artifact, B> {
    entries: Vec<Specialization<A, B>>,
    next_id: u64,
}

impl<A: Artifact, B: Binding> SpecializationStore<A, B> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Append a new specialization and return its identity.
    pub fn store(&mut self, artifact: A, binding: B) -> SpecializationId {
        self.store_with_generation_time(artifact, binding, Duration::ZERO)
    }

    pub fn store_with_generation_time(
        &mut self,
        artifact: A,
        binding: B,
        generation_time: Duration,
    ) -> SpecializationId {
        let id = SpecializationId::new(self.next_id);
        self.next_id += 1;
        self.entries.push(Specialization::new(
            id,
            artifact,
            binding,
            SpecializationMetadata::new(generation_time),
        ));
        debug!(specialization = %id, live = self.entries.len(), "stored specialization");
        id
    }

    /// Evict by identity. Returns whether the entry was present.
    pub fn evict(&mut self, id: SpecializationId) -> bool {
        self.remove(id).is_some()
    }

    /// Remove by identity and hand the entry back to the caller.
    pub fn remove(&mut self, id: SpecializationId) -> Option<Specialization<A, B>> {
        let position = self.entries.iter().position(|entry| entry.id() == id)?;
        let removed = self.entries.remove(position);
        debug!(specialization = %id, live = self.entries.len(), "evicted specialization");
        Some(removed)
    }

    /// Look up a specialization for `requested` using `strategy`.
    pub fn find(&self, requested: &B, strategy: FindStrategy) -> Lookup<'_, A, B> {
        let lookup = match strategy {
            FindStrategy::First => Self::first_acceptable(self.entries.iter(), requested),
            FindStrategy::Last => Self::first_acceptable(self.entries.iter().rev(), requested),
            FindStrategy::Best => self.find_best(requested),
        };
        trace!(
            %strategy,
            candidates = self.entries.len(),
            score = %lookup.score,
            hit = ?lookup.id(),
            "specialization lookup"
        );
        lookup
    }

    fn first_acceptable<'a>(
        mut entries: impl Iterator<Item = &'a Specialization<A, B>>,
        requested: &B,
    ) -> Lookup<'a, A, B> {
        entries
            .find_map(|entry| {
                let score = entry.binding().match_with(requested);
                (!score.is_mismatch()).then_some(Lookup::hit(entry, score))
            })
            .unwrap_or_else(Lookup::miss)
    }

    fn find_best(&self, requested: &B) -> Lookup<'_, A, B> {
        let mut best = Lookup::miss();
        for entry in &self.entries {
            let score = entry.binding().match_with(requested);
            if score.is_match() {
                return Lookup::hit(entry, score);
            }
            // Strict comparison keeps the earliest entry on ties.
            if score > best.score {
                best = Lookup::hit(entry, score);
            }
        }
        best
    }

    pub fn get(&self, id: SpecializationId) -> Option<&Specialization<A, B>> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn get_mut(&mut self, id: SpecializationId) -> Option<&mut Specialization<A, B>> {
        self.entries.iter_mut().find(|entry| entry.id() == id)
    }

    pub fn contains(&self, id: SpecializationId) -> bool {
        self.get(id).is_some()
    }

    /// Mark an entry as used. Returns false if it is not stored.
    pub fn record_access(&mut self, id: SpecializationId) -> bool {
        self.get_mut(id)
            .map(|entry| entry.metadata_mut().record_access())
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Specialization<A, B>> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl DoubleEndedIterator<Item = SpecializationId> + '_ {
        self.entries.iter().map(Specialization::id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<A: Artifact, B: Binding> Default for SpecializationStore<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::runtime::jit::backend::ClosureArtifact;

    /// Scores every request with a fixed value and counts how often it was asked.
    struct Fixed {
        score: MatchScore,
        calls: Rc<Cell<usize>>,
    }

    impl Fixed {
        fn new(score: MatchScore) -> Self {
            Self {
                score,
                calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Binding for Fixed {
        fn match_with(&self, _requested: &Self) -> MatchScore {
            self.calls.set(self.calls.get() + 1);
            self.score
        }
    }

    type Store = SpecializationStore<ClosureArtifact<fn() -> u32>, Fixed>;

    fn zero() -> u32 {
        0
    }

    fn one() -> u32 {
        1
    }

    fn other() -> u32 {
        99
    }

    fn artifact(value: u32) -> ClosureArtifact<fn() -> u32> {
        let entry: fn() -> u32 = match value {
            0 => zero,
            1 => one,
            _ => other,
        };
        ClosureArtifact::new(format!("value_{value}"), entry)
    }

    fn request() -> Fixed {
        Fixed::new(MatchScore::MISMATCH)
    }

    #[test]
    fn empty_store_misses_under_every_strategy() {
        let store = Store::new();
        for strategy in [FindStrategy::First, FindStrategy::Last, FindStrategy::Best] {
            let lookup = store.find(&request(), strategy);
            assert!(!lookup.is_hit());
            assert!(lookup.score.is_mismatch());
        }
    }

    #[test]
    fn first_and_last_skip_mismatches() {
        let mut store = Store::new();
        store.store(artifact(0), Fixed::new(MatchScore::MISMATCH));
        let low = store.store(artifact(1), Fixed::new(MatchScore::new(1)));
        let high = store.store(artifact(2), Fixed::new(MatchScore::new(50)));
        store.store(artifact(3), Fixed::new(MatchScore::MISMATCH));

        let first = store.find(&request(), FindStrategy::First);
        assert_eq!(first.id(), Some(low));
        assert_eq!(first.score, MatchScore::new(1));

        let last = store.find(&request(), FindStrategy::Last);
        assert_eq!(last.id(), Some(high));
        assert_eq!(last.score, MatchScore::new(50));
    }

    #[test]
    fn best_prefers_earliest_of_equal_scores() {
        let mut store = Store::new();
        store.store(artifact(0), Fixed::new(MatchScore::new(5)));
        let second = store.store(artifact(1), Fixed::new(MatchScore::new(9)));
        store.store(artifact(2), Fixed::new(MatchScore::new(9)));

        let lookup = store.find(&request(), FindStrategy::Best);
        assert_eq!(lookup.id(), Some(second));
        assert_eq!(lookup.score, MatchScore::new(9));
    }

    #[test]
    fn best_stops_at_perfect_match() {
        let mut store = Store::new();
        let perfect = store.store(artifact(0), Fixed::new(MatchScore::MATCH));
        let tail = Fixed::new(MatchScore::new(3));
        let tail_calls = Rc::clone(&tail.calls);
        store.store(artifact(1), tail);

        let lookup = store.find(&request(), FindStrategy::Best);
        assert_eq!(lookup.id(), Some(perfect));
        assert!(lookup.score.is_match());
        assert_eq!(tail_calls.get(), 0);
    }

    #[test]
    fn best_misses_when_everything_mismatches() {
        let mut store = Store::new();
        store.store(artifact(0), Fixed::new(MatchScore::MISMATCH));
        store.store(artifact(1), Fixed::new(MatchScore::MISMATCH));

        let lookup = store.find(&request(), FindStrategy::Best);
        assert!(!lookup.is_hit());
        assert!(lookup.score.is_mismatch());
    }

    #[test]
    fn evict_is_by_identity() {
        let mut store = Store::new();
        let first = store.store(artifact(0), Fixed::new(MatchScore::MATCH));
        let second = store.store(artifact(0), Fixed::new(MatchScore::MATCH));

        assert!(store.evict(first));
        assert!(!store.evict(first));
        assert_eq!(store.len(), 1);
        assert_eq!(store.find(&request(), FindStrategy::First).id(), Some(second));
    }

    #[test]
    fn ids_survive_growth() {
        let mut store = Store::new();
        let early = store.store(artifact(1), Fixed::new(MatchScore::new(1)));
        for _ in 0..1_000 {
            store.store(artifact(0), Fixed::new(MatchScore::MISMATCH));
        }
        assert_eq!(store.get(early).map(|s| s.invoke(()).unwrap()), Some(1));
        assert!(store.evict(early));
        assert_eq!(store.len(), 1_000);
    }

    #[test]
    fn record_access_updates_metadata() {
        let mut store = Store::new();
        let id = store.store(artifact(0), Fixed::new(MatchScore::MATCH));
        assert!(store.record_access(id));
        assert!(store.record_access(id));
        assert_eq!(store.get(id).map(|s| s.metadata().access_count), Some(2));
        store.clear();
        assert!(!store.record_access(id));
    }

    #[test]
    fn strategy_parsing_rejects_unknown_names() {
        assert_eq!("Best".parse::<FindStrategy>().unwrap(), FindStrategy::Best);
        assert_eq!(" last ".parse::<FindStrategy>().unwrap(), FindStrategy::Last);
        let err = "newest".parse::<FindStrategy>().unwrap_err();
        assert!(matches!(err, SpecializationError::UnknownStrategy(name) if name == "newest"));
    }
}
