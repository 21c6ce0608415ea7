use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::runtime::jit::error::SpecializationError;
use crate::runtime::jit::specialization::SpecializationId;

/// Eviction policy for a capacity-bounded specialization store
pub trait EvictionPolicy: Send + Sync {
    /// Decide which specialization to evict; `live` is in insertion order
    fn select_victim(&mut self, live: &[SpecializationId]) -> Option<SpecializationId>;

    /// Called when a specialization is reused
    fn on_access(&mut self, id: SpecializationId);

    /// Called when a specialization is stored
    fn on_add(&mut self, id: SpecializationId);

    /// Called when a specialization is evicted
    fn on_remove(&mut self, id: SpecializationId);
}

/// LRU (Least Recently Used) eviction policy
#[derive(Debug, Default)]
pub struct LruEvictionPolicy {
    access_order: Vec<SpecializationId>,
}

impl LruEvictionPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvictionPolicy for LruEvictionPolicy {
    fn select_victim(&mut self, live: &[SpecializationId]) -> Option<SpecializationId> {
        self.access_order
            .iter()
            .copied()
            .find(|id| live.contains(id))
            // Entries stored behind our back have never been touched.
            .or_else(|| {
                live.iter()
                    .copied()
                    .find(|id| !self.access_order.contains(id))
            })
    }

    fn on_access(&mut self, id: SpecializationId) {
        // Move to end (most recently used)
        self.access_order.retain(|k| *k != id);
        self.access_order.push(id);
    }

    fn on_add(&mut self, id: SpecializationId) {
        self.access_order.push(id);
    }

    fn on_remove(&mut self, id: SpecializationId) {
        self.access_order.retain(|k| *k != id);
    }
}

/// FIFO policy: the oldest stored specialization goes first
#[derive(Debug, Default)]
pub struct FifoEvictionPolicy;

impl EvictionPolicy for FifoEvictionPolicy {
    fn select_victim(&mut self, live: &[SpecializationId]) -> Option<SpecializationId> {
        live.first().copied()
    }

    fn on_access(&mut self, _id: SpecializationId) {}

    fn on_add(&mut self, _id: SpecializationId) {}

    fn on_remove(&mut self, _id: SpecializationId) {}
}

/// Configurable choice of built-in policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionKind {
    #[default]
    Lru,
    Fifo,
}

impl EvictionKind {
    pub fn build(self) -> Box<dyn EvictionPolicy> {
        match self {
            Self::Lru => Box::new(LruEvictionPolicy::new()),
            Self::Fifo => Box::new(FifoEvictionPolicy),
        }
    }
}

impl fmt::Display for EvictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lru => "lru",
            Self::Fifo => "fifo",
        })
    }
}

impl FromStr for EvictionKind {
    type Err = SpecializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "fifo" => Ok(Self::Fifo),
            _ => Err(SpecializationError::UnknownEvictionPolicy(s.to_string())),
        }
    }
}
