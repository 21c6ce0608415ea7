use std::time::{Duration, Instant};

/// Bookkeeping attached to every stored specialization
#[derive(Debug, Clone)]
pub struct SpecializationMetadata {
    pub created_at: Instant,
    pub last_accessed: Instant,
    pub access_count: u64,
    pub generation_time: Duration,
}

impl SpecializationMetadata {
    pub fn new(generation_time: Duration) -> Self {
        let now = Instant::now();
        Self {
            created_at: now,
            last_accessed: now,
            access_count: 0,
            generation_time,
        }
    }

    pub fn record_access(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl Default for SpecializationMetadata {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
