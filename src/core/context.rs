//! Per-run mutable state shared by the pipeline stages.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::point::PointIdAllocator;
use crate::config::InputConfig;

/// Owns the point id allocator and the single random generator of a run.
///
/// The generator is seeded once, so a run is reproducible given the same
/// seed and input.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub ids: PointIdAllocator,
    pub rng: StdRng,
}

impl RunContext {
    pub fn new(seed: u64, first_point_id: u64) -> Self {
        Self {
            ids: PointIdAllocator::new(first_point_id),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self::new(config.random_seed, config.first_point_id)
    }
}
