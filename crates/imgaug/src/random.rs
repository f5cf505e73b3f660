//! Explicit random states for augmenters.
//!
//! Every operation that needs randomness takes a `&mut RandomState`; there is
//! no process-wide generator. Background workers each own one, derived from
//! the base seed and the worker id so that runs are reproducible.

use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

/// Seed used by [`RandomState::default`].
pub const DEFAULT_SEED: u64 = 42;

/// Exclusive upper bound for seeds drawn from a parent state.
pub const DERIVED_SEED_BOUND: u64 = 1_000_000;

/// A seedable pseudo-random generator. `Clone` copies the full generator
/// state, so a clone replays the same sequence as the original.
#[derive(Debug, Clone)]
pub struct RandomState {
    rng: StdRng,
}

impl RandomState {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Same as [`RandomState::new`]; reads better at call sites that turn a
    /// previously drawn seed into a generator.
    pub fn derive(seed: u64) -> Self {
        Self::new(seed)
    }

    /// Non-reproducible state seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Fixed-seed state for call sites that must pass one but never sample.
    pub fn dummy() -> Self {
        Self::new(1)
    }

    /// State for background worker `worker_id`.
    /// Seed formula: base_seed + worker_id
    pub fn for_worker(base_seed: u64, worker_id: usize) -> Self {
        Self::new(base_seed.wrapping_add(worker_id as u64))
    }

    /// Independent copy with the same generator state.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Draws a seed in `[0, DERIVED_SEED_BOUND)` for a child state.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random_range(0..DERIVED_SEED_BOUND)
    }

    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.rng.random_bool(p)
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.rng.random_range(range)
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for RandomState {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Creates a new state from `seed`, or from a seed drawn from `parent`.
///
/// Drawing a small seed and constructing a fresh generator is cheaper than
/// copying the parent's full generator state.
pub fn new_random_state(parent: &mut RandomState, seed: Option<u64>) -> RandomState {
    match seed {
        Some(seed) => RandomState::new(seed),
        None => RandomState::new(parent.next_seed()),
    }
}
