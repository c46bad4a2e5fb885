//! Outcome generation behind a swappable randomness seam.
//!
//! The draw is a trust boundary: the engine only ever sees the trait, so the
//! uniform RNG below can be replaced by an auditable source without touching
//! settlement.

use crate::types::{Outcome, Period};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces exactly one outcome per period. Pure function of the random
/// source; no other inputs.
pub trait ResultGenerator: Send {
    fn draw(&mut self, period: Period) -> Outcome;
}

/// Uniform draw over [0, 9] from any `rand::Rng`.
pub struct RngResultGenerator<R: Rng> {
    rng: R,
}

impl RngResultGenerator<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RngResultGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> ResultGenerator for RngResultGenerator<R> {
    fn draw(&mut self, period: Period) -> Outcome {
        let number: u8 = self.rng.gen_range(0..=9);
        Outcome::for_number(period, number)
    }
}
