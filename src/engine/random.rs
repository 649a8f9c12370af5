// src/engine/random.rs

use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};

/// Source of randomness for quiz drawing and classroom codes.
///
/// Production code uses [`RngSource`]; tests plug in scripted sources.
pub trait RandomSource {
    fn next(&mut self) -> u64;

    /// Index in `0..bound`. Returns 0 for an empty range.
    ///
    /// The default reduces `next()` modulo `bound`, which suits scripted
    /// sources. Sources backed by a real generator override it.
    fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next() % bound as u64) as usize
    }
}

/// Adapts any `rand` generator to [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<StdRng> {
    /// OS-seeded generator. `Send`, so it can live across `.await` points in handlers.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn next(&mut self) -> u64 {
        self.0.next_u64()
    }

    /// Unbiased: delegates to `gen_range`.
    fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.0.gen_range(0..bound)
    }
}
