//! Random sources feeding the dice engine.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::engine::MAX_FACE;

/// Supplies single ten-sided die faces.
///
/// Implementations should return values in `1..=10`; the engine rejects
/// anything else as a broken source.
pub trait RandomSource {
    fn roll_d10(&mut self) -> u32;
}

/// Uniform d10 source backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Seeded from OS entropy; `Send`, so it can live in shared state.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn roll_d10(&mut self) -> u32 {
        self.rng.gen_range(1..=MAX_FACE)
    }
}

/// Replays a fixed list of faces, then yields `0` forever.
///
/// Used to reproduce a specific roll; the trailing `0` makes an
/// under-supplied script fail loudly instead of looping.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    faces: VecDeque<u32>,
}

impl ScriptedSource {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    /// Faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl RandomSource for ScriptedSource {
    fn roll_d10(&mut self) -> u32 {
        self.faces.pop_front().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_source_stays_in_range() {
        let mut source = RngSource::seeded(7);
        for _ in 0..1_000 {
            let face = source.roll_d10();
            assert!((1..=10).contains(&face), "face {} out of range", face);
        }
    }

    #[test]
    fn seeded_sources_are_reproducible() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        let xs: Vec<u32> = (0..20).map(|_| a.roll_d10()).collect();
        let ys: Vec<u32> = (0..20).map(|_| b.roll_d10()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn scripted_source_replays_then_yields_zero() {
        let mut source = ScriptedSource::new([3, 5]);
        assert_eq!(source.roll_d10(), 3);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.roll_d10(), 5);
        assert_eq!(source.roll_d10(), 0);
    }
}
