// Copyright (c) 2026 rezky_nightky

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    Rng, SeedableRng,
};

/// Source of every random decision the rain makes.
pub trait Selector {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Uniform value in `[0, 1)`.
    fn chance(&mut self) -> f64;
}

pub struct RandomSelector {
    rng: StdRng,
    unit: Uniform<f64>,
}

impl RandomSelector {
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            unit: Uniform::new(0.0, 1.0).expect("valid range"),
        }
    }
}

impl Selector for RandomSelector {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len.max(1))
    }

    fn chance(&mut self) -> f64 {
        self.unit.sample(&mut self.rng)
    }
}

#[cfg(test)]
pub use scripted::ScriptedSelector;

#[cfg(test)]
mod scripted {
    use std::collections::VecDeque;

    use super::Selector;

    /// Replays fixed picks and chances. Once a script runs dry the fallback
    /// value is returned forever.
    #[derive(Debug, Clone)]
    pub struct ScriptedSelector {
        picks: VecDeque<usize>,
        chances: VecDeque<f64>,
        fallback_pick: usize,
        fallback_chance: f64,
        pub chance_calls: usize,
    }

    impl ScriptedSelector {
        pub fn new(picks: &[usize], chances: &[f64]) -> Self {
            Self {
                picks: picks.iter().copied().collect(),
                chances: chances.iter().copied().collect(),
                fallback_pick: 0,
                fallback_chance: 0.5,
                chance_calls: 0,
            }
        }

        /// Never resets, always draws the first glyph.
        pub fn constant(chance: f64) -> Self {
            let mut s = Self::new(&[], &[]);
            s.fallback_chance = chance;
            s
        }
    }

    impl Selector for ScriptedSelector {
        fn pick(&mut self, len: usize) -> usize {
            self.picks.pop_front().unwrap_or(self.fallback_pick) % len.max(1)
        }

        fn chance(&mut self) -> f64 {
            self.chance_calls += 1;
            self.chances.pop_front().unwrap_or(self.fallback_chance)
        }
    }
}
