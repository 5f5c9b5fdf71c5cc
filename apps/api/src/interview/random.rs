use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the only non-deterministic choices in question generation.
/// Tests inject a fixed sequence; production uses [`StdRandom`].
pub trait RandomSource: Send {
    /// Returns an index in `0..len`. `len` is always non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// `StdRng`-backed random source, optionally seeded for reproducible sessions.
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl RandomSource for StdRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Replays a fixed list of picks, cycling when exhausted. Values are reduced modulo `len`.
#[cfg(test)]
pub struct SequenceRandom {
    picks: Vec<usize>,
    cursor: usize,
}

#[cfg(test)]
impl SequenceRandom {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }
}

#[cfg(test)]
impl RandomSource for SequenceRandom {
    fn pick(&mut self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let value = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        value % len
    }
}
