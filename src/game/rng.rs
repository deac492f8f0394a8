use rand::Rng;

/// Source of uniform draws in [0, 1).
///
/// The generator consumes draws from this trait in a fixed, documented order
/// so that seeded runs stay reproducible. The seeded implementation below is
/// deliberately isolated from any global RNG state.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Inclusive integer draw from [min, max]. Requires `min <= max`.
    fn in_range(&mut self, min: u32, max: u32) -> u32 {
        let span = (max - min + 1) as f64;
        min + (self.next_f64() * span) as u32
    }

    fn coin(&mut self) -> bool {
        self.next_f64() < 0.5
    }
}

/// 32-bit rolling hash of a seed string: `h = h * 31 + char`, wrapping.
///
/// Stable across calls and platforms; daily-challenge decks depend on it.
pub fn hash_seed(seed: &str) -> u32 {
    seed.chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

/// Deterministic stream seeded from a string.
///
/// Weyl-sequence increment with a mulberry32-style finalizer; each call
/// yields one uniform value in [0, 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededStream {
    state: u32,
}

impl SeededStream {
    pub fn from_seed(seed: &str) -> Self {
        Self {
            state: hash_seed(seed),
        }
    }
}

impl RandomSource for SeededStream {
    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        ((t ^ (t >> 14)) as f64) / 4_294_967_296.0
    }
}

/// Non-deterministic source backed by the thread rng, for unseeded rounds.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSource;

impl RandomSource for ThreadSource {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}
