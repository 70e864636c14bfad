//! Seeded randomness for generation.
//!
//! The generator's determinism contract includes the PRNG itself: a
//! 32-bit mulberry-style mixer whose [0, 1) outputs drive every shuffle,
//! the solution construction and score tie-breaking. Swapping the
//! algorithm would change every generated puzzle for a given seed, so it
//! lives here as part of the public surface.

use std::time::{SystemTime, UNIX_EPOCH};

/// Deterministic 32-bit mixer. The state advances by a fixed odd
/// constant, then two xorshift-multiply rounds whiten it.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next draw normalized to [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform index in `0..n`. `n` must be non-zero.
    pub fn pick(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        let i = (self.next_f64() * n as f64) as usize;
        i.min(n - 1)
    }

    /// In-place Fisher–Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.pick(i + 1);
            items.swap(i, j);
        }
    }
}

/// Hashes a textual seed with a 32-bit FNV-1a roll.
pub fn seed_from_text(text: &str) -> u32 {
    let mut hash = 0x811C_9DC5u32;
    for byte in text.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Time-derived fallback seed for callers that did not supply one.
pub fn seed_from_time() -> u32 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    millis as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Mulberry32::new(1234);
        let mut b = Mulberry32::new(1234);
        for _ in 0..64 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Mulberry32::new(1);
        let mut b = Mulberry32::new(2);
        let collisions = (0..16).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(collisions < 16);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Mulberry32::new(99);
        let mut items: Vec<usize> = (0..10).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn text_seeds_are_stable() {
        assert_eq!(seed_from_text("zebra"), seed_from_text("zebra"));
        assert_ne!(seed_from_text("zebra"), seed_from_text("zebrb"));
        // FNV-1a offset basis for the empty string.
        assert_eq!(seed_from_text(""), 0x811C_9DC5);
    }

    proptest! {
        #[test]
        fn outputs_stay_in_unit_interval(seed in any::<u32>()) {
            let mut rng = Mulberry32::new(seed);
            for _ in 0..32 {
                let x = rng.next_f64();
                prop_assert!((0.0..1.0).contains(&x));
            }
        }

        #[test]
        fn pick_stays_in_range(seed in any::<u32>(), n in 1usize..100) {
            let mut rng = Mulberry32::new(seed);
            for _ in 0..16 {
                prop_assert!(rng.pick(n) < n);
            }
        }
    }
}
