//! Deterministic utilities for reproducible training
//!
//! A 64-bit LCG drives shuffling and bootstrap sampling, and a small
//! xxhash-style mixer derives independent per-tree seeds so a forest is
//! identical regardless of how many threads fitted it.

use std::num::Wrapping;

/// Linear Congruential Generator (Knuth MMIX constants)
///
/// Outputs the high 32 bits of the state; the low bits of a power-of-two
/// LCG have short periods.
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: Wrapping(seed),
        };
        // Discard the first output so nearby seeds diverge immediately
        rng.next_u32();
        rng
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 >> 32) as u32
    }

    /// Uniform-ish value in `[0, max)`; returns 0 when `max == 0`
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as usize
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }
}

/// Deterministic xxhash64-like mix of `data` under `seed`
pub fn xxhash64(data: &[u64], seed: u64) -> u64 {
    const PRIME1: u64 = 0x9E3779B185EBCA87;
    const PRIME2: u64 = 0xC2B2AE3D27D4EB4F;
    const PRIME3: u64 = 0x165667B19E3779F9;
    const PRIME5: u64 = 0x85EBCA77C2B2AE63;

    let mut h = seed.wrapping_add(PRIME5);

    for &val in data {
        h = h.wrapping_add(val.wrapping_mul(PRIME3));
        h = h.rotate_left(17).wrapping_mul(PRIME2);
    }

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}

/// Seed for the `tree_idx`-th tree of a forest trained with `seed`
pub fn tree_seed(seed: u64, tree_idx: usize) -> u64 {
    xxhash64(&[tree_idx as u64], seed)
}
