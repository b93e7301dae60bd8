//! Deterministic random streams.
//!
//! Every season gets its own manager, and every system draws from a named
//! stream derived from (seed, season, system name). A tick therefore depends
//! only on the state it is given.

use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    seed: u64,
    season: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64, season: u64) -> Self {
        Self {
            seed,
            season,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let seed = derive_seed(self.seed, self.season, name);
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        SystemRng { inner: entry }
    }
}

fn derive_seed(seed: u64, season: u64, name: &str) -> u64 {
    const MUL: u64 = 6364136223846793005;
    const INC: u64 = 1442695040888963407;
    let mut mixed = seed.wrapping_mul(MUL).wrapping_add(INC);
    for byte in name.bytes() {
        mixed ^= byte as u64;
        mixed = mixed.wrapping_mul(MUL).wrapping_add(INC);
    }
    mixed ^= season.wrapping_mul(69069);
    mixed.wrapping_mul(MUL).wrapping_add(INC)
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
