use std::collections::HashMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const POPULATION_STREAM: &str = "population";
pub const BEHAVIOR_STREAM: &str = "behavior";
pub const WEATHER_STREAM: &str = "weather";

/// Master seed plus lazily created named streams.
///
/// Each stream is seeded from `(master seed, stream name)` alone, so requesting
/// streams in a different order never changes what any of them yields.
pub struct RngManager {
    seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Forget every stream; the next request starts it over.
    pub fn reset(&mut self) {
        self.streams.clear();
    }

    pub fn stream(&mut self, name: &str) -> StreamRng<'_> {
        let seed = self.derive_seed(name);
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        StreamRng { inner: entry }
    }

    /// Mix the master seed with an FNV-1a hash of the stream name.
    fn derive_seed(&self, name: &str) -> u64 {
        let name_hash = name.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        });
        let mut seed = self.seed;
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= name_hash;
        seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407)
    }
}

pub struct StreamRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for StreamRng<'a> {
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

/// Draw helpers matching the probability conventions of the rules.
pub trait RngExt {
    /// Uniform draw in `[0, 1)`.
    fn uniform(&mut self) -> f64;
    /// Bernoulli trial that succeeds when the draw is at most `probability`.
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.uniform() <= probability
    }
}
