//! Seeded randomness for solver runs.
//!
//! A run is reproducible from one master seed. Each consumer of randomness
//! draws from its own [`Stream`], whose seed is SipHash-1-3 (zero keys) of the
//! master seed and the stream tag, so adding draws to one stream never shifts
//! another.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Independent consumers of randomness within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Gaussian couplings of the sampled instance.
    Couplings,
    /// Initial cavity fields.
    Messages,
    /// Master seed of the `n`-th point of a parameter sweep.
    SweepPoint(u64),
}

impl Stream {
    fn tag(self) -> (u64, u64) {
        match self {
            Stream::Couplings => (0, 0),
            Stream::Messages => (0, 1),
            Stream::SweepPoint(index) => (1, index),
        }
    }
}

/// Seed of `stream` under `master_seed`. Stable across platforms and releases.
pub fn stream_seed(master_seed: u64, stream: Stream) -> u64 {
    let (family, index) = stream.tag();
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(family);
    hasher.write_u64(index);
    hasher.finish()
}

/// `StdRng` owned by exactly one stream of one run.
///
/// Never backed by thread-local or OS entropy.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Seeds a generator directly.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator for `stream` of the run started from `master_seed`.
    pub fn for_stream(master_seed: u64, stream: Stream) -> Self {
        Self::from_seed(stream_seed(master_seed, stream))
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
