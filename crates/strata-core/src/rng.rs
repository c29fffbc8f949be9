//! Per-job random number generators and seed derivation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

use crate::draws::DrawSource;

/// Random draw source owned by a single generation job.
///
/// Batches with a master seed give job `i` the handle
/// `RngHandle::from_seed(derive_substream_seed(master, i))`, which makes each
/// graph independent of the worker that built it. Unseeded batches use
/// [`RngHandle::from_entropy`].
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Seeds the handle deterministically.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds the handle from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl DrawSource for RngHandle {
    fn bernoulli(&mut self, probability: f64) -> bool {
        if probability.is_nan() {
            return false;
        }
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Seed of substream `substream` under `master_seed`.
///
/// SipHash-1-3 with zero keys over both values, stable across platforms.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
