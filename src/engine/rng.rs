//! Deterministic random number generation.
//!
//! Used to seed small perturbations of initial conditions, which is how
//! sensitivity to initial conditions is demonstrated. Given the same master
//! seed every sequence is bitwise-identical across runs and platforms.

use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Seeded PCG generator with independent partitioned streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRng {
    master_seed: u64,
    stream: u64,
    rng: Pcg64,
}

impl SimRng {
    /// Create a new RNG with the given master seed.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            stream: 0,
            rng: Pcg64::seed_from_u64(master_seed),
        }
    }

    /// Get the master seed.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Get current stream index.
    #[must_use]
    pub const fn stream(&self) -> u64 {
        self.stream
    }

    /// Split off `n` independent generators.
    ///
    /// Stream `i` depends only on the master seed and its index, so asking
    /// for more partitions later never changes the earlier ones.
    #[must_use]
    pub fn partition(&mut self, n: usize) -> Vec<Self> {
        let partitions: Vec<Self> = (0..n)
            .map(|i| {
                let stream = self.stream + i as u64;
                let seed = self
                    .master_seed
                    .wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
                Self {
                    master_seed: self.master_seed,
                    stream,
                    rng: Pcg64::seed_from_u64(seed),
                }
            })
            .collect();

        self.stream += n as u64;
        partitions
    }

    /// Generate a random f64 in [0, 1).
    pub fn gen_f64(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Generate a random f64 between the two bounds.
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn gen_range_f64(&mut self, min: f64, max: f64) -> f64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        lo + (hi - lo) * self.gen_f64()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Falsification: same seed gives the same sequence.
        #[test]
        fn prop_seed_determinism(seed in any::<u64>()) {
            let mut a = SimRng::new(seed);
            let mut b = SimRng::new(seed);
            for _ in 0..16 {
                prop_assert_eq!(a.gen_f64().to_bits(), b.gen_f64().to_bits());
            }
        }

        /// Falsification: range samples stay within bounds.
        #[test]
        fn prop_range_bounds(seed in any::<u64>(), lo in -100.0f64..0.0, width in 0.001f64..100.0) {
            let mut rng = SimRng::new(seed);
            let v = rng.gen_range_f64(lo, lo + width);
            prop_assert!(v >= lo && v <= lo + width);
        }
    }
}
