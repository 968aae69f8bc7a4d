//! Random number generation helpers: seeded streams, substream derivation,
//! Bernoulli trials and shuffling.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Fast RNG used for every stream in the engine.
pub type FastRng = Xoshiro256PlusPlus;

/// Stream index reserved for sequential decisions (shuffle, negative class).
pub const MASTER_STREAM: u64 = 0;

/// # Overview
///
/// Creates a fast RNG seeded from a u64 value.
///
/// # Examples
///
/// ```
/// use tsetlin_engine::utils::rng_from_seed;
///
/// let mut rng = rng_from_seed(42);
/// ```
#[inline]
pub fn rng_from_seed(seed: u64) -> FastRng {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

/// # Overview
///
/// Draws a fresh seed from the thread-local entropy source.
#[inline]
pub fn entropy_seed() -> u64 {
    rand::rng().random()
}

/// # Overview
///
/// SplitMix64 finaliser. Bijective on u64.
#[inline]
pub fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// # Overview
///
/// Seed for substream `index` of the machine seeded with `seed`.
///
/// Index [`MASTER_STREAM`] is the sequential stream, clause `k` uses
/// `k + 1`. Streams do not depend on the number of workers.
#[inline]
pub fn stream_seed(seed: u64, index: u64) -> u64 {
    mix64(seed ^ mix64(index.wrapping_add(0x9E37_79B9_7F4A_7C15)))
}

/// # Overview
///
/// RNG for substream `index`, see [`stream_seed`].
#[inline]
pub fn stream_rng(seed: u64, index: u64) -> FastRng {
    rng_from_seed(stream_seed(seed, index))
}

/// # Overview
///
/// Performs a Bernoulli trial. The probability is clamped into `[0, 1]`
/// first, so out-of-range values degrade to "never" or "always".
#[inline]
pub fn bernoulli<R: Rng>(rng: &mut R, probability: f32) -> bool {
    rng.random::<f32>() < probability.clamp(0.0, 1.0)
}

/// # Overview
///
/// Shuffles a slice in-place using Fisher-Yates algorithm.
#[inline]
pub fn shuffle<T, R: Rng>(slice: &mut [T], rng: &mut R) {
    let len = slice.len();
    for i in (1..len).rev() {
        let j = rng.random_range(0..=i as u64) as usize;
        slice.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_deterministic() {
        let mut rng1 = rng_from_seed(42);
        let mut rng2 = rng_from_seed(42);

        for _ in 0..100 {
            assert_eq!(rng1.random::<u64>(), rng2.random::<u64>());
        }
    }

    #[test]
    fn streams_are_distinct() {
        let seeds: Vec<u64> = (0..64).map(|i| stream_seed(7, i)).collect();
        let mut sorted = seeds.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), seeds.len());
        assert_ne!(stream_seed(7, 1), stream_seed(8, 1));
    }

    #[test]
    fn bernoulli_probability() {
        let mut rng = rng_from_seed(42);
        let trials = 10000;
        let count = (0..trials).filter(|_| bernoulli(&mut rng, 0.5)).count();

        let ratio = count as f64 / trials as f64;
        assert!((ratio - 0.5).abs() < 0.05);
    }

    #[test]
    fn bernoulli_clamps() {
        let mut rng = rng_from_seed(1);
        for _ in 0..1000 {
            assert!(bernoulli(&mut rng, 7.5));
            assert!(!bernoulli(&mut rng, -2.0));
            assert!(!bernoulli(&mut rng, 0.0));
        }
    }

    #[test]
    fn shuffle_preserves_elements() {
        let mut data = vec![1, 2, 3, 4, 5];
        let original = data.clone();
        let mut rng = rng_from_seed(42);

        shuffle(&mut data, &mut rng);

        data.sort();
        assert_eq!(data, original);
    }
}
