//! Uniform random unit directions.

use nalgebra::SVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Half the edge of the cube scalar draws come from.
const HALF_EXTENT: f64 = 0.5;

/// Draws unit vectors uniformly distributed over the `D`-sphere.
///
/// Each candidate is a vector of `D` independent scalars in `[-0.5, 0.5]`.
/// Candidates longer than `0.5` are rejected so the accepted ones are
/// uniform over the ball; normalizing them then gives a uniform direction.
/// Normalizing cube samples directly would favour the corners.
///
/// # Example
///
/// ```
/// use cf_voxtrace::DirectionSampler;
///
/// let mut sampler = DirectionSampler::seeded(7);
/// let dir = sampler.sample_direction::<4>();
/// assert!((dir.norm() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct DirectionSampler<R: Rng> {
    rng: R,
}

impl DirectionSampler<StdRng> {
    /// A reproducible sampler.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// A sampler seeded from system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> DirectionSampler<R> {
    /// Wraps an existing random number generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// One uniform scalar in `[-0.5, 0.5]`.
    pub fn next_scalar(&mut self) -> f64 {
        self.rng.gen_range(-HALF_EXTENT..=HALF_EXTENT)
    }

    /// A uniformly distributed unit vector.
    ///
    /// Zero-length candidates are rejected along with the ones outside the
    /// ball, so the result is always normalizable.
    pub fn sample_direction<const D: usize>(&mut self) -> SVector<f64, D> {
        loop {
            let candidate = SVector::<f64, D>::from_fn(|_, _| self.next_scalar());
            let length = candidate.norm();
            if length > 0.0 && length <= HALF_EXTENT {
                return candidate / length;
            }
        }
    }
}
