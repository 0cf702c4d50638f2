//! Depth-bounded stochastic path tracing over material boundaries.
//!
//! Every boundary hit is shaded from the hit material:
//!
//! - a light returns the accumulated color weight times its color,
//! - past the depth cutoff the path contributes nothing,
//! - anything else spawns one diffuse bounce in a random direction turned
//!   back into the side the ray came from, plus a mirror reflection when the
//!   material reflects.
//!
//! One call to [`PathTracer::trace`] is a single sample of a noisy estimator.
//! Callers average many samples per pixel, for example with
//! [`PathTracer::trace_average`].

use rand::rngs::StdRng;
use tracing::trace;

use crate::color::Color;
use crate::coord::VoxelCoord;
use crate::error::VoxelResult;
use crate::material::MaterialTable;
use crate::raycast::{BoundaryHit, Ray, cast};
use crate::sampler::DirectionSampler;
use crate::volume::Volume;

/// Configuration for [`PathTracer`].
///
/// # Example
///
/// ```
/// use cf_voxtrace::TraceConfig;
///
/// let config = TraceConfig::new().with_max_depth(5).with_seed(42);
/// assert_eq!(config.max_depth, 5);
/// assert_eq!(config.epsilon, 1e-4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceConfig {
    /// Paths stop contributing once a non-light hit is shaded at a depth
    /// greater than this.
    pub max_depth: u32,
    /// Distance stepped back from a boundary before spawning new rays.
    pub epsilon: f64,
    /// Skip empty space using the volume's distance field when it has one.
    pub use_distance_field: bool,
    /// Optional seed for reproducible results.
    pub seed: Option<u64>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            epsilon: 1e-4,
            use_distance_field: true,
            seed: None,
        }
    }
}

impl TraceConfig {
    /// Create a new trace configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depth cutoff.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the step-back distance.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enable or disable distance-field skipping.
    #[must_use]
    pub const fn with_distance_field(mut self, enabled: bool) -> Self {
        self.use_distance_field = enabled;
        self
    }

    /// Set a random seed for reproducibility.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Color weight and recursion depth carried along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceContext {
    /// Product of the color weights of every surface so far.
    pub color: Color,
    /// Number of bounces or reflections taken so far.
    pub depth: u32,
}

impl TraceContext {
    /// Context of a primary ray.
    pub const ROOT: Self = Self {
        color: Color::WHITE,
        depth: 0,
    };

    /// Context one level deeper with the weight scaled by `weight`.
    #[must_use]
    pub fn deeper(self, weight: Color) -> Self {
        Self {
            color: self.color * weight,
            depth: self.depth + 1,
        }
    }
}

/// Counters accumulated over every trace of a [`PathTracer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceStats {
    /// Rays cast, primary and secondary.
    pub rays: usize,
    /// Paths ended by the depth cutoff.
    pub cutoffs: usize,
    /// Rays that left the volume without a boundary.
    pub escaped: usize,
}

/// Path tracer over a read-only volume and material table.
///
/// # Example
///
/// ```
/// use cf_voxtrace::{
///     Color, DenseVoxelGrid, Material, MaterialTable, PathTracer, Ray, TraceConfig, Volume,
///     VoxelCoord,
/// };
/// use nalgebra::{Point2, Vector2};
///
/// let mut materials = MaterialTable::new();
/// let air = materials.push(Material::default());
/// let lamp = materials.push(Material::light(Color::new(1.0, 0.5, 0.25)));
///
/// let mut grid: DenseVoxelGrid<2> = DenseVoxelGrid::with_material(8, air).unwrap();
/// grid.set_material(VoxelCoord::new([4, 4]), lamp).unwrap();
///
/// let mut tracer = PathTracer::new(&grid, &materials, TraceConfig::new().with_seed(1));
/// let ray = Ray::new(Point2::new(0.0, 4.5), Vector2::new(1.0, 0.0));
/// assert_eq!(tracer.trace(&ray).unwrap(), Color::new(1.0, 0.5, 0.25));
/// ```
#[derive(Debug)]
pub struct PathTracer<'a, V, const D: usize>
where
    V: Volume<D> + ?Sized,
{
    volume: &'a V,
    materials: &'a MaterialTable,
    config: TraceConfig,
    sampler: DirectionSampler<StdRng>,
    stats: TraceStats,
}

impl<'a, V, const D: usize> PathTracer<'a, V, D>
where
    V: Volume<D> + ?Sized,
{
    /// Creates a tracer. The random stream is seeded from `config.seed`, or
    /// from system entropy when no seed is set.
    pub fn new(volume: &'a V, materials: &'a MaterialTable, config: TraceConfig) -> Self {
        let sampler = config
            .seed
            .map_or_else(DirectionSampler::from_entropy, DirectionSampler::seeded);
        Self {
            volume,
            materials,
            config,
            sampler,
            stats: TraceStats::default(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Counters accumulated since construction.
    #[must_use]
    pub const fn stats(&self) -> TraceStats {
        self.stats
    }

    /// Traces one sample along `ray`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::VoxelError::DegenerateDirection`] for an invalid ray,
    /// [`crate::VoxelError::OutOfBounds`] if the origin is outside the volume,
    /// or [`crate::VoxelError::InvalidMaterial`] if a hit material is missing
    /// from the table.
    pub fn trace(&mut self, ray: &Ray<D>) -> VoxelResult<Color> {
        let color = self.trace_ray(ray, TraceContext::ROOT)?;
        trace!(r = color.r, g = color.g, b = color.b, "Traced primary ray");
        Ok(color)
    }

    /// Traces every ray and returns the mean color, black for no rays.
    ///
    /// # Errors
    ///
    /// Fails on the first ray that [`PathTracer::trace`] fails on.
    pub fn trace_average<I>(&mut self, rays: I) -> VoxelResult<Color>
    where
        I: IntoIterator<Item = Ray<D>>,
    {
        let mut sum = Color::BLACK;
        let mut samples = 0usize;
        for ray in rays {
            sum += self.trace(&ray)?;
            samples += 1;
        }
        if samples == 0 {
            return Ok(Color::BLACK);
        }
        #[allow(clippy::cast_precision_loss)]
        let samples = samples as f64;
        Ok(sum / samples)
    }

    fn trace_ray(&mut self, ray: &Ray<D>, ctx: TraceContext) -> VoxelResult<Color> {
        self.stats.rays += 1;
        match cast(self.volume, ray, self.config.use_distance_field)? {
            Some(hit) => self.shade(ray, &hit, ctx),
            None => {
                self.stats.escaped += 1;
                Ok(Color::BLACK)
            }
        }
    }

    /// Spawns a secondary ray; origins pushed outside the volume by the
    /// step-back contribute nothing.
    fn trace_secondary(&mut self, ray: &Ray<D>, ctx: TraceContext) -> VoxelResult<Color> {
        if !self.volume.contains(VoxelCoord::from_point_floor(&ray.origin)) {
            self.stats.escaped += 1;
            return Ok(Color::BLACK);
        }
        self.trace_ray(ray, ctx)
    }

    fn shade(&mut self, ray: &Ray<D>, hit: &BoundaryHit<D>, ctx: TraceContext) -> VoxelResult<Color> {
        let material = *self.materials.get(hit.material)?;
        if material.light {
            return Ok(ctx.color * material.color);
        }
        if ctx.depth > self.config.max_depth {
            self.stats.cutoffs += 1;
            trace!(depth = ctx.depth, material = hit.material, "Depth cutoff");
            return Ok(Color::BLACK);
        }

        let start = ray.point_at(hit.t - self.config.epsilon);
        let incoming = ray.direction[hit.axis];

        let mut bounce = self.sampler.sample_direction::<D>();
        let away = bounce[hit.axis].abs();
        bounce[hit.axis] = if incoming > 0.0 { -away } else { away };
        let mut result = self.trace_secondary(&Ray::new(start, bounce), ctx.deeper(material.color))?;

        if material.reflection > 0.0 {
            let mut mirrored = ray.direction;
            mirrored[hit.axis] = -incoming;
            result += self.trace_secondary(
                &Ray::new(start, mirrored),
                ctx.deeper(Color::gray(material.reflection)),
            )?;
        }

        Ok(result)
    }
}
