//! Ray traversal through voxel volumes.
//!
//! Traversal uses the DDA (Digital Differential Analyzer) walk of Amanatides
//! and Woo. For each axis the walk tracks the ray parameter of the next cell
//! boundary on that axis and always advances across the nearest one, so every
//! cell the ray passes through is visited exactly once.
//!
//! [`cast`] runs the walk against any [`Volume`] and stops at the first cell
//! whose material differs from the cell the ray started in.
//!
//! # Example
//!
//! ```
//! use cf_voxtrace::{cast, DenseVoxelGrid, Ray, Volume, VoxelCoord};
//! use nalgebra::{Point2, Vector2};
//!
//! let mut grid: DenseVoxelGrid<2> = DenseVoxelGrid::new(8).unwrap();
//! grid.set_material(VoxelCoord::new([4, 4]), 1).unwrap();
//!
//! let ray = Ray::new(Point2::new(0.0, 4.5), Vector2::new(1.0, 0.0));
//! let hit = cast(&grid, &ray, false).unwrap().unwrap();
//!
//! assert_eq!(hit.material, 1);
//! assert_eq!(hit.axis, 0);
//! assert!((hit.t - 4.0).abs() < 1e-12);
//! ```

use nalgebra::{Point, SVector};

use crate::coord::VoxelCoord;
use crate::error::{VoxelError, VoxelResult};
use crate::material::MaterialIndex;
use crate::volume::Volume;

/// A ray defined by an origin point and a direction vector.
///
/// The direction does not need to be normalized. Components may be zero,
/// in which case the ray never crosses a boundary on that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray<const D: usize> {
    /// The origin of the ray.
    pub origin: Point<f64, D>,
    /// The direction of the ray (not necessarily normalized).
    pub direction: SVector<f64, D>,
}

impl<const D: usize> Ray<D> {
    /// Creates a new ray with the given origin and direction.
    #[must_use]
    pub const fn new(origin: Point<f64, D>, direction: SVector<f64, D>) -> Self {
        Self { origin, direction }
    }

    /// Returns the point along the ray at parameter `t`.
    ///
    /// The point is computed as `origin + t * direction`.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxtrace::Ray;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::origin(), Vector3::new(2.0, 0.0, 0.0));
    /// let p = ray.point_at(3.0);
    /// assert!((p.x - 6.0).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point<f64, D> {
        self.origin + self.direction * t
    }

    /// Checks that the ray can be traversed.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::DegenerateDirection`] if the direction is zero,
    /// has a non-finite component, or if the origin is non-finite.
    pub fn validate(&self) -> VoxelResult<()> {
        let finite = self.direction.iter().all(|c| c.is_finite())
            && self.origin.iter().all(|c| c.is_finite());
        if finite && self.direction.iter().any(|&c| c != 0.0) {
            Ok(())
        } else {
            Err(VoxelError::DegenerateDirection {
                direction: self.direction.iter().copied().collect(),
            })
        }
    }

    /// Number of axes the ray moves along.
    #[must_use]
    pub fn moving_axes(&self) -> usize {
        self.direction.iter().filter(|&&c| c != 0.0).count()
    }

    /// Creates an iterator over the cells this ray enters.
    #[must_use]
    pub fn walk(&self) -> GridWalk<D> {
        GridWalk::new(self)
    }
}

/// An iterator that walks the cells along a ray using the DDA algorithm.
///
/// The walk starts in the cell containing the origin, which is not yielded
/// itself (see [`GridWalk::current`]). Each item is a cell entered by the
/// ray, the parameter `t` at which it enters, and the axis it crossed.
/// Ties between axes go to the lowest axis index.
///
/// The walk is unbounded; callers stop it when it leaves their volume.
///
/// # Example
///
/// ```
/// use cf_voxtrace::{Ray, VoxelCoord};
/// use nalgebra::{Point2, Vector2};
///
/// let ray = Ray::new(Point2::new(0.5, 0.5), Vector2::new(1.0, 1.0));
/// let cells: Vec<_> = ray.walk().take(2).map(|(c, _, axis)| (c, axis)).collect();
/// assert_eq!(
///     cells,
///     vec![(VoxelCoord::new([1, 0]), 0), (VoxelCoord::new([1, 1]), 1)]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct GridWalk<const D: usize> {
    /// Current cell.
    current: VoxelCoord<D>,
    /// Step direction for each axis (-1, 0 or 1).
    step: [i32; D],
    /// Ray parameter of the next boundary on each axis.
    t_max: [f64; D],
    /// Ray parameter between boundaries on each axis.
    t_delta: [f64; D],
}

impl<const D: usize> GridWalk<D> {
    fn new(ray: &Ray<D>) -> Self {
        let current = VoxelCoord::from_point_floor(&ray.origin);

        let mut step = [0i32; D];
        let mut t_max = [f64::INFINITY; D];
        let mut t_delta = [f64::INFINITY; D];

        for i in 0..D {
            let dir = ray.direction[i];
            if dir == 0.0 {
                continue;
            }
            step[i] = if dir > 0.0 { 1 } else { -1 };
            t_delta[i] = (1.0 / dir).abs();

            // Distance to the first boundary, relative to the offset inside the cell
            let cell = f64::from(current[i]);
            let boundary = if dir > 0.0 { cell + 1.0 } else { cell };
            t_max[i] = (boundary - ray.origin[i]) / dir;
        }

        Self {
            current,
            step,
            t_max,
            t_delta,
        }
    }

    /// The cell the walk is in.
    #[must_use]
    pub const fn current(&self) -> VoxelCoord<D> {
        self.current
    }

    /// Axis with the smallest pending boundary parameter, lowest index on ties.
    fn nearest_axis(&self) -> usize {
        let mut axis = 0;
        for i in 1..D {
            if self.t_max[i] < self.t_max[axis] {
                axis = i;
            }
        }
        axis
    }
}

impl<const D: usize> Iterator for GridWalk<D> {
    type Item = (VoxelCoord<D>, f64, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if D == 0 {
            return None;
        }
        let axis = self.nearest_axis();
        let t = self.t_max[axis];
        if !t.is_finite() {
            return None;
        }

        self.current[axis] = self.current[axis].wrapping_add(self.step[axis]);
        self.t_max[axis] += self.t_delta[axis];

        Some((self.current, t, axis))
    }
}

/// The first material boundary found along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHit<const D: usize> {
    /// Material of the cell that was entered.
    pub material: MaterialIndex,
    /// Ray parameter at which the boundary was crossed.
    pub t: f64,
    /// Axis whose boundary plane was crossed.
    pub axis: usize,
    /// The cell that was entered.
    pub coord: VoxelCoord<D>,
    /// Number of unit steps taken, not counting cells skipped using the
    /// volume's clearance.
    pub steps: usize,
}

/// Casts a ray through `volume` and returns the first material boundary.
///
/// Returns `Ok(None)` if the ray leaves the volume without crossing a
/// boundary. When `use_distance_field` is set and the volume reports a
/// [`Volume::clearance`] at the start cell, the origin is first advanced
/// past the cells known to share its material. Hits are identical with and
/// without the skip; only `steps` differs.
///
/// # Errors
///
/// Returns [`VoxelError::DegenerateDirection`] for a ray that fails
/// [`Ray::validate`], or [`VoxelError::OutOfBounds`] if the origin lies
/// outside the volume.
pub fn cast<V, const D: usize>(
    volume: &V,
    ray: &Ray<D>,
    use_distance_field: bool,
) -> VoxelResult<Option<BoundaryHit<D>>>
where
    V: Volume<D> + ?Sized,
{
    ray.validate()?;

    let start = VoxelCoord::from_point_floor(&ray.origin);
    let material = volume.material(start)?;

    let t_skip = if use_distance_field {
        skip_distance(volume, start, ray)
    } else {
        0.0
    };
    let walk_ray = if t_skip > 0.0 {
        Ray::new(ray.point_at(t_skip), ray.direction)
    } else {
        *ray
    };

    for (steps, (coord, t, axis)) in walk_ray.walk().enumerate() {
        if !volume.contains(coord) {
            return Ok(None);
        }
        let entered = volume.material(coord)?;
        if entered != material {
            return Ok(Some(BoundaryHit {
                material: entered,
                t: t_skip + t,
                axis,
                coord,
                steps: steps + 1,
            }));
        }
    }

    Ok(None)
}

/// Ray parameter that can be skipped from `start` without leaving its material.
///
/// With clearance `s` over `k` moving axes, every cell within L1 distance
/// `s` of `start` along the walk shares its material. Advancing by
/// `(s - k) / |direction|_1` moves each axis by less than `s - k + 1` cells
/// in total, keeping one cell of margin per axis.
fn skip_distance<V, const D: usize>(volume: &V, start: VoxelCoord<D>, ray: &Ray<D>) -> f64
where
    V: Volume<D> + ?Sized,
{
    let Some(clearance) = volume.clearance(start, &ray.direction) else {
        return 0.0;
    };
    let margin = ray.moving_axes();
    let clearance = clearance as usize;
    if clearance <= margin {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let cells = (clearance - margin) as f64;
    cells / ray.direction.lp_norm(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::dense::DenseVoxelGrid;
    use crate::sparse::SparseVoxelTree;
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Point3, Vector2, Vector3};

    fn scenario_grid() -> DenseVoxelGrid<2> {
        let mut grid = DenseVoxelGrid::new(8).unwrap();
        grid.set_material(VoxelCoord::new([4, 4]), 1).unwrap();
        grid
    }

    #[test]
    fn test_ray_new() {
        let ray = Ray::new(Point2::new(1.0, 2.0), Vector2::new(0.0, 1.0));
        assert_eq!(ray.origin, Point2::new(1.0, 2.0));
        assert_eq!(ray.moving_axes(), 1);
    }

    #[test]
    fn test_validate() {
        assert!(Ray::new(Point2::origin(), Vector2::new(1.0, 0.0)).validate().is_ok());
        assert_eq!(
            Ray::new(Point2::origin(), Vector2::zeros()).validate(),
            Err(VoxelError::DegenerateDirection {
                direction: vec![0.0, 0.0]
            })
        );
        assert!(
            Ray::new(Point2::origin(), Vector2::new(f64::NAN, 1.0))
                .validate()
                .is_err()
        );
        assert!(
            Ray::new(Point2::new(f64::INFINITY, 0.0), Vector2::new(1.0, 1.0))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_walk_along_x() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::x());
        let cells: Vec<_> = ray.walk().take(3).collect();
        assert_eq!(cells[0], (VoxelCoord::new([1, 0, 0]), 0.5, 0));
        assert_eq!(cells[1], (VoxelCoord::new([2, 0, 0]), 1.5, 0));
        assert_eq!(cells[2], (VoxelCoord::new([3, 0, 0]), 2.5, 0));
    }

    #[test]
    fn test_walk_negative_direction() {
        let ray = Ray::new(Point2::new(2.25, 0.5), Vector2::new(-0.5, 0.0));
        let mut walk = ray.walk();
        assert_eq!(walk.current(), VoxelCoord::new([2, 0]));
        let (coord, t, axis) = walk.next().unwrap();
        assert_eq!(coord, VoxelCoord::new([1, 0]));
        assert_relative_eq!(t, 0.5);
        assert_eq!(axis, 0);
    }

    #[test]
    fn test_walk_tie_breaks_lowest_axis() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::new(1.0, 1.0, 1.0));
        let axes: Vec<_> = ray.walk().take(3).map(|(_, _, axis)| axis).collect();
        assert_eq!(axes, vec![0, 1, 2]);
    }

    #[test]
    fn test_walk_from_negative_origin_floors() {
        let ray = Ray::new(Point2::new(-0.5, 0.5), Vector2::new(1.0, 0.0));
        let walk = ray.walk();
        assert_eq!(walk.current(), VoxelCoord::new([-1, 0]));
    }

    #[test]
    fn test_cast_scenario() {
        let grid = scenario_grid();
        let ray = Ray::new(Point2::new(0.0, 4.5), Vector2::new(1.0, 0.0));
        let hit = cast(&grid, &ray, false).unwrap().unwrap();
        assert_eq!(hit.material, 1);
        assert_eq!(hit.axis, 0);
        assert_eq!(hit.coord, VoxelCoord::new([4, 4]));
        assert_relative_eq!(hit.t, 4.0);
        assert_eq!(hit.steps, 4);
    }

    #[test]
    fn test_cast_scenario_sparse() {
        let mut tree: SparseVoxelTree<2> = SparseVoxelTree::new(3).unwrap();
        tree.set_material(VoxelCoord::new([4, 4]), 1).unwrap();
        let ray = Ray::new(Point2::new(0.0, 4.5), Vector2::new(1.0, 0.0));
        let hit = cast(&tree, &ray, true).unwrap().unwrap();
        assert_eq!(hit.material, 1);
        assert_eq!(hit.axis, 0);
        assert_relative_eq!(hit.t, 4.0);
    }

    #[test]
    fn test_cast_with_distance_field_skips() {
        let mut grid = scenario_grid();
        grid.recalculate_distances();
        let ray = Ray::new(Point2::new(0.0, 4.5), Vector2::new(1.0, 0.0));
        let hit = cast(&grid, &ray, true).unwrap().unwrap();
        assert_eq!(hit.material, 1);
        assert_eq!(hit.axis, 0);
        assert_eq!(hit.coord, VoxelCoord::new([4, 4]));
        assert_relative_eq!(hit.t, 4.0);
        // Clearance 3 with one moving axis skips the first two cells
        assert_eq!(hit.steps, 2);
    }

    #[test]
    fn test_cast_leaving_volume() {
        let grid = scenario_grid();
        let ray = Ray::new(Point2::new(0.5, 0.5), Vector2::new(1.0, 0.3));
        assert_eq!(cast(&grid, &ray, false).unwrap(), None);
    }

    #[test]
    fn test_cast_leaving_through_low_side() {
        let grid = scenario_grid();
        let ray = Ray::new(Point2::new(3.5, 3.5), Vector2::new(-1.0, -2.0));
        assert_eq!(cast(&grid, &ray, false).unwrap(), None);
    }

    #[test]
    fn test_cast_exits_from_inside_material() {
        let grid = scenario_grid();
        let ray = Ray::new(Point2::new(4.5, 4.5), Vector2::new(0.0, -1.0));
        let hit = cast(&grid, &ray, false).unwrap().unwrap();
        assert_eq!(hit.material, 0);
        assert_eq!(hit.axis, 1);
        assert_eq!(hit.coord, VoxelCoord::new([4, 3]));
        assert_relative_eq!(hit.t, 0.5);
    }

    #[test]
    fn test_cast_origin_outside_volume() {
        let grid = scenario_grid();
        let ray = Ray::new(Point2::new(-0.5, 4.5), Vector2::new(1.0, 0.0));
        assert!(matches!(
            cast(&grid, &ray, false),
            Err(VoxelError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_cast_rejects_zero_direction() {
        let grid = scenario_grid();
        let ray = Ray::new(Point2::new(1.0, 1.0), Vector2::zeros());
        assert!(matches!(
            cast(&grid, &ray, false),
            Err(VoxelError::DegenerateDirection { .. })
        ));
    }

    #[test]
    fn test_cast_terminates_within_bound() {
        let grid: DenseVoxelGrid<3> = DenseVoxelGrid::new(16).unwrap();
        let directions = [
            Vector3::new(1.0, 1e-3, 2.0),
            Vector3::new(-0.3, 0.7, -0.1),
            Vector3::new(1e-6, -1e-6, 1e-6),
        ];
        for direction in directions {
            let ray = Ray::new(Point3::new(7.3, 8.1, 6.9), direction);
            let mut walk = ray.walk();
            let steps = walk
                .position(|(c, _, _)| !c.is_within(16))
                .unwrap();
            assert!(steps < 16 * 3);
            assert_eq!(cast(&grid, &ray, false).unwrap(), None);
        }
    }

    #[test]
    fn test_diagonal_skip_matches_unit_steps() {
        let mut grid: DenseVoxelGrid<2> = DenseVoxelGrid::new(32).unwrap();
        for y in 20..24 {
            for x in 18..26 {
                grid.set_material(VoxelCoord::new([x, y]), 2).unwrap();
            }
        }
        let ray = Ray::new(Point2::new(1.2, 2.7), Vector2::new(0.8, 0.9));
        let plain = cast(&grid, &ray, false).unwrap().unwrap();

        grid.recalculate_distances();
        let fast = cast(&grid, &ray, true).unwrap().unwrap();

        assert_eq!(fast.material, plain.material);
        assert_eq!(fast.axis, plain.axis);
        assert_eq!(fast.coord, plain.coord);
        assert_relative_eq!(fast.t, plain.t, epsilon = 1e-9);
        assert!(fast.steps < plain.steps);
    }
}
