//! Flat dense voxel storage with an optional distance field.

use nalgebra::SVector;
use tracing::debug;

use crate::coord::VoxelCoord;
use crate::distance::{DistanceField, RelaxationReport};
use crate::error::{VoxelError, VoxelResult};
use crate::material::MaterialIndex;
use crate::volume::{Volume, check_bounds};

/// A dense `size^D` voxel volume stored as one flat array.
///
/// Cells are laid out with axis 0 varying fastest. The grid can carry a
/// [`DistanceField`] computed by [`DenseVoxelGrid::recalculate_distances`];
/// any write that changes a material discards it, and traversal falls back
/// to unit stepping until it is recomputed.
///
/// # Example
///
/// ```
/// use cf_voxtrace::{DenseVoxelGrid, Volume, VoxelCoord};
///
/// let mut grid: DenseVoxelGrid<2> = DenseVoxelGrid::new(8).unwrap();
/// grid.set_material(VoxelCoord::new([4, 4]), 1).unwrap();
///
/// let report = grid.recalculate_distances();
/// assert!(grid.has_distance_field());
/// assert!(report.max_passes <= report.pass_bound);
///
/// grid.set_material(VoxelCoord::new([0, 0]), 2).unwrap();
/// assert!(!grid.has_distance_field());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseVoxelGrid<const D: usize> {
    size: u32,
    strides: [usize; D],
    cells: Vec<MaterialIndex>,
    distances: Option<DistanceField<D>>,
}

impl<const D: usize> DenseVoxelGrid<D> {
    /// Creates a grid of edge length `size` filled with material 0.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::InvalidSize`] for a zero size,
    /// [`VoxelError::VolumeTooLarge`] if `size^D` cells cannot be addressed,
    /// or [`VoxelError::InvalidDimension`] if `D` is zero.
    pub fn new(size: u32) -> VoxelResult<Self> {
        Self::with_material(size, 0)
    }

    /// Creates a grid of edge length `size` filled with `material`.
    ///
    /// # Errors
    ///
    /// Same as [`DenseVoxelGrid::new`].
    pub fn with_material(size: u32, material: MaterialIndex) -> VoxelResult<Self> {
        if D == 0 {
            return Err(VoxelError::InvalidDimension(D));
        }
        if size == 0 {
            return Err(VoxelError::InvalidSize { size });
        }
        let too_large = VoxelError::VolumeTooLarge { size, dimension: D };
        if i32::try_from(size).is_err() {
            return Err(too_large);
        }

        let edge = usize::try_from(size).map_err(|_| too_large.clone())?;
        let mut strides = [0usize; D];
        let mut total = 1usize;
        for stride in &mut strides {
            *stride = total;
            total = total.checked_mul(edge).ok_or_else(|| too_large.clone())?;
        }

        debug!(dimension = D, size, cells = total, "Created dense voxel grid");
        Ok(Self {
            size,
            strides,
            cells: vec![material; total],
            distances: None,
        })
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Recomputes the distance field from the current contents.
    ///
    /// Must be called again after any material change before traversal can
    /// use the field.
    pub fn recalculate_distances(&mut self) -> RelaxationReport {
        let (field, report) = DistanceField::compute(self);
        self.distances = Some(field);
        report
    }

    /// The distance field, if one is present and consistent with the contents.
    #[must_use]
    pub const fn distance_field(&self) -> Option<&DistanceField<D>> {
        self.distances.as_ref()
    }

    /// Returns `true` if a consistent distance field is present.
    #[must_use]
    pub const fn has_distance_field(&self) -> bool {
        self.distances.is_some()
    }

    /// Per-axis strides of the flat layout.
    pub(crate) const fn strides(&self) -> &[usize; D] {
        &self.strides
    }

    /// Flat index of an in-bounds coordinate.
    #[allow(clippy::cast_sign_loss)]
    pub(crate) fn linear_index(&self, coord: VoxelCoord<D>) -> usize {
        coord
            .0
            .iter()
            .zip(self.strides.iter())
            .map(|(&c, &stride)| c as usize * stride)
            .sum()
    }

    /// Material at a flat index.
    pub(crate) fn cell(&self, index: usize) -> MaterialIndex {
        self.cells[index]
    }
}

impl<const D: usize> Volume<D> for DenseVoxelGrid<D> {
    fn size(&self) -> u32 {
        self.size
    }

    fn material(&self, coord: VoxelCoord<D>) -> VoxelResult<MaterialIndex> {
        check_bounds(coord, self.size)?;
        Ok(self.cells[self.linear_index(coord)])
    }

    fn set_material(&mut self, coord: VoxelCoord<D>, material: MaterialIndex) -> VoxelResult<()> {
        check_bounds(coord, self.size)?;
        let index = self.linear_index(coord);
        if self.cells[index] != material {
            self.cells[index] = material;
            self.distances = None;
        }
        Ok(())
    }

    fn clearance(&self, coord: VoxelCoord<D>, direction: &SVector<f64, D>) -> Option<u32> {
        let field = self.distances.as_ref()?;
        if !coord.is_within(self.size) {
            return None;
        }
        field.clearance(self.linear_index(coord), direction)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::range::GridRange;

    #[test]
    fn test_new_is_zero_filled() {
        let grid: DenseVoxelGrid<3> = DenseVoxelGrid::new(4).unwrap();
        assert_eq!(grid.cell_count(), 64);
        assert!(GridRange::<3>::cube(4).all(|c| grid.material(c).unwrap() == 0));
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            DenseVoxelGrid::<2>::new(0),
            Err(VoxelError::InvalidSize { size: 0 })
        );
        assert_eq!(
            DenseVoxelGrid::<0>::new(4),
            Err(VoxelError::InvalidDimension(0))
        );
        assert_eq!(
            DenseVoxelGrid::<8>::new(1 << 20),
            Err(VoxelError::VolumeTooLarge {
                size: 1 << 20,
                dimension: 8
            })
        );
    }

    #[test]
    fn test_linear_layout_axis0_fastest() {
        let grid: DenseVoxelGrid<3> = DenseVoxelGrid::new(5).unwrap();
        assert_eq!(grid.linear_index(VoxelCoord::new([1, 0, 0])), 1);
        assert_eq!(grid.linear_index(VoxelCoord::new([0, 1, 0])), 5);
        assert_eq!(grid.linear_index(VoxelCoord::new([0, 0, 1])), 25);
        assert_eq!(grid.linear_index(VoxelCoord::new([4, 4, 4])), 124);
    }

    #[test]
    fn test_round_trip() {
        let mut grid: DenseVoxelGrid<2> = DenseVoxelGrid::new(8).unwrap();
        for (i, c) in GridRange::<2>::cube(8).iter().enumerate() {
            grid.set_material(c, u32::try_from(i).unwrap()).unwrap();
        }
        for (i, c) in GridRange::<2>::cube(8).iter().enumerate() {
            assert_eq!(grid.material(c).unwrap(), u32::try_from(i).unwrap());
        }
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid: DenseVoxelGrid<2> = DenseVoxelGrid::new(4).unwrap();
        assert!(grid.material(VoxelCoord::new([4, 0])).is_err());
        assert!(grid.set_material(VoxelCoord::new([-1, 0]), 1).is_err());
    }

    #[test]
    fn test_write_discards_distance_field() {
        let mut grid: DenseVoxelGrid<2> = DenseVoxelGrid::new(4).unwrap();
        grid.recalculate_distances();
        // Same material keeps the field consistent
        grid.set_material(VoxelCoord::new([1, 1]), 0).unwrap();
        assert!(grid.has_distance_field());
        grid.set_material(VoxelCoord::new([1, 1]), 3).unwrap();
        assert!(!grid.has_distance_field());
        assert_eq!(
            grid.clearance(VoxelCoord::new([0, 0]), &SVector::from([1.0, 1.0])),
            None
        );
    }
}
