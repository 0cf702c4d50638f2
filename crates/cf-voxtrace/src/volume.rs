//! The storage capability shared by sparse and dense volumes.

use nalgebra::SVector;

use crate::coord::VoxelCoord;
use crate::error::{VoxelError, VoxelResult};
use crate::material::MaterialIndex;

/// A cubic volume assigning a material index to every coordinate in `[0, size)^D`.
///
/// Traversal, shading and editing are written once against this trait.
/// Implementations must reject coordinates outside the volume with
/// [`VoxelError::OutOfBounds`] without mutating anything.
pub trait Volume<const D: usize> {
    /// Edge length along every axis.
    fn size(&self) -> u32;

    /// Returns the material at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::OutOfBounds`] if `coord` is outside the volume.
    fn material(&self, coord: VoxelCoord<D>) -> VoxelResult<MaterialIndex>;

    /// Assigns `material` to `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::OutOfBounds`] if `coord` is outside the volume.
    fn set_material(&mut self, coord: VoxelCoord<D>, material: MaterialIndex) -> VoxelResult<()>;

    /// Number of cells a ray leaving `coord` along `direction` may skip without
    /// crossing a material boundary, measured as an L1 cell distance over the
    /// axes `direction` moves along.
    ///
    /// Volumes without an acceleration structure return `None`.
    fn clearance(&self, coord: VoxelCoord<D>, direction: &SVector<f64, D>) -> Option<u32> {
        let _ = (coord, direction);
        None
    }

    /// Returns `true` if `coord` is inside the volume.
    fn contains(&self, coord: VoxelCoord<D>) -> bool {
        coord.is_within(self.size())
    }
}

/// Builds the out-of-bounds error for `coord`.
pub(crate) fn out_of_bounds<const D: usize>(coord: VoxelCoord<D>, size: u32) -> VoxelError {
    VoxelError::OutOfBounds {
        coord: coord.0.to_vec(),
        size,
    }
}

/// Validates `coord` against a volume of edge length `size`.
pub(crate) fn check_bounds<const D: usize>(coord: VoxelCoord<D>, size: u32) -> VoxelResult<()> {
    if coord.is_within(size) {
        Ok(())
    } else {
        Err(out_of_bounds(coord, size))
    }
}
