//! Error types for volume, traversal and shading operations.

use crate::material::MaterialIndex;

/// Errors that can occur while building, querying or tracing a voxel volume.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum VoxelError {
    /// A coordinate lies outside `[0, size)` on at least one axis.
    #[error("coordinate {coord:?} is out of bounds for volume of size {size}")]
    OutOfBounds {
        /// The offending coordinate components.
        coord: Vec<i32>,
        /// Edge length of the volume.
        size: u32,
    },

    /// A material index does not reference an entry of the material table.
    #[error("material index {index} is out of range for a table of {table_len} materials")]
    InvalidMaterial {
        /// The index that was looked up.
        index: MaterialIndex,
        /// Number of materials in the table.
        table_len: usize,
    },

    /// A ray direction has zero length or non-finite components.
    #[error("ray direction {direction:?} is degenerate")]
    DegenerateDirection {
        /// The offending direction components.
        direction: Vec<f64>,
    },

    /// The requested tree depth is outside the supported range.
    #[error("tree depth {depth} is invalid, expected 1..={max}")]
    InvalidDepth {
        /// Requested depth.
        depth: u32,
        /// Largest supported depth for this dimension.
        max: u32,
    },

    /// The requested grid edge length is zero.
    #[error("grid size must be positive, got {size}")]
    InvalidSize {
        /// Requested edge length.
        size: u32,
    },

    /// The total cell count of a dense grid does not fit in memory addressing.
    #[error("a {dimension}-dimensional grid of size {size} is too large")]
    VolumeTooLarge {
        /// Requested edge length.
        size: u32,
        /// Spatial dimension.
        dimension: usize,
    },

    /// The spatial dimension is zero or too large to address children.
    #[error("spatial dimension {0} is not supported")]
    InvalidDimension(usize),
}

/// Result type for voxel operations.
pub type VoxelResult<T> = Result<T, VoxelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = VoxelError::OutOfBounds {
            coord: vec![8, -1],
            size: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("[8, -1]"));
        assert!(msg.contains("size 8"));
    }

    #[test]
    fn test_invalid_material_message() {
        let err = VoxelError::InvalidMaterial {
            index: 7,
            table_len: 3,
        };
        assert_eq!(
            err.to_string(),
            "material index 7 is out of range for a table of 3 materials"
        );
    }
}
