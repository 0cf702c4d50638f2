//! Material descriptions referenced by voxel material indices.

use crate::color::Color;
use crate::error::{VoxelError, VoxelResult};

/// Index into a [`MaterialTable`]. Volumes store only these indices.
pub type MaterialIndex = u32;

/// Surface response of a material.
///
/// # Example
///
/// ```
/// use cf_voxtrace::{Color, Material};
///
/// let lamp = Material::light(Color::WHITE);
/// assert!(lamp.light);
///
/// let mirror = Material::mirror(0.5);
/// assert_eq!(mirror.reflection, 0.5);
/// assert_eq!(mirror.color, Color::BLACK);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Diffuse albedo, or emitted radiance for lights.
    pub color: Color,
    /// Mirror reflection weight; no reflection ray is spawned when zero.
    pub reflection: f64,
    /// Reserved for transmissive shading.
    pub transparency: f64,
    /// Reserved for refractive shading.
    pub refraction: f64,
    /// Emissive materials terminate paths.
    pub light: bool,
}

impl Material {
    /// A purely diffuse material.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            reflection: 0.0,
            transparency: 0.0,
            refraction: 0.0,
            light: false,
        }
    }

    /// An emissive material.
    #[must_use]
    pub const fn light(color: Color) -> Self {
        Self {
            light: true,
            ..Self::new(color)
        }
    }

    /// A black mirror with the given reflection weight.
    #[must_use]
    pub const fn mirror(reflection: f64) -> Self {
        Self {
            reflection,
            ..Self::new(Color::BLACK)
        }
    }

    /// Sets the reflection weight.
    #[must_use]
    pub const fn with_reflection(mut self, reflection: f64) -> Self {
        self.reflection = reflection;
        self
    }
}

/// Read-only lookup table from [`MaterialIndex`] to [`Material`].
///
/// # Example
///
/// ```
/// use cf_voxtrace::{Color, Material, MaterialTable, VoxelError};
///
/// let table = MaterialTable::from(vec![Material::new(Color::BLACK)]);
/// assert!(table.get(0).is_ok());
/// assert!(matches!(table.get(1), Err(VoxelError::InvalidMaterial { .. })));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            materials: Vec::new(),
        }
    }

    /// Appends a material and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if the table already holds `u32::MAX` materials.
    pub fn push(&mut self, material: Material) -> MaterialIndex {
        let index = MaterialIndex::try_from(self.materials.len())
            .unwrap_or_else(|_| panic!("material table is full"));
        self.materials.push(material);
        index
    }

    /// Looks up a material.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::InvalidMaterial`] if `index` is not in the table.
    pub fn get(&self, index: MaterialIndex) -> VoxelResult<&Material> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.materials.get(i))
            .ok_or(VoxelError::InvalidMaterial {
                index,
                table_len: self.materials.len(),
            })
    }

    /// Number of materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns `true` if the table has no materials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Iterates the materials in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }
}

impl From<Vec<Material>> for MaterialTable {
    fn from(materials: Vec<Material>) -> Self {
        Self { materials }
    }
}

impl FromIterator<Material> for MaterialTable {
    fn from_iter<I: IntoIterator<Item = Material>>(iter: I) -> Self {
        Self {
            materials: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_sequential_indices() {
        let mut table = MaterialTable::new();
        assert!(table.is_empty());
        assert_eq!(table.push(Material::new(Color::WHITE)), 0);
        assert_eq!(table.push(Material::light(Color::WHITE)), 1);
        assert_eq!(table.len(), 2);
        assert!(table.get(1).unwrap().light);
    }

    #[test]
    fn test_get_out_of_range_is_error() {
        let table: MaterialTable = std::iter::repeat_n(Material::default(), 3).collect();
        assert_eq!(
            table.get(3),
            Err(VoxelError::InvalidMaterial {
                index: 3,
                table_len: 3
            })
        );
        assert!(table.get(u32::MAX).is_err());
    }

    #[test]
    fn test_constructors() {
        let m = Material::new(Color::gray(0.5)).with_reflection(0.25);
        assert_eq!(m.reflection, 0.25);
        assert!(!m.light);
        assert_eq!(m.transparency, 0.0);
        assert_eq!(m.refraction, 0.0);
    }
}
