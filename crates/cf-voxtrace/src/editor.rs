//! Shape fills and region queries over a volume.
//!
//! Every shape is first reduced to its bounding range clamped against
//! `[0, size)`, so fills never touch coordinates outside the volume and
//! never fail part-way through.
//!
//! # Example
//!
//! ```
//! use cf_voxtrace::{SparseVoxelTree, VoxelCoord, VoxelEditor};
//!
//! let mut tree: SparseVoxelTree<2> = SparseVoxelTree::new(4).unwrap();
//! let mut editor = VoxelEditor::new(&mut tree);
//!
//! let written = editor
//!     .fill_rectangle(VoxelCoord::new([-2, 3]), VoxelCoord::new([4, 2]), 1)
//!     .unwrap();
//! assert_eq!(written, 4);
//! assert!(editor.all_in_rectangle(VoxelCoord::new([0, 3]), VoxelCoord::new([2, 2]), |m| m == 1));
//!
//! let written = editor.fill_circle(VoxelCoord::new([8, 8]), 2, 2).unwrap();
//! assert_eq!(written, 9);
//! ```

use tracing::debug;

use crate::coord::VoxelCoord;
use crate::error::VoxelResult;
use crate::material::MaterialIndex;
use crate::range::GridRange;
use crate::volume::Volume;

/// Writes shapes into a volume during scene construction.
///
/// The editor holds the only mutable borrow of the volume, so no trace can
/// observe a fill in progress.
#[derive(Debug)]
pub struct VoxelEditor<'a, V, const D: usize>
where
    V: Volume<D> + ?Sized,
{
    volume: &'a mut V,
}

impl<'a, V, const D: usize> VoxelEditor<'a, V, D>
where
    V: Volume<D> + ?Sized,
{
    /// Creates an editor over `volume`.
    pub const fn new(volume: &'a mut V) -> Self {
        Self { volume }
    }

    /// The edited volume.
    #[must_use]
    pub fn volume(&self) -> &V {
        self.volume
    }

    /// Writes `material` to `[origin, origin + extent)` clamped to the volume.
    ///
    /// Returns the number of cells written. An extent with a non-positive
    /// component writes nothing.
    ///
    /// # Errors
    ///
    /// Propagates write errors from the volume. Clamping keeps every write
    /// in bounds, so the built-in volumes never fail here.
    pub fn fill_rectangle(
        &mut self,
        origin: VoxelCoord<D>,
        extent: VoxelCoord<D>,
        material: MaterialIndex,
    ) -> VoxelResult<usize> {
        let range = self.rectangle(origin, extent);
        let written = self.fill_where(&range, material, |_| true)?;
        debug!(
            written,
            material,
            origin = ?origin.as_array(),
            extent = ?extent.as_array(),
            "Filled rectangle"
        );
        Ok(written)
    }

    /// Writes `material` to every cell of `[center - radius, center + radius)`
    /// strictly closer than `radius` to `center`.
    ///
    /// Cells at exactly `radius` are left alone. Returns the number of cells
    /// written; a non-positive radius writes nothing.
    ///
    /// # Errors
    ///
    /// Same as [`VoxelEditor::fill_rectangle`].
    pub fn fill_circle(
        &mut self,
        center: VoxelCoord<D>,
        radius: i32,
        material: MaterialIndex,
    ) -> VoxelResult<usize> {
        if radius <= 0 {
            return Ok(0);
        }
        let lo = offset(center, VoxelCoord::splat(-radius));
        let hi = offset(center, VoxelCoord::splat(radius));
        let range = GridRange::clamped(lo, hi, self.volume.size());

        let radius_sq = i64::from(radius) * i64::from(radius);
        let written = self.fill_where(&range, material, |c| squared_distance(c, center) < radius_sq)?;
        debug!(
            written,
            material,
            radius,
            center = ?center.as_array(),
            "Filled circle"
        );
        Ok(written)
    }

    /// Returns `true` if any cell of the clamped rectangle satisfies `pred`.
    pub fn any_in_rectangle<F>(&self, origin: VoxelCoord<D>, extent: VoxelCoord<D>, mut pred: F) -> bool
    where
        F: FnMut(MaterialIndex) -> bool,
    {
        self.rectangle(origin, extent)
            .exists(|c| self.volume.material(c).is_ok_and(&mut pred))
    }

    /// Returns `true` if every cell of the clamped rectangle satisfies `pred`.
    ///
    /// An empty rectangle yields `true`.
    pub fn all_in_rectangle<F>(&self, origin: VoxelCoord<D>, extent: VoxelCoord<D>, mut pred: F) -> bool
    where
        F: FnMut(MaterialIndex) -> bool,
    {
        self.rectangle(origin, extent)
            .all(|c| self.volume.material(c).is_ok_and(&mut pred))
    }

    fn rectangle(&self, origin: VoxelCoord<D>, extent: VoxelCoord<D>) -> GridRange<D> {
        GridRange::clamped(origin, offset(origin, extent), self.volume.size())
    }

    fn fill_where<F>(&mut self, range: &GridRange<D>, material: MaterialIndex, mut keep: F) -> VoxelResult<usize>
    where
        F: FnMut(VoxelCoord<D>) -> bool,
    {
        let mut written = 0;
        for coord in range {
            if keep(coord) {
                self.volume.set_material(coord, material)?;
                written += 1;
            }
        }
        Ok(written)
    }
}

/// Componentwise saturating `a + b`.
fn offset<const D: usize>(a: VoxelCoord<D>, b: VoxelCoord<D>) -> VoxelCoord<D> {
    VoxelCoord::new(std::array::from_fn(|i| a[i].saturating_add(b[i])))
}

fn squared_distance<const D: usize>(a: VoxelCoord<D>, b: VoxelCoord<D>) -> i64 {
    (0..D)
        .map(|i| {
            let d = i64::from(a[i]) - i64::from(b[i]);
            d * d
        })
        .sum()
}
