//! Half-open coordinate ranges and their deterministic enumeration.

use crate::coord::VoxelCoord;

/// A half-open hyper-rectangle of voxel coordinates, `[lo, hi)` on every axis.
///
/// A range whose `lo[i] >= hi[i]` on any axis is empty.
///
/// # Example
///
/// ```
/// use cf_voxtrace::{GridRange, VoxelCoord};
///
/// let range = GridRange::new(VoxelCoord::new([0, 0]), VoxelCoord::new([3, 2]));
/// assert_eq!(range.volume(), 6);
/// assert!(range.contains(VoxelCoord::new([2, 1])));
/// assert!(!range.contains(VoxelCoord::new([3, 1])));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridRange<const D: usize> {
    /// Inclusive lower corner.
    pub lo: VoxelCoord<D>,
    /// Exclusive upper corner.
    pub hi: VoxelCoord<D>,
}

impl<const D: usize> GridRange<D> {
    /// Creates a range from an inclusive lower and exclusive upper corner.
    #[must_use]
    pub const fn new(lo: VoxelCoord<D>, hi: VoxelCoord<D>) -> Self {
        Self { lo, hi }
    }

    /// The range `[0, size)` on every axis.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn cube(size: u32) -> Self {
        Self::new(VoxelCoord::origin(), VoxelCoord::splat(size as i32))
    }

    /// Intersects `[lo, hi)` with `[0, size)`.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxtrace::{GridRange, VoxelCoord};
    ///
    /// let range = GridRange::clamped(VoxelCoord::new([-2, 5]), VoxelCoord::new([3, 12]), 8);
    /// assert_eq!(range.lo, VoxelCoord::new([0, 5]));
    /// assert_eq!(range.hi, VoxelCoord::new([3, 8]));
    /// ```
    #[must_use]
    pub fn clamped(lo: VoxelCoord<D>, hi: VoxelCoord<D>, size: u32) -> Self {
        let bounds = Self::cube(size);
        Self::new(lo.max(bounds.lo), hi.min(bounds.hi))
    }

    /// Returns `true` if the range contains no coordinate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        D == 0 || (0..D).any(|i| self.lo[i] >= self.hi[i])
    }

    /// Number of coordinates in the range.
    #[must_use]
    pub fn volume(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (0..D)
            .map(|i| u64::from(self.hi[i].abs_diff(self.lo[i])))
            .fold(1u64, u64::saturating_mul)
    }

    /// Checks whether `coord` lies inside the range.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord<D>) -> bool {
        (0..D).all(|i| coord[i] >= self.lo[i] && coord[i] < self.hi[i])
    }

    /// Iterates every coordinate in the range exactly once.
    ///
    /// Axis 0 varies fastest and axis `D - 1` slowest.
    #[must_use]
    pub fn iter(&self) -> GridRangeIter<D> {
        GridRangeIter {
            range: *self,
            current: (!self.is_empty()).then_some(self.lo),
        }
    }

    /// Calls `visit` for every coordinate in the range.
    pub fn for_each<F>(&self, visit: F)
    where
        F: FnMut(VoxelCoord<D>),
    {
        self.iter().for_each(visit);
    }

    /// Returns `true` as soon as `pred` holds for one coordinate.
    ///
    /// An empty range yields `false`.
    pub fn exists<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(VoxelCoord<D>) -> bool,
    {
        self.iter().any(|c| pred(c))
    }

    /// Returns `false` as soon as `pred` fails for one coordinate.
    ///
    /// An empty range yields `true`.
    pub fn all<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(VoxelCoord<D>) -> bool,
    {
        self.iter().all(|c| pred(c))
    }
}

impl<const D: usize> IntoIterator for GridRange<D> {
    type Item = VoxelCoord<D>;
    type IntoIter = GridRangeIter<D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const D: usize> IntoIterator for &GridRange<D> {
    type Item = VoxelCoord<D>;
    type IntoIter = GridRangeIter<D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over all coordinates in a [`GridRange`].
#[derive(Debug, Clone)]
pub struct GridRangeIter<const D: usize> {
    range: GridRange<D>,
    current: Option<VoxelCoord<D>>,
}

impl<const D: usize> Iterator for GridRangeIter<D> {
    type Item = VoxelCoord<D>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        // Odometer increment with axis 0 as the least significant digit
        let mut next = current;
        let mut axis = 0;
        loop {
            if axis == D {
                self.current = None;
                return Some(current);
            }
            next[axis] += 1;
            if next[axis] < self.range.hi[axis] {
                break;
            }
            next[axis] = self.range.lo[axis];
            axis += 1;
        }
        self.current = Some(next);

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.current.map_or(0, |current| {
            let mut stride = 1u64;
            let mut consumed = 0u64;
            for axis in 0..D {
                let extent = u64::from(self.range.hi[axis].abs_diff(self.range.lo[axis]));
                let offset = u64::from(current[axis].abs_diff(self.range.lo[axis]));
                consumed = consumed.saturating_add(offset.saturating_mul(stride));
                stride = stride.saturating_mul(extent);
            }
            stride.saturating_sub(consumed)
        });

        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl<const D: usize> ExactSizeIterator for GridRangeIter<D> {}
