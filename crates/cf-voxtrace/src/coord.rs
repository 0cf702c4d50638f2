//! Integer voxel coordinates of arbitrary fixed dimension.

use std::ops::{
    Add, BitAnd, BitOr, BitXor, Div, Index, IndexMut, Mul, Neg, Not, Shl, Shr, Sub,
};

use nalgebra::{Point, SVector};

/// A discrete `D`-dimensional coordinate in voxel space.
///
/// Every operator is dimension-homogeneous: component `i` of the result only
/// depends on component `i` of the operands. Scalar operators (`*`, `/`, shifts
/// and bit masks) apply the same `i32` to every component.
///
/// # Example
///
/// ```
/// use cf_voxtrace::VoxelCoord;
///
/// let coord = VoxelCoord::new([5, 6, 7]);
/// assert_eq!(coord >> 1, VoxelCoord::new([2, 3, 3]));
/// assert_eq!(coord & 1, VoxelCoord::new([1, 0, 1]));
/// assert_eq!(coord.sqr(), 25 + 36 + 49);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelCoord<const D: usize>(pub [i32; D]);

impl<const D: usize> VoxelCoord<D> {
    /// Creates a coordinate from its components.
    #[must_use]
    pub const fn new(components: [i32; D]) -> Self {
        Self(components)
    }

    /// The coordinate with every component equal to zero.
    #[must_use]
    pub const fn origin() -> Self {
        Self([0; D])
    }

    /// A coordinate with every component equal to `value`.
    #[must_use]
    pub const fn splat(value: i32) -> Self {
        Self([value; D])
    }

    /// Returns the components as an array.
    #[must_use]
    pub const fn as_array(self) -> [i32; D] {
        self.0
    }

    /// Returns a copy with component `axis` replaced by `value`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= D`.
    #[must_use]
    pub const fn with_axis(mut self, axis: usize, value: i32) -> Self {
        self.0[axis] = value;
        self
    }

    /// Dot product, widened to `i64`.
    #[must_use]
    pub fn dot(self, other: Self) -> i64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| i64::from(a) * i64::from(b))
            .sum()
    }

    /// Squared Euclidean length, widened to `i64`.
    #[must_use]
    pub fn sqr(self) -> i64 {
        self.dot(self)
    }

    /// Componentwise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i].min(other.0[i])))
    }

    /// Componentwise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i].max(other.0[i])))
    }

    /// Returns `true` if every component lies in `[0, size)`.
    #[must_use]
    pub fn is_within(self, size: u32) -> bool {
        self.0
            .iter()
            .all(|&c| c >= 0 && c.unsigned_abs() < size)
    }

    /// Packs bit `level` of every component into a child slot index.
    ///
    /// Axis `i` contributes bit `i` of the result, so the index lies in
    /// `0..2^D`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn child_index(self, level: u32) -> usize {
        let digits = (self >> level as i32) & 1;
        digits
            .0
            .iter()
            .enumerate()
            .fold(0usize, |acc, (axis, &bit)| {
                acc | (usize::from(bit != 0) << axis)
            })
    }

    /// Converts to a floating-point vector.
    #[must_use]
    pub fn to_vector(self) -> SVector<f64, D> {
        SVector::from_fn(|i, _| f64::from(self.0[i]))
    }

    /// Converts to a floating-point point.
    #[must_use]
    pub fn to_point(self) -> Point<f64, D> {
        Point::from(self.to_vector())
    }

    /// Returns the cell containing `point` (per-axis floor).
    ///
    /// Components outside the `i32` range saturate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_point_floor(point: &Point<f64, D>) -> Self {
        Self(std::array::from_fn(|i| point[i].floor() as i32))
    }
}

impl<const D: usize> Default for VoxelCoord<D> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<const D: usize> From<[i32; D]> for VoxelCoord<D> {
    fn from(components: [i32; D]) -> Self {
        Self(components)
    }
}

impl<const D: usize> From<VoxelCoord<D>> for [i32; D] {
    fn from(coord: VoxelCoord<D>) -> Self {
        coord.0
    }
}

impl<const D: usize> Index<usize> for VoxelCoord<D> {
    type Output = i32;

    fn index(&self, axis: usize) -> &i32 {
        &self.0[axis]
    }
}

impl<const D: usize> IndexMut<usize> for VoxelCoord<D> {
    fn index_mut(&mut self, axis: usize) -> &mut i32 {
        &mut self.0[axis]
    }
}

impl<const D: usize> Add for VoxelCoord<D> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i].wrapping_add(other.0[i])))
    }
}

impl<const D: usize> Sub for VoxelCoord<D> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i].wrapping_sub(other.0[i])))
    }
}

impl<const D: usize> Neg for VoxelCoord<D> {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.map(i32::wrapping_neg))
    }
}

impl<const D: usize> Not for VoxelCoord<D> {
    type Output = Self;

    fn not(self) -> Self {
        Self(self.0.map(|c| !c))
    }
}

macro_rules! scalar_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<const D: usize> $trait<i32> for VoxelCoord<D> {
            type Output = Self;

            fn $method(self, rhs: i32) -> Self {
                Self(self.0.map(|c| $op(c, rhs)))
            }
        }
    };
}

scalar_op!(Mul, mul, i32::wrapping_mul);
scalar_op!(Div, div, |c: i32, v: i32| c / v);
scalar_op!(Shl, shl, |c: i32, v: i32| c << v);
scalar_op!(Shr, shr, |c: i32, v: i32| c >> v);
scalar_op!(BitAnd, bitand, |c: i32, v: i32| c & v);
scalar_op!(BitOr, bitor, |c: i32, v: i32| c | v);
scalar_op!(BitXor, bitxor, |c: i32, v: i32| c ^ v);

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_index() {
        let coord = VoxelCoord::new([1, 2, 3]);
        assert_eq!(coord[0], 1);
        assert_eq!(coord[1], 2);
        assert_eq!(coord[2], 3);
    }

    #[test]
    fn test_origin_and_default() {
        assert_eq!(VoxelCoord::<4>::default(), VoxelCoord::origin());
        assert_eq!(VoxelCoord::<4>::origin().as_array(), [0; 4]);
    }

    #[test]
    fn test_arithmetic() {
        let a = VoxelCoord::new([1, 2]);
        let b = VoxelCoord::new([4, 6]);
        assert_eq!(a + b, VoxelCoord::new([5, 8]));
        assert_eq!(b - a, VoxelCoord::new([3, 4]));
        assert_eq!(-a, VoxelCoord::new([-1, -2]));
        assert_eq!(b * 2, VoxelCoord::new([8, 12]));
        assert_eq!(b / 2, VoxelCoord::new([2, 3]));
    }

    #[test]
    fn test_bitwise() {
        let c = VoxelCoord::new([0b1010, 0b0111]);
        assert_eq!(c >> 1, VoxelCoord::new([0b101, 0b11]));
        assert_eq!(c << 1, VoxelCoord::new([0b10100, 0b1110]));
        assert_eq!(c & 0b11, VoxelCoord::new([0b10, 0b11]));
        assert_eq!(c | 0b1, VoxelCoord::new([0b1011, 0b0111]));
        assert_eq!(c ^ 0b1, VoxelCoord::new([0b1011, 0b0110]));
        assert_eq!(!VoxelCoord::new([0, -1]), VoxelCoord::new([-1, 0]));
    }

    #[test]
    fn test_dot_and_sqr() {
        let a = VoxelCoord::new([1, 2, 3]);
        let b = VoxelCoord::new([4, -5, 6]);
        assert_eq!(a.dot(b), 4 - 10 + 18);
        assert_eq!(a.sqr(), 14);
    }

    #[test]
    fn test_sqr_does_not_overflow() {
        let a = VoxelCoord::new([i32::MAX, i32::MAX]);
        assert_eq!(a.sqr(), 2 * i64::from(i32::MAX) * i64::from(i32::MAX));
    }

    #[test]
    fn test_min_max() {
        let a = VoxelCoord::new([1, 9, -3]);
        let b = VoxelCoord::new([4, 2, -5]);
        assert_eq!(a.min(b), VoxelCoord::new([1, 2, -5]));
        assert_eq!(a.max(b), VoxelCoord::new([4, 9, -3]));
    }

    #[test]
    fn test_is_within() {
        assert!(VoxelCoord::new([0, 7]).is_within(8));
        assert!(!VoxelCoord::new([0, 8]).is_within(8));
        assert!(!VoxelCoord::new([-1, 0]).is_within(8));
    }

    #[test]
    fn test_child_index() {
        let c = VoxelCoord::new([0b10, 0b01, 0b11]);
        assert_eq!(c.child_index(0), 0b110);
        assert_eq!(c.child_index(1), 0b101);
        assert_eq!(c.child_index(2), 0);
    }

    #[test]
    fn test_from_point_floor() {
        let p = Point::from([0.0, 4.5, -0.25]);
        assert_eq!(VoxelCoord::from_point_floor(&p), VoxelCoord::new([0, 4, -1]));
    }

    #[test]
    fn test_with_axis() {
        let c = VoxelCoord::new([1, 2, 3]).with_axis(1, 9);
        assert_eq!(c, VoxelCoord::new([1, 9, 3]));
    }

    #[test]
    fn test_to_vector() {
        let v = VoxelCoord::new([1, -2]).to_vector();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], -2.0);
    }
}
