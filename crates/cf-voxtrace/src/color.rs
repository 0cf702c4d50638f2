//! Linear RGB color accumulator.

use std::ops::{Add, AddAssign, Div, Mul};

/// An RGB triple carried through shading as a color weight or radiance.
///
/// Components are unbounded while accumulating; material colors live in `[0, 1]`.
///
/// # Example
///
/// ```
/// use cf_voxtrace::Color;
///
/// let tint = Color::new(1.0, 0.5, 0.0);
/// let lit = Color::WHITE * tint * 0.5;
/// assert_eq!(lit, Color::new(0.5, 0.25, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Color {
    /// No contribution.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit weight.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// A gray with every channel equal to `v`.
    #[must_use]
    pub const fn gray(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Returns `true` if every channel is exactly zero.
    #[must_use]
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Largest channel value.
    #[must_use]
    pub fn max_channel(&self) -> f64 {
        self.r.max(self.g).max(self.b)
    }

    /// Channels as an array.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Mul for Color {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

impl Mul<f64> for Color {
    type Output = Self;

    fn mul(self, k: f64) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }
}

impl Div<f64> for Color {
    type Output = Self;

    fn div(self, k: f64) -> Self {
        Self::new(self.r / k, self.g / k, self.b / k)
    }
}

impl std::iter::Sum for Color {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::BLACK, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise_mul() {
        let a = Color::new(0.5, 1.0, 0.25);
        let b = Color::new(0.5, 0.0, 4.0);
        assert_eq!(a * b, Color::new(0.25, 0.0, 1.0));
    }

    #[test]
    fn test_scalar_ops() {
        let c = Color::new(1.0, 2.0, 3.0);
        assert_eq!(c * 2.0, Color::new(2.0, 4.0, 6.0));
        assert_eq!(c / 2.0, Color::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn test_add_assign_and_sum() {
        let mut c = Color::BLACK;
        c += Color::gray(0.25);
        c += Color::gray(0.25);
        assert_eq!(c, Color::gray(0.5));

        let total: Color = [Color::WHITE, Color::WHITE].into_iter().sum();
        assert_eq!(total, Color::gray(2.0));
    }

    #[test]
    fn test_black() {
        assert!(Color::BLACK.is_black());
        assert!(Color::default().is_black());
        assert!(!Color::new(0.0, 0.0, 0.1).is_black());
        assert_eq!(Color::new(0.1, 0.7, 0.3).max_channel(), 0.7);
    }
}
