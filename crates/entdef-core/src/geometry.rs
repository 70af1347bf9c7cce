//! Geometric primitives for entity bounds.
//!
//! - [`Vec3`] - A point or extent in map units
//! - [`BoundingBox`] - An axis-aligned box given by its minimum and maximum corners
//!
//! Map coordinates follow the Quake convention: `x` forward, `y` left and `z` up.

use std::fmt;

/// A 3D vector in map units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl Vec3 {
    /// Creates a new vector with the specified components
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Creates a vector with all components set to `value`
    pub fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn z(self) -> f32 {
        self.z
    }

    /// Multiplies every component by `factor`
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Component-wise minimum
    pub fn min(self, other: Vec3) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum
    pub fn max(self, other: Vec3) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// An axis-aligned bounding box.
///
/// The constructors uphold `min <= max` on every axis.
///
/// # Examples
///
/// ```
/// # use entdef_core::geometry::{BoundingBox, Vec3};
/// let bounds = BoundingBox::repaired(
///     Vec3::new(32.0, 32.0, 0.0),
///     Vec3::new(-32.0, -32.0, 256.0),
/// );
/// assert_eq!(bounds.min(), Vec3::new(-32.0, -32.0, 0.0));
/// assert_eq!(bounds.max(), Vec3::new(32.0, 32.0, 256.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl BoundingBox {
    /// Half extent of the box used for point entities that declare no size.
    pub const DEFAULT_POINT_HALF_EXTENT: f32 = 8.0;

    /// Builds a box from two corners, swapping the bounds of any axis where
    /// the first corner is greater than the second.
    pub fn repaired(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Builds a box of the given extent centered on the origin.
    pub fn from_size(size: Vec3) -> Self {
        let half = size.scale(0.5);
        Self::repaired(half.scale(-1.0), half)
    }

    /// The `±8` box substituted for point entities without a declared size.
    pub fn default_point() -> Self {
        let half = Vec3::splat(Self::DEFAULT_POINT_HALF_EXTENT);
        Self::repaired(half.scale(-1.0), half)
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Returns the extent of the box on every axis
    pub fn size(&self) -> Vec3 {
        Vec3::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::default_point()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) ({})", self.min, self.max)
    }
}
