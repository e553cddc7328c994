//! Point primitives for coloured point clouds.
//!
//! `y` is the vertical axis throughout the crate; the playing field lies in
//! the (x, z) plane.

use std::fmt;

/// A position in 3D space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    /// Creates a point from its three coordinates.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared distance in the horizontal (x, z) plane.
    #[inline]
    pub fn dist_2d_sq(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        dx * dx + dz * dz
    }

    /// Squared distance in (x, y, z).
    #[inline]
    pub fn dist_3d_sq(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Planar coordinates as a `[x, z]` pair.
    #[inline]
    pub fn planar(&self) -> [f32; 2] {
        [self.x, self.z]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// RGB colour triplet as read from the input file.
///
/// Channels are kept as signed integers so out-of-range input can be
/// represented and rejected by [`Rgb::is_valid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Rgb {
    #[inline]
    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    /// Every channel lies in `[0, 256)`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0..256).contains(c))
    }
}

/// A point of the cloud: position, colour and a run-unique identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub position: Point,
    pub color: Rgb,
    id: u64,
}

impl CloudPoint {
    /// Creates a cloud point with an id obtained from `ids`.
    pub fn new(position: Point, color: Rgb, ids: &mut PointIdAllocator) -> Self {
        Self {
            position,
            color,
            id: ids.next_id(),
        }
    }

    /// Convenience constructor from raw coordinates and channels.
    pub fn from_parts(
        x: f32,
        y: f32,
        z: f32,
        r: i32,
        g: i32,
        b: i32,
        ids: &mut PointIdAllocator,
    ) -> Self {
        Self::new(Point::new(x, y, z), Rgb::new(r, g, b), ids)
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.position.z
    }

    /// Colour channels lie in `[0, 256)`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.color.is_valid()
    }
}

impl fmt::Display for CloudPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} - [{}, {}, {}]",
            self.id, self.position, self.color.r, self.color.g, self.color.b
        )
    }
}

/// Hands out monotonically increasing point identifiers.
///
/// One allocator lives in the [`RunContext`](crate::core::context::RunContext)
/// of a run, so ids are unique across the training and evaluation sets.
#[derive(Debug, Clone)]
pub struct PointIdAllocator {
    next: u64,
}

impl PointIdAllocator {
    pub fn new(first: u64) -> Self {
        Self { next: first }
    }

    /// Returns the current id and advances the counter.
    #[inline]
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next point will receive.
    #[inline]
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for PointIdAllocator {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_ignores_height() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(3.0, 100.0, 4.0);
        assert_eq!(a.dist_2d_sq(&b), 25.0);
        assert_eq!(b.dist_2d_sq(&a), 25.0);
    }

    #[test]
    fn test_3d_distance() {
        let a = Point::new(1.0, 2.0, 3.0);
        let b = Point::new(2.0, 4.0, 6.0);
        assert_eq!(a.dist_3d_sq(&b), 1.0 + 4.0 + 9.0);
        assert_eq!(a.dist_3d_sq(&a), 0.0);
    }

    #[test]
    fn test_color_validity() {
        assert!(Rgb::new(0, 0, 0).is_valid());
        assert!(Rgb::new(255, 255, 255).is_valid());
        assert!(!Rgb::new(256, 0, 0).is_valid());
        assert!(!Rgb::new(0, -1, 0).is_valid());
        assert!(!Rgb::new(0, 0, 1000).is_valid());
    }

    #[test]
    fn test_cloud_point_with_red_256_is_invalid() {
        let mut ids = PointIdAllocator::default();
        let p = CloudPoint::from_parts(1.0, 2.0, 3.0, 256, 10, 10, &mut ids);
        assert!(!p.is_valid());
    }

    #[test]
    fn test_ids_increase_monotonically() {
        let mut ids = PointIdAllocator::new(2001);
        let a = CloudPoint::from_parts(0.0, 0.0, 0.0, 1, 2, 3, &mut ids);
        let b = CloudPoint::from_parts(0.0, 0.0, 0.0, 1, 2, 3, &mut ids);
        assert_eq!(a.id(), 2001);
        assert_eq!(b.id(), 2002);
        assert_eq!(ids.peek(), 2003);
    }
}
