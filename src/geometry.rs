//! Integer pixel-space geometry shared by the trackers and the motion mapper.

use std::ops::{Add, Sub};

/// A point in pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height of an image or region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Region covering a whole image of the given size
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Same size, moved by `delta`
    #[must_use]
    pub const fn offset(&self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Same size, top-left corner at `origin`
    #[must_use]
    pub const fn with_origin(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Overlap of two regions; empty (all zero) when they do not overlap
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);
        if x2 <= x1 || y2 <= y1 {
            return Self::default();
        }
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Whether `other` lies completely inside this region
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }

    /// Window twice the size of this region, centered on it
    #[must_use]
    pub const fn search_window(&self) -> Self {
        Self::new(
            self.x - self.width / 2,
            self.y - self.height / 2,
            self.width * 2,
            self.height * 2,
        )
    }

    /// Upper half, used for the eye area of the face region
    #[must_use]
    pub const fn upper_half(&self) -> Self {
        Self::new(self.x, self.y, self.width, self.height / 2)
    }
}

#[cfg(feature = "vision")]
impl From<Region> for opencv::core::Rect {
    fn from(region: Region) -> Self {
        Self::new(region.x, region.y, region.width, region.height)
    }
}

#[cfg(feature = "vision")]
impl From<opencv::core::Rect> for Region {
    fn from(rect: opencv::core::Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }
}

#[cfg(feature = "vision")]
impl From<Point> for opencv::core::Point {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_overlap() {
        let a = Region::new(0, 0, 100, 100);
        let b = Region::new(50, 60, 100, 100);
        assert_eq!(a.intersect(&b), Region::new(50, 60, 50, 40));
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(20, 20, 10, 10);
        let overlap = a.intersect(&b);
        assert!(overlap.is_empty());
        assert_eq!(overlap, Region::default());
    }

    #[test]
    fn test_search_window_is_centered_and_doubled() {
        let region = Region::new(100, 80, 40, 20);
        let window = region.search_window();
        assert_eq!(window, Region::new(80, 70, 80, 40));
        assert_eq!(window.center(), region.center());
    }

    #[test]
    fn test_search_window_clamped_to_frame() {
        let frame = Region::from_size(Size::new(640, 480));
        let window = Region::new(0, 0, 40, 40).search_window().intersect(&frame);
        assert_eq!(window, Region::new(0, 0, 60, 60));
    }

    #[test]
    fn test_upper_half_and_center() {
        let region = Region::new(10, 10, 30, 41);
        assert_eq!(region.upper_half(), Region::new(10, 10, 30, 20));
        assert_eq!(region.center(), Point::new(25, 30));
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3, 4);
        let b = Point::new(1, 7);
        assert_eq!(a + b, Point::new(4, 11));
        assert_eq!(a - b, Point::new(2, -3));
    }

    #[test]
    fn test_contains() {
        let outer = Region::new(0, 0, 100, 100);
        assert!(outer.contains(&Region::new(10, 10, 90, 90)));
        assert!(!outer.contains(&Region::new(10, 10, 91, 90)));
    }
}
