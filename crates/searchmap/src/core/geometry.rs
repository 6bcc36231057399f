//! Integer geometry primitives for the drawing plane
//!
//! Coordinates are abstract drawing-plane units, not pixels. `y` grows
//! downward, as on screen. Node coordinates and sizes stay within
//! [`COORDINATE_LIMIT`]; arithmetic on the primitives saturates instead of
//! wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Largest magnitude of a stored coordinate or size
pub const COORDINATE_LIMIT: i32 = 1 << 24;

fn clamp_coordinate(value: i32) -> i32 {
    value.clamp(-COORDINATE_LIMIT, COORDINATE_LIMIT)
}

/// A point in the drawing plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const ORIGIN: Location = Location { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Same location pulled back inside the bounded drawing plane
    pub fn clamped(&self) -> Location {
        Location::new(clamp_coordinate(self.x), clamp_coordinate(self.y))
    }

    pub fn is_within_limit(&self) -> bool {
        *self == self.clamped()
    }

    /// Euclidean distance to another location
    pub fn distance(&self, other: Location) -> f64 {
        self.vector_to(other).norm()
    }

    /// Vector going from `self` to `other`
    pub fn vector_to(&self, other: Location) -> Vector {
        Vector::new(other.x.saturating_sub(self.x), other.y.saturating_sub(self.y))
    }

    /// Location moved by `v`
    pub fn translate(&self, v: Vector) -> Location {
        Location::new(self.x.saturating_add(v.dx), self.y.saturating_add(v.dy))
    }

    /// Middle of the segment `[self, other]`, rounded toward `self`
    pub fn midpoint(&self, other: Location) -> Location {
        let mid = |a: i32, b: i32| (i64::from(a) + (i64::from(b) - i64::from(a)) / 2) as i32;
        Location::new(mid(self.x, other.x), mid(self.y, other.y))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A displacement in the drawing plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vector {
    pub dx: i32,
    pub dy: i32,
}

impl Vector {
    pub const ZERO: Vector = Vector { dx: 0, dy: 0 };

    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Euclidean length
    pub fn norm(&self) -> f64 {
        (self.dx as f64).hypot(self.dy as f64)
    }

    /// Multiply both components by `factor`, rounding to the nearest unit
    pub fn scale(&self, factor: f64) -> Vector {
        Vector::new(
            (self.dx as f64 * factor).round() as i32,
            (self.dy as f64 * factor).round() as i32,
        )
    }

    /// Same direction, given length. The zero vector stays zero.
    pub fn scaled_to(&self, length: f64) -> Vector {
        let norm = self.norm();
        if norm == 0.0 {
            return Vector::ZERO;
        }
        self.scale(length / norm)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.dx.saturating_add(rhs.dx), self.dy.saturating_add(rhs.dy))
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.dx.saturating_sub(rhs.dx), self.dy.saturating_sub(rhs.dy))
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(self.dx.saturating_neg(), self.dy.saturating_neg())
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.dx, self.dy)
    }
}

/// Axis-aligned rectangle with half-open bounds `[left, right) x [top, bottom)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Rectangle of the given size centered on `center`
    pub fn centered(center: Location, width: i32, height: i32) -> Self {
        let left = center.x.saturating_sub(width / 2);
        let top = center.y.saturating_sub(height / 2);
        Self {
            left,
            top,
            right: left.saturating_add(width),
            bottom: top.saturating_add(height),
        }
    }

    /// Grow the rectangle by `border` on every side
    pub fn padded(&self, border: i32) -> Self {
        Self {
            left: self.left.saturating_sub(border),
            top: self.top.saturating_sub(border),
            right: self.right.saturating_add(border),
            bottom: self.bottom.saturating_add(border),
        }
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn center(&self) -> Location {
        Location::new(self.left, self.top).midpoint(Location::new(self.right, self.bottom))
    }

    /// True when the interiors overlap; touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn contains(&self, point: Location) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}
