// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Planar Geometry
//!
//! Value types for the 2-D workspace:
//! - `Point`: a coordinate `(x, y)`.
//! - `Segment`: the straight motion between two points.
//! - `Bounds`: the rectangular workspace `[0, width] x [0, height]`.

use std::{
    fmt::Display,
    ops::{Add, Mul, Sub},
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    #[inline]
    pub const fn origin() -> Self {
        Point { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self - other).norm()
    }

    #[inline]
    pub fn distance_squared(self, other: Point) -> f64 {
        (self - other).norm_squared()
    }

    /// Linear interpolation, `s = 0` yields `self`, `s = 1` yields `other`.
    #[inline]
    pub fn lerp(self, other: Point, s: f64) -> Point {
        self + (other - self) * s
    }

    /// Moves from `self` towards `target` by at most `max_step`.
    ///
    /// Returns `target` itself when it is within reach.
    ///
    /// ```
    /// use sicbs_core::geometry::Point;
    ///
    /// let p = Point::new(0.0, 0.0).steer_towards(Point::new(10.0, 0.0), 2.5);
    /// assert_eq!(p, Point::new(2.5, 0.0));
    /// ```
    pub fn steer_towards(self, target: Point, max_step: f64) -> Point {
        let d = self.distance(target);
        if d <= max_step || d == 0.0 {
            return target;
        }
        self.lerp(target, max_step / d)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// A straight segment from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    from: Point,
    to: Point,
}

impl Segment {
    #[inline]
    pub const fn new(from: Point, to: Point) -> Self {
        Segment { from, to }
    }

    #[inline]
    pub const fn start(&self) -> Point {
        self.from
    }

    #[inline]
    pub const fn end(&self) -> Point {
        self.to
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }

    /// Parameter in `[0, 1]` of the point on the segment closest to `p`.
    pub fn project(&self, p: Point) -> f64 {
        let d = self.to - self.from;
        let len2 = d.norm_squared();
        if len2 == 0.0 {
            return 0.0;
        }
        ((p - self.from).dot(d) / len2).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn closest_point(&self, p: Point) -> Point {
        self.from.lerp(self.to, self.project(p))
    }

    #[inline]
    pub fn distance_to_point(&self, p: Point) -> f64 {
        self.closest_point(p).distance(p)
    }

    /// `true` if the two closed segments share a point.
    pub fn intersects(&self, other: &Segment) -> bool {
        fn orient(a: Point, b: Point, c: Point) -> f64 {
            (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
        }
        fn on_box(a: Point, b: Point, p: Point) -> bool {
            p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
        }
        let (p1, p2, q1, q2) = (self.from, self.to, other.from, other.to);
        let d1 = orient(q1, q2, p1);
        let d2 = orient(q1, q2, p2);
        let d3 = orient(p1, p2, q1);
        let d4 = orient(p1, p2, q2);
        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }
        (d1 == 0.0 && on_box(q1, q2, p1))
            || (d2 == 0.0 && on_box(q1, q2, p2))
            || (d3 == 0.0 && on_box(p1, p2, q1))
            || (d4 == 0.0 && on_box(p1, p2, q2))
    }

    /// Smallest distance between any two points of the segments.
    pub fn distance_to_segment(&self, other: &Segment) -> f64 {
        if self.intersects(other) {
            return 0.0;
        }
        self.distance_to_point(other.from)
            .min(self.distance_to_point(other.to))
            .min(other.distance_to_point(self.from))
            .min(other.distance_to_point(self.to))
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// The rectangular workspace `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    width: f64,
    height: f64,
}

impl Bounds {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Bounds { width, height }
    }

    #[inline]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// `true` if a disc of `radius` at `p` lies completely inside.
    #[inline]
    pub fn contains_disc(&self, p: Point, radius: f64) -> bool {
        p.x - radius >= 0.0
            && p.y - radius >= 0.0
            && p.x + radius <= self.width
            && p.y + radius <= self.height
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_pythagoras() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_steer_clips_to_max_step() {
        let p = Point::new(1.0, 1.0).steer_towards(Point::new(1.0, 11.0), 4.0);
        assert_eq!(p, Point::new(1.0, 5.0));
    }

    #[test]
    fn test_steer_reaches_close_target() {
        let target = Point::new(1.5, 1.0);
        assert_eq!(Point::new(1.0, 1.0).steer_towards(target, 4.0), target);
    }

    #[test]
    fn test_segment_closest_point_clamps_to_endpoints() {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(4.0, 0.0));
        assert_eq!(s.closest_point(Point::new(-2.0, 1.0)), Point::new(0.0, 0.0));
        assert_eq!(s.closest_point(Point::new(6.0, 1.0)), Point::new(4.0, 0.0));
        assert_eq!(s.closest_point(Point::new(2.0, 3.0)), Point::new(2.0, 0.0));
        assert_eq!(s.distance_to_point(Point::new(2.0, 3.0)), 3.0);
    }

    #[test]
    fn test_degenerate_segment_distance() {
        let s = Segment::new(Point::new(1.0, 1.0), Point::new(1.0, 1.0));
        assert!(s.is_degenerate());
        assert_eq!(s.distance_to_point(Point::new(4.0, 5.0)), 5.0);
    }

    #[test]
    fn test_segment_to_segment_distance() {
        let a = Segment::new(Point::new(0.0, 0.0), Point::new(4.0, 0.0));
        let crossing = Segment::new(Point::new(2.0, -1.0), Point::new(2.0, 1.0));
        let parallel = Segment::new(Point::new(0.0, 2.0), Point::new(4.0, 2.0));
        let beyond = Segment::new(Point::new(7.0, 4.0), Point::new(9.0, 4.0));
        assert!(a.intersects(&crossing));
        assert_eq!(a.distance_to_segment(&crossing), 0.0);
        assert_eq!(a.distance_to_segment(&parallel), 2.0);
        assert_eq!(a.distance_to_segment(&beyond), 5.0);
    }

    #[test]
    fn test_bounds_contains_edges() {
        let b = Bounds::new(10.0, 5.0);
        assert!(b.contains(Point::new(0.0, 0.0)));
        assert!(b.contains(Point::new(10.0, 5.0)));
        assert!(!b.contains(Point::new(10.1, 1.0)));
        assert!(b.contains_disc(Point::new(1.0, 1.0), 1.0));
        assert!(!b.contains_disc(Point::new(0.5, 1.0), 1.0));
    }
}
