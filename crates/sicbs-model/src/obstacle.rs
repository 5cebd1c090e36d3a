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

//! # Static Obstacles
//!
//! Obstacles form a closed set of shapes. Each shape answers one question:
//! does a disc (an agent body) overlap me, either resting at a point or swept
//! along a straight segment. Touching counts as free.

use sicbs_core::geometry::{Point, Segment};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Obstacle {
    Circular {
        center: Point,
        radius: f64,
    },
    /// Axis-aligned rectangle.
    Rectangular {
        center: Point,
        width: f64,
        height: f64,
    },
}

impl Obstacle {
    #[inline]
    pub const fn circular(center: Point, radius: f64) -> Self {
        Obstacle::Circular { center, radius }
    }

    #[inline]
    pub const fn rectangular(center: Point, width: f64, height: f64) -> Self {
        Obstacle::Rectangular {
            center,
            width,
            height,
        }
    }

    #[inline]
    pub fn center(&self) -> Point {
        match *self {
            Obstacle::Circular { center, .. } | Obstacle::Rectangular { center, .. } => center,
        }
    }

    /// Positive, finite dimensions and a finite center.
    pub fn is_valid(&self) -> bool {
        match *self {
            Obstacle::Circular { center, radius } => {
                center.is_finite() && radius.is_finite() && radius > 0.0
            }
            Obstacle::Rectangular {
                center,
                width,
                height,
            } => {
                center.is_finite()
                    && width.is_finite()
                    && height.is_finite()
                    && width > 0.0
                    && height > 0.0
            }
        }
    }

    /// Euclidean distance from `p` to the shape, zero inside.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        match *self {
            Obstacle::Circular { center, radius } => (p.distance(center) - radius).max(0.0),
            Obstacle::Rectangular { .. } => {
                let (min, max) = self.corners_min_max();
                let dx = (min.x - p.x).max(0.0).max(p.x - max.x);
                let dy = (min.y - p.y).max(0.0).max(p.y - max.y);
                (dx * dx + dy * dy).sqrt()
            }
        }
    }

    /// Distance from the segment to the shape, zero if they touch or cross.
    pub fn distance_to_segment(&self, segment: &Segment) -> f64 {
        match *self {
            Obstacle::Circular { center, radius } => {
                (segment.distance_to_point(center) - radius).max(0.0)
            }
            Obstacle::Rectangular { .. } => {
                if self.segment_crosses_rect(segment) {
                    return 0.0;
                }
                let (min, max) = self.corners_min_max();
                let corners = [
                    min,
                    Point::new(max.x, min.y),
                    max,
                    Point::new(min.x, max.y),
                ];
                let from_corners = corners
                    .iter()
                    .map(|&c| segment.distance_to_point(c))
                    .fold(f64::INFINITY, f64::min);
                self.distance_to_point(segment.start())
                    .min(self.distance_to_point(segment.end()))
                    .min(from_corners)
            }
        }
    }

    /// `true` if a disc of `radius` at `p` overlaps the obstacle.
    #[inline]
    pub fn intersects_disc(&self, p: Point, radius: f64) -> bool {
        self.distance_to_point(p) < radius
    }

    /// `true` if a disc of `radius` moving from `from` to `to` overlaps the
    /// obstacle at any point of the motion.
    #[inline]
    pub fn intersects_swept_disc(&self, from: Point, to: Point, radius: f64) -> bool {
        self.distance_to_segment(&Segment::new(from, to)) < radius
    }

    fn corners_min_max(&self) -> (Point, Point) {
        match *self {
            Obstacle::Circular { center, radius } => (
                Point::new(center.x - radius, center.y - radius),
                Point::new(center.x + radius, center.y + radius),
            ),
            Obstacle::Rectangular {
                center,
                width,
                height,
            } => {
                let (hw, hh) = (width * 0.5, height * 0.5);
                (
                    Point::new(center.x - hw, center.y - hh),
                    Point::new(center.x + hw, center.y + hh),
                )
            }
        }
    }

    /// Liang-Barsky clip of the segment against the bounding box.
    fn segment_crosses_rect(&self, segment: &Segment) -> bool {
        let (min, max) = self.corners_min_max();
        let a = segment.start();
        let d = segment.end() - a;
        let (mut t0, mut t1) = (0.0f64, 1.0f64);
        let checks = [
            (-d.x, a.x - min.x),
            (d.x, max.x - a.x),
            (-d.y, a.y - min.y),
            (d.y, max.y - a.y),
        ];
        for (p, q) in checks {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}

impl Display for Obstacle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Obstacle::Circular { center, radius } => {
                write!(f, "Circle(center: {}, radius: {})", center, radius)
            }
            Obstacle::Rectangular {
                center,
                width,
                height,
            } => write!(
                f,
                "Rectangle(center: {}, width: {}, height: {})",
                center, width, height
            ),
        }
    }
}
