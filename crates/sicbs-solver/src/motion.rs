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

//! # Continuous Motion Queries
//!
//! Closed-form and convex-search helpers answering "when do two discs
//! overlap" for constant-velocity motions:
//!
//! - a disc resting at a point vs. a moving disc → window of unsafe times;
//! - a disc crossing an edge vs. a moving disc → window of unsafe departure
//!   times.
//!
//! A committed path is turned into a sequence of [`Motion`]s (one per leg
//! plus, under [`GoalHoldPolicy::HoldForever`], a final stationary motion that
//! never ends).

use crate::config::GoalHoldPolicy;
use sicbs_core::{
    geometry::{Point, Segment},
    primitives::Interval,
    time::{TimeDelta, TimeInterval, TimePoint},
};
use sicbs_model::path::Path;

/// Boundary widening applied to numerically located windows.
pub(crate) const WINDOW_EPS: f64 = 1e-9;

const GOLDEN_ITERATIONS: usize = 100;
const BISECT_ITERATIONS: usize = 64;

/// Constant-velocity motion `p(t) = origin + velocity * (t - start)` on
/// `[start, end)`. Only stationary motions may have `end = +∞`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    origin: Point,
    velocity: Point,
    start: TimePoint,
    end: TimePoint,
}

impl Motion {
    /// Linear motion from `from` at `t0` to `to` at `t1`.
    pub fn between(from: Point, t0: TimePoint, to: Point, t1: TimePoint) -> Self {
        let span = (t1 - t0).value();
        let velocity = if span > 0.0 {
            (to - from) * (1.0 / span)
        } else {
            Point::origin()
        };
        Self {
            origin: from,
            velocity,
            start: t0,
            end: t1,
        }
    }

    /// Resting at `at` from `since` on, forever.
    pub fn hold(at: Point, since: TimePoint) -> Self {
        Self {
            origin: at,
            velocity: Point::origin(),
            start: since,
            end: TimePoint::INFINITY,
        }
    }

    #[inline]
    pub fn start(&self) -> TimePoint {
        self.start
    }

    #[inline]
    pub fn end(&self) -> TimePoint {
        self.end
    }

    #[inline]
    pub fn window(&self) -> TimeInterval {
        Interval::new(self.start, self.end)
    }

    #[inline]
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    #[inline]
    pub fn is_stationary(&self) -> bool {
        self.velocity == Point::origin()
    }

    #[inline]
    pub fn position_at(&self, t: TimePoint) -> Point {
        if self.is_stationary() {
            return self.origin;
        }
        self.origin + self.velocity * (t - self.start).value()
    }

    /// The part of the motion that lies inside `window`.
    pub fn clipped(&self, window: TimeInterval) -> Option<Motion> {
        let part = self.window().intersection(&window)?;
        let from = self.position_at(part.start());
        if part.end().is_infinite() {
            return Some(Motion::hold(from, part.start()));
        }
        Some(Motion::between(
            from,
            part.start(),
            self.position_at(part.end()),
            part.end(),
        ))
    }

    /// The spatial trace of the motion.
    pub fn trace(&self) -> Segment {
        if self.end.is_infinite() {
            Segment::new(self.origin, self.origin)
        } else {
            Segment::new(self.origin, self.position_at(self.end))
        }
    }
}

/// Splits a committed path into the motions that occupy space.
pub fn occupancy(path: &Path, policy: GoalHoldPolicy) -> Vec<Motion> {
    let mut out: Vec<Motion> = path
        .legs()
        .map(|leg| {
            let (a, b) = (leg.from_waypoint(), leg.to_waypoint());
            Motion::between(a.point(), a.time(), b.point(), b.time())
        })
        .collect();
    if policy == GoalHoldPolicy::HoldForever {
        out.push(Motion::hold(path.goal(), path.arrival_time()));
    }
    out
}

/// Open range of `s` for which `|d + w s| < r`, or `None` if empty.
///
/// For `w = 0` the range is unbounded when `|d| < r`.
pub(crate) fn disc_overlap_range(d: Point, w: Point, r: f64) -> Option<(f64, f64)> {
    let a = w.norm_squared();
    let c = d.norm_squared() - r * r;
    if a == 0.0 {
        return (c < 0.0).then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let b = 2.0 * d.dot(w);
    let disc = b * b - 4.0 * a * c;
    if disc <= 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    Some(((-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)))
}

/// Times at which a disc resting at `q` overlaps the moving disc, where
/// `clearance` is the sum of both radii.
pub fn unsafe_window_at_point(m: &Motion, q: Point, clearance: f64) -> Option<TimeInterval> {
    let (s0, s1) = disc_overlap_range(m.origin - q, m.velocity, clearance)?;
    let span = (m.end - m.start).value();
    let lo = s0.max(0.0);
    let hi = s1.min(span);
    if lo >= hi {
        return None;
    }
    let end = if hi.is_infinite() {
        TimePoint::INFINITY
    } else {
        m.start + TimeDelta::new(hi)
    };
    Some(Interval::new(m.start + TimeDelta::new(lo), end))
}

/// A straight traversal from `from` to `to` taking `duration` time units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    from: Point,
    to: Point,
    duration: f64,
    velocity: Point,
}

impl Edge {
    /// # Panics
    ///
    /// Panics if `speed` is not strictly positive.
    pub fn new(from: Point, to: Point, speed: f64) -> Self {
        assert!(speed > 0.0, "speed must be > 0");
        let duration = from.distance(to) / speed;
        let velocity = if duration > 0.0 {
            (to - from) * (1.0 / duration)
        } else {
            Point::origin()
        };
        Self {
            from,
            to,
            duration,
            velocity,
        }
    }

    #[inline]
    pub fn source(&self) -> Point {
        self.from
    }

    #[inline]
    pub fn target(&self) -> Point {
        self.to
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        Segment::new(self.from, self.to)
    }

    /// Minimum distance between the traversing disc center (departing at
    /// `tau`) and the motion, over their common time window.
    fn min_distance(&self, m: &Motion, tau: f64) -> f64 {
        let lo = tau.max(m.start.value());
        let hi = (tau + self.duration).min(m.end.value());
        // rel(t) = base + dv * t
        let base = self.from - self.velocity * tau - m.origin + m.velocity * m.start.value();
        let dv = self.velocity - m.velocity;
        let dv2 = dv.norm_squared();
        let t = if dv2 == 0.0 {
            lo
        } else {
            (-(base.dot(dv)) / dv2).clamp(lo, hi.max(lo))
        };
        (base + dv * t).norm()
    }
}

/// Departure times for which traversing `edge` overlaps the moving disc at
/// some instant, where `clearance` is the sum of both radii.
///
/// The minimum distance over the shared window is convex in the departure
/// time, so the unsafe set is one interval. It is located by golden-section
/// search for the minimum and bisection for both crossings.
pub fn unsafe_departures(edge: &Edge, m: &Motion, clearance: f64) -> Option<TimeInterval> {
    if edge.segment().distance_to_segment(&m.trace()) >= clearance {
        return None;
    }
    let start = m.start.value();
    let unbounded = m.end.is_infinite();
    let dom_lo = start - edge.duration;
    let dom_hi = if unbounded { start } else { m.end.value() };
    if dom_lo > dom_hi {
        return None;
    }

    let f = |tau: f64| edge.min_distance(m, tau);
    let (tau_min, f_min) = golden_section_min(&f, dom_lo, dom_hi);
    if f_min >= clearance {
        return None;
    }

    let left = if f(dom_lo) < clearance {
        dom_lo
    } else {
        bisect_crossing(&f, dom_lo, tau_min, clearance)
    };
    let right = if f(dom_hi) < clearance {
        if unbounded { f64::INFINITY } else { dom_hi }
    } else {
        bisect_crossing(&f, dom_hi, tau_min, clearance)
    };

    let end = if right.is_infinite() {
        TimePoint::INFINITY
    } else {
        TimePoint::new(right + WINDOW_EPS)
    };
    Some(Interval::new(TimePoint::new(left - WINDOW_EPS), end))
}

fn golden_section_min<F: Fn(f64) -> f64>(f: &F, mut lo: f64, mut hi: f64) -> (f64, f64) {
    const INV_PHI: f64 = 0.618_033_988_749_894_9;
    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);
    for _ in 0..GOLDEN_ITERATIONS {
        if hi - lo <= 1e-12 * (1.0 + hi.abs()) {
            break;
        }
        if f1 <= f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = f(x2);
        }
    }
    // Endpoints may beat the interior on monotone pieces.
    [(x1, f1), (x2, f2), (lo, f(lo)), (hi, f(hi))]
        .into_iter()
        .fold((x1, f1), |best, cand| if cand.1 < best.1 { cand } else { best })
}

/// Boundary between `outside` (f >= level) and `inside` (f < level).
fn bisect_crossing<F: Fn(f64) -> f64>(f: &F, mut outside: f64, mut inside: f64, level: f64) -> f64 {
    for _ in 0..BISECT_ITERATIONS {
        let mid = 0.5 * (outside + inside);
        if f(mid) < level {
            inside = mid;
        } else {
            outside = mid;
        }
    }
    outside
}
