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

use crate::err::PathError;
use sicbs_core::{
    cost::Cost,
    geometry::{Point, Segment},
    time::{TimeInterval, TimePoint},
};
use std::fmt::Display;

/// A position reached at a given time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    point: Point,
    time: TimePoint,
}

impl Waypoint {
    #[inline]
    pub const fn new(point: Point, time: TimePoint) -> Self {
        Self { point, time }
    }

    #[inline]
    pub const fn point(&self) -> Point {
        self.point
    }

    #[inline]
    pub const fn time(&self) -> TimePoint {
        self.time
    }
}

impl Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.point.x, self.point.y, self.time)
    }
}

/// One straight, constant-speed piece of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLeg {
    from: Waypoint,
    to: Waypoint,
}

impl PathLeg {
    #[inline]
    pub const fn from_waypoint(&self) -> Waypoint {
        self.from
    }

    #[inline]
    pub const fn to_waypoint(&self) -> Waypoint {
        self.to
    }

    #[inline]
    pub fn window(&self) -> TimeInterval {
        TimeInterval::new(self.from.time, self.to.time)
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        Segment::new(self.from.point, self.to.point)
    }

    #[inline]
    pub fn is_wait(&self) -> bool {
        self.from.point == self.to.point
    }

    /// Position at `t`, clamped to the leg's window.
    pub fn position_at(&self, t: TimePoint) -> Point {
        let span = (self.to.time - self.from.time).value();
        if span <= 0.0 {
            return self.to.point;
        }
        let s = ((t - self.from.time).value() / span).clamp(0.0, 1.0);
        self.from.point.lerp(self.to.point, s)
    }
}

/// A timed trajectory: linear motion between consecutive waypoints, the
/// first waypoint at `t = 0` and strictly increasing times.
///
/// Waiting is two consecutive waypoints at the same point.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, PathError> {
        let first = waypoints.first().ok_or(PathError::Empty)?;
        if first.time != TimePoint::ZERO {
            return Err(PathError::StartNotAtZero(first.time));
        }
        for (index, w) in waypoints.iter().enumerate() {
            if !w.point.is_finite() || !w.time.is_finite() {
                return Err(PathError::NonFiniteWaypoint { index });
            }
        }
        if let Some(index) = waypoints
            .windows(2)
            .position(|pair| pair[1].time <= pair[0].time)
        {
            return Err(PathError::NonIncreasingTime {
                index: index + 1,
                previous: waypoints[index].time,
                current: waypoints[index + 1].time,
            });
        }
        Ok(Self { waypoints })
    }

    /// An agent that never moves: a single waypoint at `t = 0`.
    #[inline]
    pub fn stationary(point: Point) -> Self {
        Self {
            waypoints: vec![Waypoint::new(point, TimePoint::ZERO)],
        }
    }

    #[inline]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.waypoints[0].point
    }

    #[inline]
    pub fn goal(&self) -> Point {
        self.last().point
    }

    /// Time at which the goal is reached.
    #[inline]
    pub fn arrival_time(&self) -> TimePoint {
        self.last().time
    }

    #[inline]
    pub fn cost(&self) -> Cost {
        Cost::from(self.arrival_time())
    }

    #[inline]
    fn last(&self) -> &Waypoint {
        // Non-empty by construction.
        &self.waypoints[self.waypoints.len() - 1]
    }

    pub fn legs(&self) -> impl Iterator<Item = PathLeg> + '_ {
        self.waypoints
            .windows(2)
            .map(|pair| PathLeg {
                from: pair[0],
                to: pair[1],
            })
    }

    /// Position at `t`. Before the start this is the start, after arrival
    /// the goal.
    pub fn position_at(&self, t: TimePoint) -> Point {
        if t <= TimePoint::ZERO {
            return self.start();
        }
        if t >= self.arrival_time() {
            return self.goal();
        }
        // First waypoint strictly after `t`; exists because t < arrival.
        let idx = self.waypoints.partition_point(|w| w.time <= t);
        PathLeg {
            from: self.waypoints[idx - 1],
            to: self.waypoints[idx],
        }
        .position_at(t)
    }

    /// Total travelled distance.
    pub fn length(&self) -> f64 {
        self.legs().map(|l| l.segment().length()).sum()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, w) in self.waypoints.iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{}", w)?;
        }
        Ok(())
    }
}
