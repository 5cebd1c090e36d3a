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

use crate::motion::{Edge, Motion, unsafe_departures, unsafe_window_at_point};
use sicbs_core::{
    geometry::Point,
    time::{TimeInterval, TimePoint},
};
use sicbs_model::id::AgentId;
use std::fmt::Display;

/// Forbids the center of `agent` from coming closer than `radius` to a
/// disc center that follows `zone` during its window.
///
/// A fixed zone is a stationary motion; a conflict constraint follows the
/// other agent's committed motion over the conflict window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    agent: AgentId,
    zone: Motion,
    radius: f64,
}

impl Constraint {
    /// A disc fixed at `center` that is active during `window`.
    pub fn new(agent: AgentId, center: Point, radius: f64, window: TimeInterval) -> Self {
        let zone = if window.end().is_infinite() {
            Motion::hold(center, window.start())
        } else {
            Motion::between(center, window.start(), center, window.end())
        };
        Self {
            agent,
            zone,
            radius,
        }
    }

    /// A disc whose center follows `zone`.
    #[inline]
    pub fn following(agent: AgentId, zone: Motion, radius: f64) -> Self {
        Self {
            agent,
            zone,
            radius,
        }
    }

    #[inline]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    #[inline]
    pub fn zone(&self) -> &Motion {
        &self.zone
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn window(&self) -> TimeInterval {
        self.zone.window()
    }

    /// `true` if `p` lies inside the zone at time `t`.
    pub fn covers(&self, p: Point, t: TimePoint) -> bool {
        self.window().contains(t) && p.distance(self.zone.position_at(t)) < self.radius
    }

    /// Times at which resting at `p` violates the constraint.
    #[inline]
    pub fn blocked_times_at(&self, p: Point) -> Option<TimeInterval> {
        unsafe_window_at_point(&self.zone, p, self.radius)
    }

    /// Departure times at which traversing `edge` enters the zone while it
    /// is active.
    #[inline]
    pub fn blocked_departures(&self, edge: &Edge) -> Option<TimeInterval> {
        if self.window().is_empty() {
            return None;
        }
        unsafe_departures(edge, &self.zone, self.radius)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let trace = self.zone.trace();
        write!(
            f,
            "Constraint({} away from {} -> {} by {} during {})",
            self.agent.value(),
            trace.start(),
            trace.end(),
            self.radius,
            self.window()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sicbs_core::primitives::Interval;

    fn t(v: f64) -> TimePoint {
        TimePoint::new(v)
    }

    fn zone() -> Constraint {
        Constraint::new(
            AgentId::new(0),
            Point::new(5.0, 0.0),
            1.0,
            Interval::new(t(10.0), t(12.0)),
        )
    }

    #[test]
    fn test_point_inside_zone_is_blocked_during_window() {
        let c = zone();
        assert_eq!(
            c.blocked_times_at(Point::new(5.5, 0.0)),
            Some(Interval::new(t(10.0), t(12.0)))
        );
        assert_eq!(c.blocked_times_at(Point::new(7.0, 0.0)), None);
        assert!(c.covers(Point::new(5.5, 0.0), t(11.0)));
        assert!(!c.covers(Point::new(5.5, 0.0), t(12.0)));
    }

    #[test]
    fn test_edge_through_zone() {
        // Unit speed along y = 0: inside the zone for s in (4, 6).
        let e = Edge::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
        let w = zone().blocked_departures(&e).unwrap();
        assert!((w.start().value() - 4.0).abs() < 1e-6);
        assert!((w.end().value() - 8.0).abs() < 1e-6);
        assert!(w.contains(t(5.0)));
        assert!(!w.contains(t(8.1)));
        assert!(!w.contains(t(3.9)));
    }

    #[test]
    fn test_edge_missing_zone() {
        let e = Edge::new(Point::new(0.0, 3.0), Point::new(10.0, 3.0), 1.0);
        assert!(zone().blocked_departures(&e).is_none());
    }

    #[test]
    fn test_unbounded_zone_blocks_all_later_departures() {
        let c = Constraint::new(
            AgentId::new(1),
            Point::new(5.0, 0.0),
            1.0,
            TimePoint::new(3.0).onwards(),
        );
        let e = Edge::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
        let w = c.blocked_departures(&e).unwrap();
        assert!(w.end().is_infinite());
        assert!((w.start().value() + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_moving_zone_only_blocks_where_it_is() {
        // The zone sweeps x = 0 -> 4 along y = 0 during [0, 4).
        let c = Constraint::following(
            AgentId::new(0),
            Motion::between(Point::new(0.0, 0.0), t(0.0), Point::new(4.0, 0.0), t(4.0)),
            1.0,
        );
        let w = c.blocked_times_at(Point::new(2.0, 0.0)).unwrap();
        assert!((w.start().value() - 1.0).abs() < 1e-9);
        assert!((w.end().value() - 3.0).abs() < 1e-9);
        // Resting where the zone ends is fine once the window is over.
        assert!(c.blocked_times_at(Point::new(6.0, 0.0)).is_none());
        assert!(c.covers(Point::new(3.5, 0.0), t(3.0)));
        assert!(!c.covers(Point::new(0.5, 0.0), t(3.0)));
    }
}
