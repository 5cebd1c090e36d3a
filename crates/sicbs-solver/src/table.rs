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

//! # Safe-Interval Table
//!
//! Answers, for a point or a straight move, which times are free of
//! collisions with the static obstacles, with every committed path and with
//! the constraints placed on the querying agent.
//!
//! All answers are [`IntervalSet`]s over [`TimePoint`]: sorted, merged and
//! half-open. The table never samples time; every window is computed from the
//! linear motion between waypoints.

use crate::{
    config::GoalHoldPolicy,
    constraint::Constraint,
    intervalset::IntervalSet,
    motion::{Edge, Motion, occupancy, unsafe_departures, unsafe_window_at_point},
};
use sicbs_core::{
    geometry::{Point, Segment},
    time::TimePoint,
};
use sicbs_model::{env::Environment, id::AgentId, path::Path};

pub type SafeIntervals = IntervalSet<TimePoint>;

#[derive(Debug, Clone)]
struct Committed {
    path: Path,
    motions: Vec<Motion>,
}

#[derive(Debug, Clone)]
pub struct SafeIntervalTable<'env> {
    env: &'env Environment,
    committed: Vec<Option<Committed>>,
    constraints: Vec<Vec<Constraint>>,
    hold: GoalHoldPolicy,
}

impl<'env> SafeIntervalTable<'env> {
    pub fn new(env: &'env Environment, hold: GoalHoldPolicy) -> Self {
        let n = env.num_agents();
        Self {
            env,
            committed: vec![None; n],
            constraints: vec![Vec::new(); n],
            hold,
        }
    }

    #[inline]
    pub fn env(&self) -> &'env Environment {
        self.env
    }

    #[inline]
    pub fn hold_policy(&self) -> GoalHoldPolicy {
        self.hold
    }

    #[inline]
    pub fn is_obstacle_free(&self, point: Point, radius: f64) -> bool {
        self.env.is_obstacle_free(point, radius)
    }

    /// Commits (or replaces) the path of `agent`.
    ///
    /// # Panics
    ///
    /// Panics if `agent` is not part of the environment.
    pub fn insert_path(&mut self, agent: AgentId, path: Path) {
        let motions = occupancy(&path, self.hold);
        self.committed[agent.value()] = Some(Committed { path, motions });
    }

    /// Removes the committed path of `agent`, returning it.
    pub fn remove_path(&mut self, agent: AgentId) -> Option<Path> {
        self.committed
            .get_mut(agent.value())
            .and_then(Option::take)
            .map(|c| c.path)
    }

    #[inline]
    pub fn path(&self, agent: AgentId) -> Option<&Path> {
        self.committed
            .get(agent.value())
            .and_then(Option::as_ref)
            .map(|c| &c.path)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints[constraint.agent().value()].push(constraint);
    }

    pub fn clear_constraints(&mut self, agent: AgentId) {
        if let Some(list) = self.constraints.get_mut(agent.value()) {
            list.clear();
        }
    }

    #[inline]
    pub fn constraints(&self, agent: AgentId) -> &[Constraint] {
        self.constraints
            .get(agent.value())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn committed_except(
        &self,
        skip: Option<AgentId>,
    ) -> impl Iterator<Item = (AgentId, &Committed)> + '_ {
        self.committed
            .iter()
            .enumerate()
            .filter(move |(i, _)| skip.is_none_or(|s| s.value() != *i))
            .filter_map(|(i, c)| c.as_ref().map(|c| (AgentId::new(i), c)))
    }

    #[inline]
    fn radius_of(&self, agent: AgentId) -> f64 {
        self.env
            .agent(agent)
            .map(|a| a.radius())
            .unwrap_or_default()
    }

    /// Safe times for a disc of `radius` resting at `point`, considering the
    /// obstacles and every committed path.
    pub fn safe_intervals(&self, point: Point, radius: f64) -> SafeIntervals {
        self.safe_intervals_impl(None, point, radius)
    }

    /// Safe times for `agent` resting at `point`: its own path is skipped and
    /// its constraints are applied.
    pub fn safe_intervals_for(&self, agent: AgentId, point: Point) -> SafeIntervals {
        self.safe_intervals_impl(Some(agent), point, self.radius_of(agent))
    }

    fn safe_intervals_impl(
        &self,
        agent: Option<AgentId>,
        point: Point,
        radius: f64,
    ) -> SafeIntervals {
        if !self.is_obstacle_free(point, radius) {
            return SafeIntervals::new();
        }
        let mut blocked: Vec<_> = Vec::new();
        for (other, c) in self.committed_except(agent) {
            let clearance = radius + self.radius_of(other);
            blocked.extend(
                c.motions
                    .iter()
                    .filter_map(|m| unsafe_window_at_point(m, point, clearance)),
            );
        }
        if let Some(agent) = agent {
            blocked.extend(
                self.constraints(agent)
                    .iter()
                    .filter_map(|c| c.blocked_times_at(point)),
            );
        }
        let full = SafeIntervals::single(TimePoint::ZERO.onwards());
        full.subtract(&SafeIntervals::from_vec(blocked))
    }

    /// Departure times `τ >= 0` for which `agent` (with `radius`, moving at
    /// `velocity`) can travel straight from `from` to `to` during
    /// `[τ, τ + |to - from| / velocity]` without touching an obstacle, a
    /// committed path or one of its constraints.
    pub fn safe_departures(
        &self,
        agent: AgentId,
        from: Point,
        to: Point,
        radius: f64,
        velocity: f64,
    ) -> SafeIntervals {
        if !self
            .env
            .is_segment_obstacle_free(&Segment::new(from, to), radius)
        {
            return SafeIntervals::new();
        }
        let edge = Edge::new(from, to, velocity);
        let mut blocked: Vec<_> = Vec::new();
        for (other, c) in self.committed_except(Some(agent)) {
            let clearance = radius + self.radius_of(other);
            blocked.extend(
                c.motions
                    .iter()
                    .filter_map(|m| unsafe_departures(&edge, m, clearance)),
            );
        }
        blocked.extend(
            self.constraints(agent)
                .iter()
                .filter_map(|c| c.blocked_departures(&edge)),
        );
        let full = SafeIntervals::single(TimePoint::ZERO.onwards());
        full.subtract(&SafeIntervals::from_vec(blocked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sicbs_core::{geometry::Bounds, primitives::Interval};
    use sicbs_model::{
        agent::AgentSpec, env::EnvironmentBuilder, obstacle::Obstacle, path::Waypoint,
    };

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn t(v: f64) -> TimePoint {
        TimePoint::new(v)
    }

    fn env() -> Environment {
        let spec = AgentSpec {
            velocity: 1.0,
            ..AgentSpec::default()
        };
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        b.add_obstacle(Obstacle::rectangular(p(8.0, 8.0), 2.0, 2.0));
        b.add_agent(spec.place(p(1.0, 5.0), p(9.0, 5.0))).unwrap();
        b.add_agent(spec.place(p(5.0, 1.0), p(5.0, 9.0))).unwrap();
        b.build().unwrap()
    }

    fn horizontal_path() -> Path {
        Path::new(vec![
            Waypoint::new(p(1.0, 5.0), t(0.0)),
            Waypoint::new(p(9.0, 5.0), t(8.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_table_is_always_safe() {
        let env = env();
        let table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let safe = table.safe_intervals(p(3.0, 3.0), 0.5);
        assert_eq!(safe.as_slice(), &[TimePoint::ZERO.onwards()]);
    }

    #[test]
    fn test_point_inside_obstacle_is_never_safe() {
        let env = env();
        let table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        assert!(table.safe_intervals(p(8.0, 8.0), 0.5).is_empty());
        assert!(!table.is_obstacle_free(p(8.0, 8.0), 0.5));
    }

    #[test]
    fn test_insert_then_query_blocks_the_crossing_window() {
        let env = env();
        let mut table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        table.insert_path(AgentId::new(0), horizontal_path());
        // Agent 0 passes x = 5 at t = 4; clearance is 1.0.
        let safe = table.safe_intervals(p(5.0, 5.0), 0.5);
        assert_eq!(safe.len(), 2);
        assert_eq!(safe[0].start(), TimePoint::ZERO);
        assert!((safe[0].end().value() - 3.0).abs() < 1e-9);
        assert!((safe[1].start().value() - 5.0).abs() < 1e-9);
        assert!(safe[1].end().is_infinite());
    }

    #[test]
    fn test_goal_hold_policy() {
        let env = env();
        let mut hold = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        hold.insert_path(AgentId::new(0), horizontal_path());
        let safe = hold.safe_intervals(p(9.0, 5.0), 0.5);
        assert_eq!(safe.len(), 1);
        assert!((safe[0].end().value() - 7.0).abs() < 1e-9);

        let mut vanish = SafeIntervalTable::new(&env, GoalHoldPolicy::Vanish);
        vanish.insert_path(AgentId::new(0), horizontal_path());
        let safe = vanish.safe_intervals(p(9.0, 5.0), 0.5);
        assert_eq!(safe.len(), 2);
        assert_eq!(safe[1].start(), t(8.0));
    }

    #[test]
    fn test_single_waypoint_path_blocks_forever() {
        let env = env();
        let mut table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        table.insert_path(AgentId::new(0), Path::stationary(p(5.0, 5.0)));
        assert!(table.safe_intervals(p(5.5, 5.0), 0.5).is_empty());
    }

    #[test]
    fn test_own_path_is_ignored_and_removal_restores() {
        let env = env();
        let mut table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let a0 = AgentId::new(0);
        table.insert_path(a0, horizontal_path());
        assert_eq!(table.safe_intervals_for(a0, p(5.0, 5.0)).len(), 1);
        assert_eq!(table.remove_path(a0), Some(horizontal_path()));
        assert_eq!(table.safe_intervals(p(5.0, 5.0), 0.5).len(), 1);
        assert!(table.path(a0).is_none());
    }

    #[test]
    fn test_constraints_only_apply_to_their_agent() {
        let env = env();
        let mut table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let (a0, a1) = (AgentId::new(0), AgentId::new(1));
        table.add_constraint(Constraint::new(
            a1,
            p(5.0, 5.0),
            1.0,
            Interval::new(t(2.0), t(4.0)),
        ));
        assert_eq!(table.safe_intervals_for(a0, p(5.0, 5.0)).len(), 1);
        let safe = table.safe_intervals_for(a1, p(5.0, 5.0));
        assert_eq!(
            safe.as_slice(),
            &[
                Interval::new(TimePoint::ZERO, t(2.0)),
                t(4.0).onwards()
            ]
        );
        table.clear_constraints(a1);
        assert!(table.constraints(a1).is_empty());
    }

    #[test]
    fn test_departures_avoid_crossing_agent() {
        let env = env();
        let mut table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        table.insert_path(AgentId::new(0), horizontal_path());
        let a1 = AgentId::new(1);
        // Crossing y = 5 from (5, 3) to (5, 7) at unit speed takes 4.
        let deps = table.safe_departures(a1, p(5.0, 3.0), p(5.0, 7.0), 0.5, 1.0);
        assert!(!deps.contains_point(t(2.0)));
        assert!(deps.contains_point(t(0.0)));
        assert!(deps.contains_point(t(10.0)));
        // Every safe departure keeps a distance of at least 1.0.
        let other = horizontal_path();
        for iv in deps.iter() {
            let tau = iv.start().value();
            for k in 0..=40 {
                let s = 4.0 * k as f64 / 40.0;
                let ours = p(5.0, 3.0 + s);
                let theirs = other.position_at(t(tau + s));
                assert!(ours.distance(theirs) >= 1.0 - 1e-6);
            }
        }
    }

    #[test]
    fn test_departures_blocked_by_obstacle() {
        let env = env();
        let table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let deps = table.safe_departures(AgentId::new(0), p(5.0, 8.0), p(9.5, 8.0), 0.5, 1.0);
        assert!(deps.is_empty());
    }
}
