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

//! # Safe-Interval RRT
//!
//! Single-agent planner over (point, safe interval) pairs. The tree grows by
//! random sampling like an RRT, but every node is tied to one safe interval of
//! its point and stores the earliest arrival inside it. Edges are accepted
//! only for departure times that are continuously safe, so the extracted path
//! never touches a committed path, a constraint or an obstacle.
//!
//! The planner is stateless; each call to [`SiRrtPlanner::plan`] grows a fresh
//! tree from the agent's start.

pub mod tree;

use crate::{
    config::PlannerConfig,
    err::PlannerError,
    table::{SafeIntervalTable, SafeIntervals},
};
use rand::Rng;
use sicbs_core::{
    geometry::Point,
    time::{TimeDelta, TimeInterval, TimePoint},
};
use sicbs_model::{agent::Agent, path::Path};
use tracing::{debug, instrument, trace};
use tree::{NodeId, Tree, TreeNode};

#[derive(Debug, Clone, Default)]
pub struct SiRrtPlanner {
    config: PlannerConfig,
}

/// Earliest departure from `parent` that reaches `target` inside its safe
/// interval, given the safe departures of the connecting edge.
fn earliest_transfer(
    parent: &TreeNode,
    target: TimeInterval,
    travel: TimeDelta,
    departures: &SafeIntervals,
) -> Option<TimePoint> {
    let lo = parent.arrival.max(target.start() - travel);
    let hi = parent.interval.end().min(target.end() - travel);
    if lo >= hi {
        return None;
    }
    let tau = departures.earliest_at_or_after(lo)?;
    (tau < hi).then_some(tau)
}

impl SiRrtPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn sample<R: Rng + ?Sized>(
        &self,
        table: &SafeIntervalTable<'_>,
        agent: &Agent,
        rng: &mut R,
    ) -> Point {
        if rng.random::<f64>() * 100.0 < agent.goal_sample_rate() {
            return agent.goal();
        }
        let b = table.env().bounds();
        Point::new(
            rng.random_range(0.0..=b.width()),
            rng.random_range(0.0..=b.height()),
        )
    }

    /// Plans `agent` from its start to its goal against `table`.
    ///
    /// The table is read only: the agent's own committed path is ignored and
    /// its constraints are honored.
    #[instrument(level = "debug", skip_all, fields(agent = agent.id().value()), err(Display))]
    pub fn plan<R: Rng + ?Sized>(
        &self,
        table: &SafeIntervalTable<'_>,
        agent: &Agent,
        rng: &mut R,
    ) -> Result<Path, PlannerError> {
        let id = agent.id();
        let start = agent.start();
        let goal = agent.goal();
        let velocity = agent.velocity();
        let radius = agent.radius();
        let near_radius = agent.max_expand_distance() * self.config.near_radius_factor;

        let root_interval = table
            .safe_intervals_for(id, start)
            .first_containing(TimePoint::ZERO)
            .ok_or(PlannerError::StartUnsafe { agent: id, start })?;
        if start.distance(goal) <= agent.goal_threshold() && root_interval.end().is_infinite() {
            return Ok(Path::stationary(start));
        }

        let mut tree = Tree::with_root(start, root_interval);
        let bounds = table.env().bounds();

        for iteration in 0..agent.iterations() {
            let sample = self.sample(table, agent, rng);
            let nearest = tree.nearest(sample);
            let mut candidate = tree[nearest]
                .point
                .steer_towards(sample, agent.max_expand_distance());
            if candidate.distance(goal) <= agent.goal_threshold() {
                candidate = goal;
            }
            if !bounds.contains(candidate) || !table.is_obstacle_free(candidate, radius) {
                continue;
            }

            let intervals = table.safe_intervals_for(id, candidate);
            if intervals.is_empty() {
                trace!(%candidate, "No safe interval at candidate; discarded");
                continue;
            }

            let mut parents = tree.within(candidate, near_radius);
            if !parents.contains(&nearest) {
                parents.push(nearest);
                parents.sort_unstable();
            }
            // Departures only depend on the two points; one query per parent
            // serves every interval of the candidate.
            let edges: Vec<(NodeId, TimeDelta, SafeIntervals)> = parents
                .into_iter()
                .filter(|&p| tree[p].point != candidate)
                .map(|p| {
                    let from = tree[p].point;
                    let travel = TimeDelta::travel(from.distance(candidate), velocity);
                    let deps = table.safe_departures(id, from, candidate, radius, velocity);
                    (p, travel, deps)
                })
                .collect();

            let mut touched: Vec<NodeId> = Vec::new();
            for interval in intervals.iter().copied() {
                let mut best: Option<(TimePoint, TimePoint, NodeId)> = None;
                for (p, travel, deps) in &edges {
                    let Some(tau) = earliest_transfer(&tree[*p], interval, *travel, deps) else {
                        continue;
                    };
                    let arrival = tau + *travel;
                    if best.is_none_or(|(a, _, _)| arrival < a) {
                        best = Some((arrival, tau, *p));
                    }
                }
                let Some((arrival, departed, parent)) = best else {
                    continue;
                };

                let node_id = match tree.find(candidate, interval) {
                    Some(existing) => {
                        let node = tree.get_mut(existing);
                        if arrival >= node.arrival {
                            continue;
                        }
                        node.arrival = arrival;
                        node.departed = departed;
                        node.parent = Some(parent);
                        existing
                    }
                    None => tree.push(TreeNode {
                        point: candidate,
                        interval,
                        parent: Some(parent),
                        arrival,
                        departed,
                    }),
                };
                touched.push(node_id);
            }

            if self.config.rewire && !touched.is_empty() {
                self.rewire(&mut tree, table, agent, candidate, &touched, near_radius);
            }

            let reached = touched
                .iter()
                .copied()
                .find(|&n| tree[n].point == goal && tree[n].interval.end().is_infinite());
            if let Some(goal_node) = reached {
                let path = Path::new(tree.waypoints_to(goal_node))?;
                debug!(
                    iterations = iteration + 1,
                    nodes = tree.len(),
                    arrival = %path.arrival_time(),
                    "Goal reached"
                );
                return Ok(path);
            }
        }

        Err(PlannerError::Exhausted {
            agent: id,
            iterations: agent.iterations(),
            nodes: tree.len(),
        })
    }

    /// Re-parents nearby nodes through the freshly touched nodes at
    /// `candidate` when that lets them be reached earlier.
    fn rewire(
        &self,
        tree: &mut Tree,
        table: &SafeIntervalTable<'_>,
        agent: &Agent,
        candidate: Point,
        touched: &[NodeId],
        near_radius: f64,
    ) {
        let velocity = agent.velocity();
        let neighbours: Vec<(NodeId, TimeDelta, SafeIntervals)> = tree
            .within(candidate, near_radius)
            .into_iter()
            .filter(|&n| n != tree.root() && tree[n].point != candidate)
            .map(|n| {
                let to = tree[n].point;
                let travel = TimeDelta::travel(candidate.distance(to), velocity);
                let deps =
                    table.safe_departures(agent.id(), candidate, to, agent.radius(), velocity);
                (n, travel, deps)
            })
            .collect();

        for &via in touched {
            for (n, travel, deps) in &neighbours {
                let target = tree[*n];
                let Some(tau) = earliest_transfer(&tree[via], target.interval, *travel, deps)
                else {
                    continue;
                };
                let arrival = tau + *travel;
                if arrival < target.arrival {
                    trace!(node = %n, via = %via, from = %target.arrival, to = %arrival, "Rewired");
                    let node = tree.get_mut(*n);
                    node.arrival = arrival;
                    node.departed = tau;
                    node.parent = Some(via);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GoalHoldPolicy, constraint::Constraint};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sicbs_core::geometry::Bounds;
    use sicbs_model::{
        agent::AgentSpec,
        env::{Environment, EnvironmentBuilder},
        id::AgentId,
        obstacle::Obstacle,
        path::Waypoint,
    };

    fn spec() -> AgentSpec {
        AgentSpec {
            radius: 0.5,
            max_expand_distance: 3.0,
            velocity: 1.0,
            goal_threshold: 0.5,
            iterations: 5000,
            goal_sample_rate: 20.0,
        }
    }

    fn single_agent_env(obstacles: Vec<Obstacle>) -> Environment {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        for o in obstacles {
            b.add_obstacle(o);
        }
        b.add_agent(spec().place(Point::new(1.0, 5.0), Point::new(9.0, 5.0)))
            .unwrap();
        b.build().unwrap()
    }

    fn assert_well_formed(path: &Path, agent: &Agent) {
        let w = path.waypoints();
        assert_eq!(w[0].point(), agent.start());
        assert_eq!(w[0].time(), TimePoint::ZERO);
        assert_eq!(path.goal(), agent.goal());
        for leg in path.legs() {
            let d = leg.segment().length();
            let dt = (leg.to_waypoint().time() - leg.from_waypoint().time()).value();
            // Never faster than the agent's velocity.
            assert!(d <= agent.velocity() * dt + 1e-9);
        }
    }

    #[test]
    fn test_plans_on_empty_map() {
        let env = single_agent_env(vec![]);
        let table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let agent = &env.agents()[0];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let path = SiRrtPlanner::default().plan(&table, agent, &mut rng).unwrap();
        assert_well_formed(&path, agent);
        // Straight-line distance is 8 at unit speed.
        assert!(path.arrival_time().value() >= 8.0 - 1e-9);
    }

    #[test]
    fn test_is_deterministic_for_a_seed() {
        let env = single_agent_env(vec![]);
        let table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let agent = &env.agents()[0];
        let planner = SiRrtPlanner::default();
        let a = planner
            .plan(&table, agent, &mut ChaCha8Rng::seed_from_u64(3))
            .unwrap();
        let b = planner
            .plan(&table, agent, &mut ChaCha8Rng::seed_from_u64(3))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_avoids_circular_obstacle() {
        let circle = Obstacle::circular(Point::new(5.0, 5.0), 2.0);
        let env = single_agent_env(vec![circle]);
        let table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let agent = &env.agents()[0];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let path = SiRrtPlanner::default().plan(&table, agent, &mut rng).unwrap();
        assert_well_formed(&path, agent);
        for w in path.waypoints() {
            assert!(w.point().distance(Point::new(5.0, 5.0)) >= 2.0);
        }
        for leg in path.legs() {
            assert!(leg.segment().distance_to_point(Point::new(5.0, 5.0)) >= 2.0 + 0.5 - 1e-9);
        }
    }

    #[test]
    fn test_corner_to_corner_detours_around_circle() {
        let center = Point::new(5.0, 5.0);
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        b.add_obstacle(Obstacle::circular(center, 2.0));
        b.add_agent(spec().place(Point::new(0.0, 0.0), Point::new(9.0, 9.0)))
            .unwrap();
        let env = b.build().unwrap();
        let table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let agent = &env.agents()[0];
        for seed in 0..4 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let path = SiRrtPlanner::default().plan(&table, agent, &mut rng).unwrap();
            assert_well_formed(&path, agent);
            for w in path.waypoints() {
                assert!(w.point().distance(center) >= 2.0);
            }
            for leg in path.legs() {
                assert!(leg.segment().distance_to_point(center) >= 2.0 + 0.5 - 1e-9);
            }
        }
    }

    #[test]
    fn test_start_inside_blocked_zone_is_unsafe() {
        let env = single_agent_env(vec![]);
        let mut table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        table.add_constraint(Constraint::new(
            AgentId::new(0),
            Point::new(1.0, 5.0),
            1.0,
            TimePoint::ZERO.onwards(),
        ));
        let agent = &env.agents()[0];
        let err = SiRrtPlanner::default()
            .plan(&table, agent, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, PlannerError::StartUnsafe { .. }));
    }

    #[test]
    fn test_unreachable_goal_exhausts() {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        let spec = AgentSpec {
            iterations: 200,
            ..spec()
        };
        b.add_agent(spec.place(Point::new(1.0, 5.0), Point::new(9.0, 5.0)))
            .unwrap();
        let env = b.build().unwrap();
        let mut table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        // The goal is forbidden from t = 0 on.
        table.add_constraint(Constraint::new(
            AgentId::new(0),
            Point::new(9.0, 5.0),
            0.5,
            TimePoint::ZERO.onwards(),
        ));
        let err = SiRrtPlanner::default()
            .plan(&table, &env.agents()[0], &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, PlannerError::Exhausted { iterations: 200, .. }));
    }

    #[test]
    fn test_returned_path_is_edge_safe_against_committed_path() {
        let spec = spec();
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        b.add_agent(spec.place(Point::new(1.0, 5.0), Point::new(9.0, 5.0)))
            .unwrap();
        b.add_agent(spec.place(Point::new(5.0, 1.0), Point::new(5.0, 9.0)))
            .unwrap();
        let env = b.build().unwrap();
        let mut table = SafeIntervalTable::new(&env, GoalHoldPolicy::HoldForever);
        let committed = Path::new(vec![
            Waypoint::new(Point::new(1.0, 5.0), TimePoint::ZERO),
            Waypoint::new(Point::new(9.0, 5.0), TimePoint::new(8.0)),
        ])
        .unwrap();
        table.insert_path(AgentId::new(0), committed.clone());

        let agent = &env.agents()[1];
        let path = SiRrtPlanner::default()
            .plan(&table, agent, &mut ChaCha8Rng::seed_from_u64(5))
            .unwrap();
        assert_well_formed(&path, agent);

        // Dense check of both trajectories over the planned horizon.
        let horizon = path.arrival_time().value() + 2.0;
        let steps = 4000;
        for k in 0..=steps {
            let tt = TimePoint::new(horizon * k as f64 / steps as f64);
            let d = path.position_at(tt).distance(committed.position_at(tt));
            assert!(d >= 1.0 - 1e-6, "distance {} at {}", d, tt);
        }
    }
}
