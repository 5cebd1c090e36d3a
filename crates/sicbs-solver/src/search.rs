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

//! # Conflict Search
//!
//! Best-first search over a constraint tree. Every node owns one path per
//! agent and the constraints that produced them. Expanding a node looks for
//! the earliest pairwise conflict; if there is none, the node is a solution.
//! Otherwise two children are created. Each one forbids one of the two agents
//! from overlapping the other one's disc, as it moves, during the conflict
//! window; only the constrained agent is re-planned.
//!
//! Children never share state with their parent: each one clones the parent's
//! paths and constraints and re-plans against a private [`SafeIntervalTable`],
//! so both children of a node can be built in parallel.

use crate::{
    config::{ConflictSearchConfig, CoordinationMode},
    conflict::{Conflict, avoidance_constraints, earliest_conflict},
    constraint::Constraint,
    err::{ConflictSearchError, InfeasibleConstraintError, PlannerError},
    sirrt::SiRrtPlanner,
    table::SafeIntervalTable,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use sicbs_core::cost::Cost;
use sicbs_model::{agent::Agent, env::Environment, id::AgentId, path::Path, sol::Solution};
use std::{cmp::Ordering, collections::BinaryHeap, fmt::Display};
use tracing::{debug, info, instrument, trace, warn};

/// Derives an independent RNG for one planner run.
#[inline]
fn make_job_rng(base_seed: u64, agent: usize, attempt: usize, node: usize) -> ChaCha8Rng {
    let s = base_seed
        ^ ((agent as u64).wrapping_mul(0x9E37_79B1_85EB_CA87))
        ^ ((attempt as u64).rotate_left(17))
        ^ ((node as u64).wrapping_mul(0xD134_2543_DE82_E285));
    ChaCha8Rng::seed_from_u64(s)
}

#[derive(Debug, Clone)]
struct CtNode {
    id: usize,
    paths: Vec<Path>,
    constraints: Vec<Constraint>,
    cost: Cost,
}

impl PartialEq for CtNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CtNode {}

impl PartialOrd for CtNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CtNode {
    // Reversed: BinaryHeap is a max-heap and we pop the lowest (cost, id).
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    pub expansions: usize,
    pub generated: usize,
    pub pruned: usize,
}

impl Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchStats(expansions: {}, generated: {}, pruned: {})",
            self.expansions, self.generated, self.pruned
        )
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    solution: Solution,
    cost: Cost,
    stats: SearchStats,
}

impl SearchOutcome {
    #[inline]
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    #[inline]
    pub fn into_solution(self) -> Solution {
        self.solution
    }

    /// Objective value of the solution.
    #[inline]
    pub fn cost(&self) -> Cost {
        self.cost
    }

    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }
}

pub struct ConflictSearch<'env> {
    env: &'env Environment,
    config: ConflictSearchConfig,
    planner: SiRrtPlanner,
}

impl<'env> ConflictSearch<'env> {
    pub fn new(env: &'env Environment, config: ConflictSearchConfig) -> Self {
        let planner = SiRrtPlanner::new(config.planner.clone());
        Self {
            env,
            config,
            planner,
        }
    }

    #[inline]
    pub fn config(&self) -> &ConflictSearchConfig {
        &self.config
    }

    /// Private table for re-planning one agent of a node.
    fn table_for(&self, paths: &[Path], constraints: &[Constraint]) -> SafeIntervalTable<'env> {
        let mut table = SafeIntervalTable::new(self.env, self.config.goal_hold);
        if self.config.coordination == CoordinationMode::Prioritized {
            for (i, p) in paths.iter().enumerate() {
                table.insert_path(AgentId::new(i), p.clone());
            }
        }
        for c in constraints {
            table.add_constraint(*c);
        }
        table
    }

    /// Runs the planner with a fresh seed per attempt. An unsafe start is
    /// not retried; no seed can fix it.
    fn plan_with_retries(
        &self,
        table: &SafeIntervalTable<'_>,
        agent: &Agent,
        node: usize,
    ) -> Result<Path, PlannerError> {
        let attempts = self.config.replan_attempts.max(1);
        let mut attempt = 0;
        loop {
            let mut rng = make_job_rng(self.config.seed, agent.id().value(), attempt, node);
            match self.planner.plan(table, agent, &mut rng) {
                Ok(path) => return Ok(path),
                Err(e @ PlannerError::StartUnsafe { .. }) => return Err(e),
                Err(e) if attempt + 1 >= attempts => return Err(e),
                Err(e) => {
                    trace!(attempt, error = %e, "Planner attempt failed; retrying");
                    attempt += 1;
                }
            }
        }
    }

    fn root(&self) -> Result<CtNode, ConflictSearchError> {
        let agents = self.env.agents();
        let paths = match self.config.coordination {
            CoordinationMode::Prioritized => {
                let mut table = SafeIntervalTable::new(self.env, self.config.goal_hold);
                let mut paths = Vec::with_capacity(agents.len());
                let alone = SafeIntervalTable::new(self.env, self.config.goal_hold);
                for agent in agents {
                    let path = match self.plan_with_retries(&table, agent, 0) {
                        Ok(path) => path,
                        Err(e) => {
                            // Branching has to sort this agent out.
                            debug!(
                                agent = agent.id().value(),
                                error = %e,
                                "Cannot yield to earlier agents; planning alone"
                            );
                            self.plan_with_retries(&alone, agent, 0)?
                        }
                    };
                    table.insert_path(agent.id(), path.clone());
                    paths.push(path);
                }
                paths
            }
            CoordinationMode::ConstraintsOnly => {
                let plan_one = |agent: &Agent| {
                    let table = SafeIntervalTable::new(self.env, self.config.goal_hold);
                    self.plan_with_retries(&table, agent, 0)
                };
                if self.config.parallel {
                    agents.par_iter().map(plan_one).collect::<Result<Vec<_>, _>>()?
                } else {
                    agents.iter().map(plan_one).collect::<Result<Vec<_>, _>>()?
                }
            }
        };
        let cost = self.config.objective.evaluate(&paths);
        Ok(CtNode {
            id: 0,
            paths,
            constraints: Vec::new(),
            cost,
        })
    }

    /// Child of `parent` in which `agent` must keep clear of `other` while
    /// `other` follows its path during the conflict window.
    fn child(
        &self,
        parent: &CtNode,
        conflict: &Conflict,
        agent: AgentId,
        other: AgentId,
        id: usize,
    ) -> Result<CtNode, InfeasibleConstraintError> {
        let me = &self.env.agents()[agent.value()];
        let them = &self.env.agents()[other.value()];

        let mut constraints = parent.constraints.clone();
        constraints.extend(avoidance_constraints(
            agent,
            &parent.paths[other.value()],
            self.config.goal_hold,
            conflict.window(),
            me.radius() + them.radius(),
        ));

        let table = self.table_for(&parent.paths, &constraints);
        let path = self
            .plan_with_retries(&table, me, id)
            .map_err(|e| InfeasibleConstraintError::new(agent, self.config.replan_attempts, e))?;

        let mut paths = parent.paths.clone();
        paths[agent.value()] = path;
        let cost = self.config.objective.evaluate(&paths);
        Ok(CtNode {
            id,
            paths,
            constraints,
            cost,
        })
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(
            agents = self.env.num_agents(),
            objective = %self.config.objective,
            coordination = ?self.config.coordination
        ),
        err(Display)
    )]
    pub fn solve(&self) -> Result<SearchOutcome, ConflictSearchError> {
        let mut stats = SearchStats::default();
        let root = self.root()?;
        stats.generated = 1;
        info!(cost = %root.cost, "Root planned");

        let mut open = BinaryHeap::new();
        open.push(root);
        let mut next_id = 1;

        while let Some(node) = open.pop() {
            if stats.expansions >= self.config.max_expansions {
                let best = node.cost;
                warn!(expansions = stats.expansions, best = %best, "Expansion budget exhausted");
                return Err(ConflictSearchError::ExpansionBudgetExhausted {
                    expansions: stats.expansions,
                    best_open_cost: Some(best),
                });
            }
            stats.expansions += 1;

            let Some(conflict) = earliest_conflict(self.env, &node.paths, self.config.goal_hold)
            else {
                info!(
                    cost = %node.cost,
                    expansions = stats.expansions,
                    generated = stats.generated,
                    pruned = stats.pruned,
                    "Conflict-free solution found"
                );
                return Ok(SearchOutcome {
                    solution: Solution::new(node.paths),
                    cost: node.cost,
                    stats,
                });
            };
            debug!(node = node.id, cost = %node.cost, %conflict, "Branching");

            let (a, b) = (conflict.a(), conflict.b());
            let jobs = [(a, b, next_id), (b, a, next_id + 1)];
            next_id += 2;

            let children: Vec<_> = if self.config.parallel {
                jobs.par_iter()
                    .map(|&(x, y, id)| self.child(&node, &conflict, x, y, id))
                    .collect()
            } else {
                jobs.iter()
                    .map(|&(x, y, id)| self.child(&node, &conflict, x, y, id))
                    .collect()
            };

            for child in children {
                match child {
                    Ok(c) => {
                        trace!(node = c.id, cost = %c.cost, "Child generated");
                        stats.generated += 1;
                        open.push(c);
                    }
                    Err(e) => {
                        debug!(error = %e, "Child pruned");
                        stats.pruned += 1;
                    }
                }
            }
        }

        Err(ConflictSearchError::Infeasible {
            expansions: stats.expansions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GoalHoldPolicy, Objective};
    use sicbs_core::{
        geometry::{Bounds, Point, Segment},
        time::TimePoint,
    };
    use sicbs_model::{
        agent::AgentSpec,
        env::EnvironmentBuilder,
        generator::{InstanceGenConfig, InstanceGenerator},
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

    fn build(obstacles: &[Obstacle], tasks: &[((f64, f64), (f64, f64))]) -> Environment {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        for o in obstacles {
            b.add_obstacle(*o);
        }
        for &(s, g) in tasks {
            b.add_agent(spec().place(s.into(), g.into())).unwrap();
        }
        b.build().unwrap()
    }

    fn crossing() -> Environment {
        build(&[], &[((1.0, 5.0), (9.0, 5.0)), ((5.0, 1.0), (5.0, 9.0))])
    }

    /// The uncoordinated plan: straight to the goal at full speed.
    fn straight_path(agent: &Agent) -> Path {
        let arrival = agent.start().distance(agent.goal()) / agent.velocity();
        Path::new(vec![
            Waypoint::new(agent.start(), TimePoint::ZERO),
            Waypoint::new(agent.goal(), TimePoint::new(arrival)),
        ])
        .unwrap()
    }

    fn is_straight_and_on_time(path: &Path, agent: &Agent) -> bool {
        let line = Segment::new(agent.start(), agent.goal());
        let direct = straight_path(agent).arrival_time().value();
        (path.arrival_time().value() - direct).abs() < 1e-6
            && path
                .waypoints()
                .iter()
                .all(|w| line.distance_to_point(w.point()) < 1e-6)
    }

    fn assert_valid(env: &Environment, solution: &Solution) {
        assert_eq!(solution.num_agents(), env.num_agents());
        for (id, path) in solution.iter() {
            let agent = env.agent(id).unwrap();
            assert_eq!(path.start(), agent.start());
            assert_eq!(path.goal(), agent.goal());
        }
        assert!(earliest_conflict(env, solution.paths(), GoalHoldPolicy::HoldForever).is_none());
        assert!(min_pairwise_distance(solution) >= 1.0 - 1e-4);
    }

    fn min_pairwise_distance(solution: &Solution) -> f64 {
        let horizon = solution
            .paths()
            .iter()
            .map(|p| p.arrival_time().value())
            .fold(0.0, f64::max)
            + 1.0;
        let steps = 5000;
        let mut best = f64::INFINITY;
        for k in 0..=steps {
            let t = TimePoint::new(horizon * k as f64 / steps as f64);
            let ps: Vec<Point> = solution.paths().iter().map(|p| p.position_at(t)).collect();
            for i in 0..ps.len() {
                for j in (i + 1)..ps.len() {
                    best = best.min(ps[i].distance(ps[j]));
                }
            }
        }
        best
    }

    #[test]
    fn test_job_rng_is_deterministic() {
        use rand::Rng;
        let a: u64 = make_job_rng(1, 2, 3, 4).random();
        let b: u64 = make_job_rng(1, 2, 3, 4).random();
        let c: u64 = make_job_rng(1, 2, 3, 5).random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_open_set_pops_lowest_cost_then_lowest_id() {
        let node = |id, cost| CtNode {
            id,
            paths: Vec::new(),
            constraints: Vec::new(),
            cost: Cost::new(cost),
        };
        let mut open = BinaryHeap::new();
        open.push(node(3, 5.0));
        open.push(node(1, 7.0));
        open.push(node(2, 5.0));
        let order: Vec<usize> = std::iter::from_fn(|| open.pop().map(|n| n.id)).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_crossing_agents_keep_their_distance() {
        let env = crossing();
        // Going straight at full speed, both reach (5, 5) at t = 4.
        let uncoordinated: Vec<Path> = env.agents().iter().map(straight_path).collect();
        assert!(earliest_conflict(&env, &uncoordinated, GoalHoldPolicy::HoldForever).is_some());

        let outcome = ConflictSearch::new(&env, ConflictSearchConfig::default())
            .solve()
            .unwrap();
        let solution = outcome.solution();
        assert_valid(&env, solution);
        // At least one agent leaves the line or is delayed.
        assert!(
            solution
                .iter()
                .any(|(id, path)| !is_straight_and_on_time(path, env.agent(id).unwrap()))
        );
        // Both need at least the straight-line time of 8.
        assert!(outcome.cost() >= Cost::new(16.0 - 1e-9));
    }

    #[test]
    fn test_constraints_only_coordination_resolves_crossing() {
        let env = crossing();
        let config = ConflictSearchConfig {
            coordination: CoordinationMode::ConstraintsOnly,
            parallel: false,
            ..ConflictSearchConfig::default()
        };
        let outcome = ConflictSearch::new(&env, config).solve().unwrap();
        let solution = outcome.solution();
        assert!(earliest_conflict(&env, solution.paths(), GoalHoldPolicy::HoldForever).is_none());
        assert!(min_pairwise_distance(solution) >= 1.0 - 1e-4);
    }

    #[test]
    fn test_agents_avoid_circular_obstacle() {
        let circle = Obstacle::circular(Point::new(5.0, 5.0), 2.0);
        let env = build(
            &[circle],
            &[((1.0, 5.0), (9.0, 5.0)), ((5.0, 9.0), (5.0, 1.0))],
        );
        let outcome = ConflictSearch::new(&env, ConflictSearchConfig::default())
            .solve()
            .unwrap();
        for path in outcome.solution().paths() {
            for w in path.waypoints() {
                assert!(w.point().distance(circle.center()) >= 2.0);
            }
            for leg in path.legs() {
                assert!(!circle.intersects_swept_disc(
                    leg.from_waypoint().point(),
                    leg.to_waypoint().point(),
                    0.5
                ));
            }
        }
    }

    #[test]
    fn test_is_deterministic() {
        let env = crossing();
        let run = || {
            ConflictSearch::new(&env, ConflictSearchConfig::default())
                .solve()
                .unwrap()
                .into_solution()
        };
        assert_eq!(run().paths(), run().paths());
    }

    #[test]
    fn test_makespan_objective_reports_latest_arrival() {
        let env = crossing();
        let config = ConflictSearchConfig {
            objective: Objective::Makespan,
            ..ConflictSearchConfig::default()
        };
        let outcome = ConflictSearch::new(&env, config).solve().unwrap();
        assert_eq!(outcome.cost(), outcome.solution().stats().makespan());
    }

    #[test]
    fn test_shared_goal_is_branched_on_and_found_infeasible() {
        // Whoever settles first blocks the other one's goal forever, so the
        // second agent is planned alone and both children fail.
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        let quick = AgentSpec {
            iterations: 300,
            ..spec()
        };
        b.add_agent(quick.place(Point::new(1.0, 5.0), Point::new(5.0, 5.0)))
            .unwrap();
        b.add_agent(quick.place(Point::new(9.0, 5.0), Point::new(5.0, 5.0)))
            .unwrap();
        let env = b.build().unwrap();
        let config = ConflictSearchConfig {
            replan_attempts: 1,
            ..ConflictSearchConfig::default()
        };
        let err = ConflictSearch::new(&env, config).solve().unwrap_err();
        assert_eq!(err, ConflictSearchError::Infeasible { expansions: 1 });
    }

    #[test]
    fn test_prioritized_search_branches_when_an_agent_is_boxed_in() {
        // Agents 0 to 2 settle on a ring of radius 0.99 around agent 3's
        // start within 0.81 time units. Planning them first leaves agent 3
        // no way out, so the search has to make the ring wait.
        let s = Point::new(5.0, 5.0);
        let ring = |deg: f64, r: f64| {
            let a = deg.to_radians();
            (s.x + r * a.cos(), s.y + r * a.sin())
        };
        let env = build(
            &[],
            &[
                (ring(90.0, 1.8), ring(90.0, 0.99)),
                (ring(210.0, 1.8), ring(210.0, 0.99)),
                (ring(330.0, 1.8), ring(330.0, 0.99)),
                ((s.x, s.y), (9.0, 9.0)),
            ],
        );
        let outcome = ConflictSearch::new(&env, ConflictSearchConfig::default())
            .solve()
            .unwrap();
        assert_valid(&env, outcome.solution());
        let stats = outcome.stats();
        assert!(stats.expansions >= 2, "{}", stats);
        assert!(stats.generated >= 2, "{}", stats);
        // Agent 3 can never get out once the ring is closed.
        assert!(stats.pruned >= 1, "{}", stats);
    }

    #[test]
    fn test_constraints_only_solves_generated_instance() {
        let env = InstanceGenerator::new(InstanceGenConfig::default())
            .generate()
            .unwrap();
        let config = ConflictSearchConfig {
            coordination: CoordinationMode::ConstraintsOnly,
            max_expansions: 1000,
            ..ConflictSearchConfig::default()
        };
        let outcome = ConflictSearch::new(&env, config).solve().unwrap();
        assert_valid(&env, outcome.solution());
        for path in outcome.solution().paths() {
            for leg in path.legs() {
                assert!(!env.obstacles()[0].intersects_swept_disc(
                    leg.from_waypoint().point(),
                    leg.to_waypoint().point(),
                    0.5
                ));
            }
        }
    }

    #[test]
    fn test_zero_budget_is_reported() {
        let env = crossing();
        let config = ConflictSearchConfig {
            max_expansions: 0,
            ..ConflictSearchConfig::default()
        };
        let err = ConflictSearch::new(&env, config).solve().unwrap_err();
        assert!(matches!(
            err,
            ConflictSearchError::ExpansionBudgetExhausted {
                expansions: 0,
                best_open_cost: Some(_)
            }
        ));
    }
}
