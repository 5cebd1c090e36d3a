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

use num_traits::Zero;
use sicbs_core::cost::Cost;
use sicbs_model::path::Path;
use std::fmt::Display;

/// What a committed agent does after reaching its last waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GoalHoldPolicy {
    /// Stays at its goal until `+∞`.
    #[default]
    HoldForever,
    /// Disappears once it arrives.
    Vanish,
}

/// How the conflict search lets agents see each other while re-planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordinationMode {
    /// Agents plan in index order at the root, and every re-plan treats all
    /// other committed paths as moving obstacles. An agent that cannot get
    /// past the earlier ones is planned alone and left to branching.
    #[default]
    Prioritized,
    /// Agents only see static obstacles and their own constraints; all
    /// coordination happens through branching.
    ConstraintsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Objective {
    /// Sum of all arrival times.
    #[default]
    SumOfCosts,
    /// Latest arrival time.
    Makespan,
}

impl Objective {
    pub fn evaluate(&self, paths: &[Path]) -> Cost {
        match self {
            Objective::SumOfCosts => paths.iter().map(Path::cost).sum(),
            Objective::Makespan => paths.iter().map(Path::cost).fold(Cost::zero(), Cost::max),
        }
    }
}

impl Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::SumOfCosts => write!(f, "sum-of-costs"),
            Objective::Makespan => write!(f, "makespan"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Re-parent nearby nodes through a new node when that makes them
    /// reachable earlier.
    pub rewire: bool,
    /// Radius, as a multiple of the agent's max expand distance, in which
    /// parents and rewiring candidates are searched.
    pub near_radius_factor: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            rewire: true,
            near_radius_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConflictSearchConfig {
    pub objective: Objective,
    pub goal_hold: GoalHoldPolicy,
    pub coordination: CoordinationMode,
    /// Constraint-tree nodes popped before giving up.
    pub max_expansions: usize,
    /// Planner runs per branch before the branch is pruned.
    pub replan_attempts: usize,
    pub seed: u64,
    /// Build the children of a node on the rayon pool.
    pub parallel: bool,
    pub planner: PlannerConfig,
}

impl Default for ConflictSearchConfig {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            goal_hold: GoalHoldPolicy::default(),
            coordination: CoordinationMode::default(),
            max_expansions: 500,
            replan_attempts: 3,
            seed: 0x00C0_FFEE_D00D,
            parallel: true,
            planner: PlannerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sicbs_core::{geometry::Point, time::TimePoint};
    use sicbs_model::path::Waypoint;

    fn arriving_at(t: f64) -> Path {
        Path::new(vec![
            Waypoint::new(Point::new(0.0, 0.0), TimePoint::ZERO),
            Waypoint::new(Point::new(1.0, 0.0), TimePoint::new(t)),
        ])
        .unwrap()
    }

    #[test]
    fn test_objectives() {
        let paths = vec![arriving_at(2.0), arriving_at(5.0), Path::stationary(Point::origin())];
        assert_eq!(Objective::SumOfCosts.evaluate(&paths), Cost::new(7.0));
        assert_eq!(Objective::Makespan.evaluate(&paths), Cost::new(5.0));
        assert_eq!(Objective::Makespan.evaluate(&[]), Cost::zero());
    }
}
