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

use crate::id::AgentId;
use sicbs_core::geometry::Point;
use std::fmt::Display;

/// A disc-shaped agent travelling at constant speed from `start` to `goal`,
/// together with the sampling parameters of its planner.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: AgentId,
    start: Point,
    goal: Point,
    radius: f64,
    max_expand_distance: f64,
    velocity: f64,
    goal_threshold: f64,
    iterations: usize,
    goal_sample_rate: f64,
}

impl Agent {
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn new(
        id: AgentId,
        start: Point,
        goal: Point,
        radius: f64,
        max_expand_distance: f64,
        velocity: f64,
        goal_threshold: f64,
        iterations: usize,
        goal_sample_rate: f64,
    ) -> Self {
        Self {
            id,
            start,
            goal,
            radius,
            max_expand_distance,
            velocity,
            goal_threshold,
            iterations,
            goal_sample_rate,
        }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> Point {
        self.goal
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn max_expand_distance(&self) -> f64 {
        self.max_expand_distance
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Samples closer than this to the goal snap onto it.
    #[inline]
    pub fn goal_threshold(&self) -> f64 {
        self.goal_threshold
    }

    /// Maximum number of tree expansions per planner run.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Probability, in percent, of sampling the goal instead of a random point.
    #[inline]
    pub fn goal_sample_rate(&self) -> f64 {
        self.goal_sample_rate
    }

    pub(crate) fn with_id(mut self, id: AgentId) -> Self {
        self.id = id;
        self
    }
}

impl Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Agent({}, start: {}, goal: {}, radius: {}, velocity: {})",
            self.id.value(),
            self.start,
            self.goal,
            self.radius,
            self.velocity
        )
    }
}

/// Parameters shared by agents created through [`AgentSpec::place`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSpec {
    pub radius: f64,
    pub max_expand_distance: f64,
    pub velocity: f64,
    pub goal_threshold: f64,
    pub iterations: usize,
    pub goal_sample_rate: f64,
}

impl Default for AgentSpec {
    fn default() -> Self {
        Self {
            radius: 0.5,
            max_expand_distance: 5.0,
            velocity: 0.5,
            goal_threshold: 0.01,
            iterations: 1000,
            goal_sample_rate: 10.0,
        }
    }
}

impl AgentSpec {
    /// Creates an agent with these parameters; the id is assigned when the
    /// agent is added to an environment.
    #[inline]
    pub fn place(&self, start: Point, goal: Point) -> Agent {
        Agent::new(
            AgentId::new(0),
            start,
            goal,
            self.radius,
            self.max_expand_distance,
            self.velocity,
            self.goal_threshold,
            self.iterations,
            self.goal_sample_rate,
        )
    }
}
