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

use crate::{
    agent::Agent,
    err::{AgentEndpoint, AgentViolation, EnvironmentBuildError, InvalidAgentError},
    id::AgentId,
    obstacle::Obstacle,
};
use sicbs_core::geometry::{Bounds, Point, Segment};
use std::fmt::Display;

/// The shared workspace: bounds, static obstacles and the agents to route.
///
/// Only constructible through [`EnvironmentBuilder`], so every instance
/// satisfies the planner's preconditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    bounds: Bounds,
    obstacles: Vec<Obstacle>,
    agents: Vec<Agent>,
}

impl Environment {
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.value())
    }

    #[inline]
    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(Agent::id)
    }

    /// `true` if no obstacle overlaps a disc of `radius` at `p`.
    #[inline]
    pub fn is_obstacle_free(&self, p: Point, radius: f64) -> bool {
        !self.obstacles.iter().any(|o| o.intersects_disc(p, radius))
    }

    /// `true` if no obstacle overlaps a disc of `radius` swept along `segment`.
    #[inline]
    pub fn is_segment_obstacle_free(&self, segment: &Segment, radius: f64) -> bool {
        !self
            .obstacles
            .iter()
            .any(|o| o.intersects_swept_disc(segment.start(), segment.end(), radius))
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Environment {}:", self.bounds)?;
        for o in &self.obstacles {
            writeln!(f, "  {}", o)?;
        }
        for a in &self.agents {
            writeln!(f, "  {}", a)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentBuilder {
    bounds: Bounds,
    obstacles: Vec<Obstacle>,
    agents: Vec<Agent>,
}

impl EnvironmentBuilder {
    #[inline]
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            obstacles: Vec::new(),
            agents: Vec::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> &mut Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Validates the agent against the bounds and the obstacles added so far
    /// and appends it. The agent's id is set to its index.
    pub fn add_agent(&mut self, agent: Agent) -> Result<AgentId, InvalidAgentError> {
        let id = AgentId::new(self.agents.len());
        let agent = agent.with_id(id);
        validate_agent(&agent, self.bounds, &self.obstacles)?;
        self.agents.push(agent);
        Ok(id)
    }

    /// Re-validates everything, since obstacles may have been added after
    /// the agents.
    pub fn build(&self) -> Result<Environment, EnvironmentBuildError> {
        if !self.bounds.is_valid() {
            return Err(EnvironmentBuildError::InvalidBounds(self.bounds));
        }
        if let Some((index, obstacle)) = self
            .obstacles
            .iter()
            .enumerate()
            .find(|(_, o)| !o.is_valid())
        {
            return Err(EnvironmentBuildError::InvalidObstacle {
                index,
                obstacle: *obstacle,
            });
        }
        for agent in &self.agents {
            validate_agent(agent, self.bounds, &self.obstacles)?;
        }
        Ok(Environment {
            bounds: self.bounds,
            obstacles: self.obstacles.clone(),
            agents: self.agents.clone(),
        })
    }
}

fn validate_agent(
    agent: &Agent,
    bounds: Bounds,
    obstacles: &[Obstacle],
) -> Result<(), InvalidAgentError> {
    let fail = |v| Err(InvalidAgentError::new(agent.id(), v));

    if !(agent.radius() >= 0.0) {
        return fail(AgentViolation::NegativeRadius(agent.radius()));
    }
    if !(agent.velocity() > 0.0 && agent.velocity().is_finite()) {
        return fail(AgentViolation::NonPositiveVelocity(agent.velocity()));
    }
    if !(agent.max_expand_distance() > 0.0) {
        return fail(AgentViolation::NonPositiveExpandDistance(
            agent.max_expand_distance(),
        ));
    }
    if !(agent.goal_threshold() >= 0.0) {
        return fail(AgentViolation::NegativeGoalThreshold(agent.goal_threshold()));
    }
    if !(0.0..=100.0).contains(&agent.goal_sample_rate()) {
        return fail(AgentViolation::GoalSampleRateOutOfRange(
            agent.goal_sample_rate(),
        ));
    }
    if agent.iterations() == 0 {
        return fail(AgentViolation::ZeroIterations);
    }

    for (endpoint, p) in [
        (AgentEndpoint::Start, agent.start()),
        (AgentEndpoint::Goal, agent.goal()),
    ] {
        if !p.is_finite() {
            return fail(AgentViolation::NonFinitePoint(endpoint));
        }
        if !bounds.contains(p) {
            return fail(AgentViolation::OutsideBounds(endpoint));
        }
        if let Some(idx) = obstacles
            .iter()
            .position(|o| o.intersects_disc(p, agent.radius()))
        {
            return fail(AgentViolation::InsideObstacle(endpoint, idx));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentSpec;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_build_assigns_sequential_ids() {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        let spec = AgentSpec::default();
        let a = b.add_agent(spec.place(p(1.0, 1.0), p(9.0, 9.0))).unwrap();
        let c = b.add_agent(spec.place(p(1.0, 9.0), p(9.0, 1.0))).unwrap();
        assert_eq!((a.value(), c.value()), (0, 1));
        let env = b.build().unwrap();
        assert_eq!(env.num_agents(), 2);
        assert_eq!(env.agent(c).unwrap().start(), p(1.0, 9.0));
    }

    #[test]
    fn test_add_agent_rejects_bad_parameters() {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        let spec = AgentSpec {
            velocity: 0.0,
            ..AgentSpec::default()
        };
        let err = b.add_agent(spec.place(p(1.0, 1.0), p(2.0, 2.0))).unwrap_err();
        assert_eq!(err.violation(), AgentViolation::NonPositiveVelocity(0.0));

        let spec = AgentSpec {
            goal_sample_rate: 120.0,
            ..AgentSpec::default()
        };
        let err = b.add_agent(spec.place(p(1.0, 1.0), p(2.0, 2.0))).unwrap_err();
        assert!(matches!(
            err.violation(),
            AgentViolation::GoalSampleRateOutOfRange(_)
        ));

        let spec = AgentSpec {
            iterations: 0,
            ..AgentSpec::default()
        };
        let err = b.add_agent(spec.place(p(1.0, 1.0), p(2.0, 2.0))).unwrap_err();
        assert_eq!(err.violation(), AgentViolation::ZeroIterations);
    }

    #[test]
    fn test_add_agent_rejects_goal_outside_bounds() {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        let err = b
            .add_agent(AgentSpec::default().place(p(1.0, 1.0), p(11.0, 2.0)))
            .unwrap_err();
        assert_eq!(
            err.violation(),
            AgentViolation::OutsideBounds(AgentEndpoint::Goal)
        );
    }

    #[test]
    fn test_build_rejects_start_inside_later_obstacle() {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        b.add_agent(AgentSpec::default().place(p(5.0, 5.0), p(9.0, 9.0)))
            .unwrap();
        b.add_obstacle(Obstacle::circular(p(5.0, 5.0), 2.0));
        let err = b.build().unwrap_err();
        assert!(matches!(
            err,
            EnvironmentBuildError::InvalidAgent(e)
                if e.violation() == AgentViolation::InsideObstacle(AgentEndpoint::Start, 0)
        ));
    }

    #[test]
    fn test_build_rejects_invalid_obstacle_and_bounds() {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        b.add_obstacle(Obstacle::rectangular(p(5.0, 5.0), 0.0, 1.0));
        assert!(matches!(
            b.build(),
            Err(EnvironmentBuildError::InvalidObstacle { index: 0, .. })
        ));
        let b = EnvironmentBuilder::new(Bounds::new(-1.0, 10.0));
        assert!(matches!(
            b.build(),
            Err(EnvironmentBuildError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_obstacle_free_queries() {
        let mut b = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
        b.add_obstacle(Obstacle::circular(p(5.0, 5.0), 2.0));
        let env = b.build().unwrap();
        assert!(!env.is_obstacle_free(p(5.0, 5.0), 0.5));
        assert!(env.is_obstacle_free(p(1.0, 1.0), 0.5));
        assert!(!env.is_segment_obstacle_free(&Segment::new(p(0.0, 5.0), p(10.0, 5.0)), 0.5));
    }
}
