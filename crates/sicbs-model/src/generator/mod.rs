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

//! Seeded random instance generation.
//!
//! Starts and goals are drawn uniformly from the bounds (shrunk by the agent
//! radius). A draw is rejected if the agent disc overlaps an obstacle or
//! another agent's start (for starts) or goal (for goals).

mod config;
mod err;

pub use config::{InstanceGenConfig, InstanceGenConfigBuilder};
pub use err::{InstanceGenConfigBuildError, InstanceGenError};

use crate::{
    env::{Environment, EnvironmentBuilder},
    err::AgentEndpoint,
    id::AgentId,
};
use rand::{SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution, Uniform};
use sicbs_core::geometry::Point;

pub struct InstanceGenerator {
    config: InstanceGenConfig,
    rng: SmallRng,
    x_distribution: Uniform<f64>,
    y_distribution: Uniform<f64>,
}

impl From<InstanceGenConfig> for InstanceGenerator {
    fn from(config: InstanceGenConfig) -> Self {
        Self::new(config)
    }
}

impl InstanceGenerator {
    pub fn new(config: InstanceGenConfig) -> Self {
        let r = config.agent_spec.radius;
        let b = config.bounds;
        Self {
            // The config constructor guarantees 2r <= width, height.
            x_distribution: Uniform::new_inclusive(r, b.width() - r)
                .expect("valid [r, width - r]"),
            y_distribution: Uniform::new_inclusive(r, b.height() - r)
                .expect("valid [r, height - r]"),
            rng: SmallRng::seed_from_u64(config.seed),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &InstanceGenConfig {
        &self.config
    }

    pub fn generate(&mut self) -> Result<Environment, InstanceGenError> {
        let mut builder = EnvironmentBuilder::new(self.config.bounds);
        for o in &self.config.obstacles {
            builder.add_obstacle(*o);
        }

        let n = self.config.amount_agents;
        let mut starts: Vec<Point> = Vec::with_capacity(n);
        let mut goals: Vec<Point> = Vec::with_capacity(n);
        for i in 0..n {
            let agent = AgentId::new(i);
            let start = self.place(&builder, &starts, agent, AgentEndpoint::Start)?;
            let goal = self.place(&builder, &goals, agent, AgentEndpoint::Goal)?;
            starts.push(start);
            goals.push(goal);
            builder
                .add_agent(self.config.agent_spec.place(start, goal))
                .map_err(crate::err::EnvironmentBuildError::from)?;
        }
        Ok(builder.build()?)
    }

    fn place(
        &mut self,
        builder: &EnvironmentBuilder,
        taken: &[Point],
        agent: AgentId,
        endpoint: AgentEndpoint,
    ) -> Result<Point, InstanceGenError> {
        let r = self.config.agent_spec.radius;
        let min_gap = 2.0 * r;
        for _ in 0..self.config.placement_attempts {
            let p = Point::new(
                self.x_distribution.sample(&mut self.rng),
                self.y_distribution.sample(&mut self.rng),
            );
            let clear_of_obstacles = !builder
                .obstacles()
                .iter()
                .any(|o| o.intersects_disc(p, r));
            let clear_of_agents = taken.iter().all(|q| q.distance(p) >= min_gap);
            if clear_of_obstacles && clear_of_agents {
                return Ok(p);
            }
        }
        Err(InstanceGenError::PlacementFailed {
            agent,
            endpoint,
            attempts: self.config.placement_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::Obstacle;
    use sicbs_core::geometry::Bounds;

    #[test]
    fn test_default_instance_is_valid() {
        let mut generator = InstanceGenerator::new(InstanceGenConfig::default());
        let env = generator.generate().expect("default instance");
        assert_eq!(env.num_agents(), 10);
        assert_eq!(env.obstacles().len(), 1);
        for a in env.agents() {
            assert!(env.bounds().contains_disc(a.start(), a.radius()));
            assert!(env.is_obstacle_free(a.start(), a.radius()));
            assert!(env.is_obstacle_free(a.goal(), a.radius()));
        }
    }

    #[test]
    fn test_starts_and_goals_do_not_overlap() {
        let cfg = InstanceGenConfigBuilder::new().amount_agents(8).seed(7).build().unwrap();
        let env = InstanceGenerator::from(cfg).generate().unwrap();
        let agents = env.agents();
        for (i, a) in agents.iter().enumerate() {
            for b in &agents[i + 1..] {
                assert!(a.start().distance(b.start()) >= a.radius() + b.radius());
                assert!(a.goal().distance(b.goal()) >= a.radius() + b.radius());
            }
        }
    }

    #[test]
    fn test_same_seed_same_instance() {
        let cfg = InstanceGenConfig::default();
        let a = InstanceGenerator::new(cfg.clone()).generate().unwrap();
        let b = InstanceGenerator::new(cfg).generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_crowded_map_reports_placement_failure() {
        let cfg = InstanceGenConfigBuilder::new()
            .bounds(Bounds::new(2.0, 2.0))
            .obstacle(Obstacle::circular(Point::new(1.0, 1.0), 0.2))
            .amount_agents(3)
            .placement_attempts(50)
            .build()
            .unwrap();
        let err = InstanceGenerator::new(cfg).generate().unwrap_err();
        assert!(matches!(err, InstanceGenError::PlacementFailed { .. }));
    }

    #[test]
    fn test_config_rejects_oversized_agents() {
        let spec = crate::agent::AgentSpec {
            radius: 6.0,
            ..Default::default()
        };
        let err = InstanceGenConfigBuilder::new().agent_spec(spec).build().unwrap_err();
        assert!(matches!(
            err,
            InstanceGenConfigBuildError::AgentTooLarge { .. }
        ));
    }
}
