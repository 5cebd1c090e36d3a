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

use super::err::InstanceGenConfigBuildError;
use crate::{agent::AgentSpec, obstacle::Obstacle};
use rand::Rng;
use sicbs_core::geometry::{Bounds, Point};
use std::fmt::Display;

/// Configuration for random instance generation.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceGenConfig {
    pub(crate) bounds: Bounds,
    pub(crate) amount_agents: usize,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) agent_spec: AgentSpec,
    pub(crate) placement_attempts: usize,
    pub(crate) seed: u64,
}

impl Default for InstanceGenConfig {
    /// Ten agents on a 10x10 map around a circular obstacle at (5, 5).
    fn default() -> Self {
        Self {
            bounds: Bounds::new(10.0, 10.0),
            amount_agents: 10,
            obstacles: vec![Obstacle::circular(Point::new(5.0, 5.0), 2.0)],
            agent_spec: AgentSpec::default(),
            placement_attempts: 10_000,
            seed: 42,
        }
    }
}

impl InstanceGenConfig {
    pub fn new(
        bounds: Bounds,
        amount_agents: usize,
        obstacles: Vec<Obstacle>,
        agent_spec: AgentSpec,
        placement_attempts: usize,
        seed: u64,
    ) -> Result<Self, InstanceGenConfigBuildError> {
        if !bounds.is_valid() {
            return Err(InstanceGenConfigBuildError::InvalidBounds(bounds));
        }
        let r = agent_spec.radius;
        if !(r >= 0.0) || 2.0 * r > bounds.width() || 2.0 * r > bounds.height() {
            return Err(InstanceGenConfigBuildError::AgentTooLarge { radius: r, bounds });
        }
        if placement_attempts == 0 {
            return Err(InstanceGenConfigBuildError::ZeroPlacementAttempts);
        }
        Ok(Self {
            bounds,
            amount_agents,
            obstacles,
            agent_spec,
            placement_attempts,
            seed,
        })
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn amount_agents(&self) -> usize {
        self.amount_agents
    }

    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn agent_spec(&self) -> &AgentSpec {
        &self.agent_spec
    }

    #[inline]
    pub fn placement_attempts(&self) -> usize {
        self.placement_attempts
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Display for InstanceGenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "InstanceGenConfig:")?;
        writeln!(f, "  bounds: {}", self.bounds)?;
        writeln!(f, "  amount_agents: {}", self.amount_agents)?;
        writeln!(f, "  obstacles: {}", self.obstacles.len())?;
        writeln!(f, "  agent radius: {}", self.agent_spec.radius)?;
        writeln!(f, "  agent velocity: {}", self.agent_spec.velocity)?;
        writeln!(f, "  placement_attempts: {}", self.placement_attempts)?;
        write!(f, "  seed: {}", self.seed)
    }
}

/// Builder for `InstanceGenConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceGenConfigBuilder {
    bounds: Bounds,
    amount_agents: usize,
    obstacles: Vec<Obstacle>,
    agent_spec: AgentSpec,
    placement_attempts: usize,
    seed: u64,
}

impl Default for InstanceGenConfigBuilder {
    fn default() -> Self {
        let d = InstanceGenConfig::default();
        Self {
            bounds: d.bounds,
            amount_agents: d.amount_agents,
            obstacles: Vec::new(),
            agent_spec: d.agent_spec,
            placement_attempts: d.placement_attempts,
            seed: d.seed,
        }
    }
}

impl InstanceGenConfigBuilder {
    /// Starts from the defaults but without obstacles.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bounds(mut self, v: Bounds) -> Self {
        self.bounds = v;
        self
    }

    #[inline]
    pub fn amount_agents(mut self, v: usize) -> Self {
        self.amount_agents = v;
        self
    }

    #[inline]
    pub fn obstacle(mut self, v: Obstacle) -> Self {
        self.obstacles.push(v);
        self
    }

    #[inline]
    pub fn obstacles(mut self, v: Vec<Obstacle>) -> Self {
        self.obstacles = v;
        self
    }

    #[inline]
    pub fn agent_spec(mut self, v: AgentSpec) -> Self {
        self.agent_spec = v;
        self
    }

    #[inline]
    pub fn placement_attempts(mut self, v: usize) -> Self {
        self.placement_attempts = v;
        self
    }

    pub fn random_seed(mut self) -> Self {
        self.seed = rand::rng().random();
        self
    }

    #[inline]
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    pub fn build(self) -> Result<InstanceGenConfig, InstanceGenConfigBuildError> {
        InstanceGenConfig::new(
            self.bounds,
            self.amount_agents,
            self.obstacles,
            self.agent_spec,
            self.placement_attempts,
            self.seed,
        )
    }
}
