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
    err::{AgentEndpoint, EnvironmentBuildError},
    id::AgentId,
};
use sicbs_core::geometry::Bounds;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstanceGenConfigBuildError {
    InvalidBounds(Bounds),
    /// The agent disc does not fit inside the bounds.
    AgentTooLarge { radius: f64, bounds: Bounds },
    ZeroPlacementAttempts,
}

impl Display for InstanceGenConfigBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use InstanceGenConfigBuildError::*;
        match self {
            InvalidBounds(b) => write!(f, "Bounds {} must be positive and finite", b),
            AgentTooLarge { radius, bounds } => {
                write!(f, "Agent radius {} does not fit into {}", radius, bounds)
            }
            ZeroPlacementAttempts => write!(f, "placement_attempts must be at least 1"),
        }
    }
}

impl std::error::Error for InstanceGenConfigBuildError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstanceGenError {
    PlacementFailed {
        agent: AgentId,
        endpoint: AgentEndpoint,
        attempts: usize,
    },
    Environment(EnvironmentBuildError),
}

impl Display for InstanceGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceGenError::PlacementFailed {
                agent,
                endpoint,
                attempts,
            } => write!(
                f,
                "Could not place the {} of {} after {} attempts",
                endpoint, agent, attempts
            ),
            InstanceGenError::Environment(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InstanceGenError {}

impl From<EnvironmentBuildError> for InstanceGenError {
    fn from(value: EnvironmentBuildError) -> Self {
        InstanceGenError::Environment(value)
    }
}
