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

use crate::{id::AgentId, obstacle::Obstacle};
use sicbs_core::{geometry::Bounds, time::TimePoint};
use std::fmt::Display;

/// Which end of an agent's task is affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentEndpoint {
    Start,
    Goal,
}

impl Display for AgentEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentEndpoint::Start => write!(f, "start"),
            AgentEndpoint::Goal => write!(f, "goal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentViolation {
    NegativeRadius(f64),
    NonPositiveVelocity(f64),
    NonPositiveExpandDistance(f64),
    NegativeGoalThreshold(f64),
    GoalSampleRateOutOfRange(f64),
    ZeroIterations,
    NonFinitePoint(AgentEndpoint),
    OutsideBounds(AgentEndpoint),
    InsideObstacle(AgentEndpoint, usize),
}

impl Display for AgentViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentViolation::NegativeRadius(r) => write!(f, "radius {} is negative", r),
            AgentViolation::NonPositiveVelocity(v) => write!(f, "velocity {} is not positive", v),
            AgentViolation::NonPositiveExpandDistance(d) => {
                write!(f, "max expand distance {} is not positive", d)
            }
            AgentViolation::NegativeGoalThreshold(t) => {
                write!(f, "goal threshold {} is negative", t)
            }
            AgentViolation::GoalSampleRateOutOfRange(r) => {
                write!(f, "goal sample rate {}% is outside [0, 100]", r)
            }
            AgentViolation::ZeroIterations => write!(f, "iteration budget is zero"),
            AgentViolation::NonFinitePoint(e) => write!(f, "{} is not finite", e),
            AgentViolation::OutsideBounds(e) => write!(f, "{} lies outside the bounds", e),
            AgentViolation::InsideObstacle(e, idx) => {
                write!(f, "{} collides with obstacle #{}", e, idx)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidAgentError {
    id: AgentId,
    violation: AgentViolation,
}

impl InvalidAgentError {
    #[inline]
    pub fn new(id: AgentId, violation: AgentViolation) -> Self {
        Self { id, violation }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn violation(&self) -> AgentViolation {
        self.violation
    }
}

impl Display for InvalidAgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Agent {} is invalid: {}", self.id, self.violation)
    }
}

impl std::error::Error for InvalidAgentError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvironmentBuildError {
    InvalidBounds(Bounds),
    InvalidObstacle { index: usize, obstacle: Obstacle },
    InvalidAgent(InvalidAgentError),
}

impl Display for EnvironmentBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentBuildError::InvalidBounds(b) => {
                write!(f, "Bounds {} must be positive and finite", b)
            }
            EnvironmentBuildError::InvalidObstacle { index, obstacle } => {
                write!(f, "Obstacle #{} has invalid dimensions: {}", index, obstacle)
            }
            EnvironmentBuildError::InvalidAgent(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EnvironmentBuildError {}

impl From<InvalidAgentError> for EnvironmentBuildError {
    fn from(value: InvalidAgentError) -> Self {
        EnvironmentBuildError::InvalidAgent(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathError {
    Empty,
    NonFiniteWaypoint {
        index: usize,
    },
    StartNotAtZero(TimePoint),
    NonIncreasingTime {
        index: usize,
        previous: TimePoint,
        current: TimePoint,
    },
}

impl Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::Empty => write!(f, "Path has no waypoints"),
            PathError::NonFiniteWaypoint { index } => {
                write!(f, "Waypoint #{} is not finite", index)
            }
            PathError::StartNotAtZero(t) => write!(f, "Path starts at t = {} instead of 0", t),
            PathError::NonIncreasingTime {
                index,
                previous,
                current,
            } => write!(
                f,
                "Waypoint #{} at t = {} does not come after t = {}",
                index, current, previous
            ),
        }
    }
}

impl std::error::Error for PathError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SolutionParseErrorKind {
    MissingSeparator,
    BadAgentId(String),
    UnexpectedAgentId { expected: usize, found: usize },
    BadWaypoint(String),
    InvalidPath(PathError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolutionParseError {
    line: usize,
    kind: SolutionParseErrorKind,
}

impl SolutionParseError {
    #[inline]
    pub fn new(line: usize, kind: SolutionParseErrorKind) -> Self {
        Self { line, kind }
    }

    /// One-based line number.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub fn kind(&self) -> &SolutionParseErrorKind {
        &self.kind
    }
}

impl Display for SolutionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            SolutionParseErrorKind::MissingSeparator => write!(f, "expected `id: waypoints`"),
            SolutionParseErrorKind::BadAgentId(s) => write!(f, "invalid agent id `{}`", s),
            SolutionParseErrorKind::UnexpectedAgentId { expected, found } => {
                write!(f, "expected agent {} but found {}", expected, found)
            }
            SolutionParseErrorKind::BadWaypoint(s) => write!(f, "invalid waypoint `{}`", s),
            SolutionParseErrorKind::InvalidPath(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SolutionParseError {}
