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

//! # Multi-Agent Planning Model (`sicbs-model`)
//!
//! Problem and solution types for continuous-time multi-agent path planning
//! in a 2-D workspace, built on the primitives of `sicbs-core`.
//!
//! ## Key Data Structures
//!
//! - **`AgentId`**: index of an agent in its environment.
//! - **`Agent`**: a disc with a start, a goal, a radius, a constant velocity
//!   and the sampling parameters of its planner (expand distance, goal
//!   threshold, iteration budget, goal-sample rate).
//! - **`Obstacle`**: circular or axis-aligned rectangular static obstacle.
//! - **`Environment`**: bounds, obstacles and agents, created through the
//!   validating `EnvironmentBuilder`.
//! - **`Path`**: waypoints `(point, time)` with linear motion in between,
//!   starting at `t = 0` with strictly increasing times.
//! - **`Solution`**: one `Path` per agent plus `SolutionStats`; its `Display`
//!   form is the plain-text solution file and `FromStr` reads it back.
//! - **`InstanceGenerator`**: seeded random instances.

pub mod agent;
pub mod env;
pub mod err;
pub mod generator;
pub mod id;
pub mod obstacle;
pub mod path;
pub mod sol;

pub mod prelude {
    pub use crate::agent::{Agent, AgentSpec};
    pub use crate::env::{Environment, EnvironmentBuilder};
    pub use crate::err::{
        AgentEndpoint, AgentViolation, EnvironmentBuildError, InvalidAgentError, PathError,
        SolutionParseError, SolutionParseErrorKind,
    };
    pub use crate::generator::{
        InstanceGenConfig, InstanceGenConfigBuildError, InstanceGenConfigBuilder, InstanceGenError,
        InstanceGenerator,
    };
    pub use crate::id::AgentId;
    pub use crate::obstacle::Obstacle;
    pub use crate::path::{Path, PathLeg, Waypoint};
    pub use crate::sol::{Solution, SolutionStats};
}
