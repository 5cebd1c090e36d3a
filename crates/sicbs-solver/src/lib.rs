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

//! # Continuous-Time Multi-Agent Solver (`sicbs-solver`)
//!
//! Plans collision-free, time-parameterized paths for disc-shaped agents.
//!
//! ## Layers
//!
//! - **`intervalset`**: sorted, coalesced half-open interval sets.
//! - **`motion`**: closed-form and convex-search queries on constant-velocity
//!   motions (when does a resting or moving disc overlap another one).
//! - **`table`**: `SafeIntervalTable`, the collision oracle over static
//!   obstacles, committed paths and per-agent constraints.
//! - **`sirrt`**: `SiRrtPlanner`, a sampling planner whose tree nodes are
//!   (point, safe interval) pairs.
//! - **`conflict`**: pairwise conflict detection and the moving-disc
//!   constraints that resolve a conflict.
//! - **`search`**: `ConflictSearch`, best-first search over a constraint tree.
//!
//! ## Example
//!
//! ```no_run
//! use sicbs_core::geometry::{Bounds, Point};
//! use sicbs_model::{agent::AgentSpec, env::EnvironmentBuilder};
//! use sicbs_solver::{config::ConflictSearchConfig, search::ConflictSearch};
//!
//! let spec = AgentSpec::default();
//! let mut builder = EnvironmentBuilder::new(Bounds::new(10.0, 10.0));
//! builder.add_agent(spec.place(Point::new(1.0, 5.0), Point::new(9.0, 5.0))).unwrap();
//! builder.add_agent(spec.place(Point::new(5.0, 1.0), Point::new(5.0, 9.0))).unwrap();
//! let env = builder.build().unwrap();
//!
//! let outcome = ConflictSearch::new(&env, ConflictSearchConfig::default()).solve().unwrap();
//! print!("{}", outcome.solution());
//! ```

pub mod config;
pub mod conflict;
pub mod constraint;
pub mod err;
pub mod intervalset;
pub mod motion;
pub mod search;
pub mod sirrt;
pub mod table;

pub mod prelude {
    pub use crate::config::{
        ConflictSearchConfig, CoordinationMode, GoalHoldPolicy, Objective, PlannerConfig,
    };
    pub use crate::conflict::{Conflict, earliest_conflict};
    pub use crate::constraint::Constraint;
    pub use crate::err::{ConflictSearchError, InfeasibleConstraintError, PlannerError};
    pub use crate::intervalset::IntervalSet;
    pub use crate::search::{ConflictSearch, SearchOutcome, SearchStats};
    pub use crate::sirrt::SiRrtPlanner;
    pub use crate::table::{SafeIntervalTable, SafeIntervals};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(SafeIntervalTable<'static>: Send, Sync, Clone);
    assert_impl_all!(SiRrtPlanner: Send, Sync, Clone);
    assert_impl_all!(ConflictSearch<'static>: Send, Sync);
    assert_impl_all!(SearchOutcome: Send, Sync);
    assert_impl_all!(PlannerError: std::error::Error, Send, Sync, Copy);
    assert_impl_all!(InfeasibleConstraintError: std::error::Error, Send, Sync);
    assert_impl_all!(ConflictSearchError: std::error::Error, Send, Sync);
}
