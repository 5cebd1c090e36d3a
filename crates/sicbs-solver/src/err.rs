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

use sicbs_core::{cost::Cost, geometry::Point};
use sicbs_model::{err::PathError, id::AgentId};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlannerError {
    /// No safe interval at the start contains `t = 0`.
    StartUnsafe { agent: AgentId, start: Point },
    /// The iteration budget ran out before the goal became reachable for good.
    Exhausted {
        agent: AgentId,
        iterations: usize,
        nodes: usize,
    },
    MalformedPath(PathError),
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerError::StartUnsafe { agent, start } => {
                write!(f, "{} has no safe interval at {} containing t = 0", agent, start)
            }
            PlannerError::Exhausted {
                agent,
                iterations,
                nodes,
            } => write!(
                f,
                "{} exhausted {} iterations ({} tree nodes) without reaching its goal",
                agent, iterations, nodes
            ),
            PlannerError::MalformedPath(e) => write!(f, "Extracted path is malformed: {}", e),
        }
    }
}

impl std::error::Error for PlannerError {}

impl From<PathError> for PlannerError {
    fn from(e: PathError) -> Self {
        PlannerError::MalformedPath(e)
    }
}

/// A constrained agent could not be re-planned; its branch is pruned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfeasibleConstraintError {
    agent: AgentId,
    attempts: usize,
    last: PlannerError,
}

impl InfeasibleConstraintError {
    #[inline]
    pub fn new(agent: AgentId, attempts: usize, last: PlannerError) -> Self {
        Self {
            agent,
            attempts,
            last,
        }
    }

    #[inline]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    #[inline]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    #[inline]
    pub fn last(&self) -> PlannerError {
        self.last
    }
}

impl Display for InfeasibleConstraintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cannot satisfy its constraints after {} attempts: {}",
            self.agent, self.attempts, self.last
        )
    }
}

impl std::error::Error for InfeasibleConstraintError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConflictSearchError {
    RootPlanningFailed(PlannerError),
    /// Every branch of the constraint tree was pruned.
    Infeasible { expansions: usize },
    ExpansionBudgetExhausted {
        expansions: usize,
        best_open_cost: Option<Cost>,
    },
}

impl Display for ConflictSearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictSearchError::RootPlanningFailed(e) => {
                write!(f, "Root planning failed: {}", e)
            }
            ConflictSearchError::Infeasible { expansions } => write!(
                f,
                "No conflict-free solution: open set exhausted after {} expansions",
                expansions
            ),
            ConflictSearchError::ExpansionBudgetExhausted {
                expansions,
                best_open_cost,
            } => match best_open_cost {
                Some(c) => write!(
                    f,
                    "Expansion budget of {} exhausted (best open node {})",
                    expansions, c
                ),
                None => write!(f, "Expansion budget of {} exhausted", expansions),
            },
        }
    }
}

impl std::error::Error for ConflictSearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConflictSearchError::RootPlanningFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PlannerError> for ConflictSearchError {
    fn from(e: PlannerError) -> Self {
        ConflictSearchError::RootPlanningFailed(e)
    }
}
