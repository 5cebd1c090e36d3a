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

//! # Conflict Detection
//!
//! Pairwise, continuous-time collision checks between committed paths, and
//! the constraints that resolve a detected conflict.

use crate::{
    config::GoalHoldPolicy,
    constraint::Constraint,
    intervalset::IntervalSet,
    motion::{Motion, disc_overlap_range, occupancy},
};
use sicbs_core::{
    primitives::Interval,
    time::{TimeDelta, TimeInterval, TimePoint},
};
use sicbs_model::{env::Environment, id::AgentId, path::Path};
use std::fmt::Display;

/// Overlaps shallower than this are not reported.
pub const COLLISION_TOLERANCE: f64 = 1e-6;

/// Two agents' discs overlap during `window`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conflict {
    a: AgentId,
    b: AgentId,
    window: TimeInterval,
}

impl Conflict {
    #[inline]
    pub fn new(a: AgentId, b: AgentId, window: TimeInterval) -> Self {
        Self { a, b, window }
    }

    #[inline]
    pub fn a(&self) -> AgentId {
        self.a
    }

    #[inline]
    pub fn b(&self) -> AgentId {
        self.b
    }

    #[inline]
    pub fn window(&self) -> TimeInterval {
        self.window
    }

    #[inline]
    pub fn start(&self) -> TimePoint {
        self.window.start()
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Conflict({} <-> {} during {})",
            self.a.value(),
            self.b.value(),
            self.window
        )
    }
}

/// Every time window in which two motion sequences come closer than
/// `clearance`.
fn overlap_windows(ma: &[Motion], mb: &[Motion], clearance: f64) -> IntervalSet<TimePoint> {
    let mut windows = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < ma.len() && j < mb.len() {
        let (a, b) = (&ma[i], &mb[j]);
        if let Some(shared) = a.window().intersection(&b.window()) {
            let t0 = shared.start();
            let span = (shared.end() - t0).value();
            let d = a.position_at(t0) - b.position_at(t0);
            let w = a.velocity() - b.velocity();
            if let Some((s0, s1)) = disc_overlap_range(d, w, clearance) {
                let (lo, hi) = (s0.max(0.0), s1.min(span));
                if lo < hi {
                    let end = if hi.is_infinite() {
                        TimePoint::INFINITY
                    } else {
                        t0 + TimeDelta::new(hi)
                    };
                    windows.push(Interval::new(t0 + TimeDelta::new(lo), end));
                }
            }
        }
        if a.end() <= b.end() {
            i += 1;
        } else {
            j += 1;
        }
    }
    IntervalSet::from_vec(windows)
}

/// Earliest overlap between two paths, if any.
pub fn conflict_between(
    env: &Environment,
    hold: GoalHoldPolicy,
    (a, path_a): (AgentId, &Path),
    (b, path_b): (AgentId, &Path),
) -> Option<Conflict> {
    let clearance = clearance(env, a, b);
    overlap_windows(
        &occupancy(path_a, hold),
        &occupancy(path_b, hold),
        clearance,
    )
    .first()
    .map(|w| Conflict::new(a, b, *w))
}

fn clearance(env: &Environment, a: AgentId, b: AgentId) -> f64 {
    let radius = |id| env.agent(id).map(|x| x.radius()).unwrap_or_default();
    radius(a) + radius(b) - COLLISION_TOLERANCE
}

/// Earliest conflict over all pairs of `paths`, where `paths[i]` belongs to
/// agent `i`. Ties go to the lexicographically smallest pair.
pub fn earliest_conflict(
    env: &Environment,
    paths: &[Path],
    hold: GoalHoldPolicy,
) -> Option<Conflict> {
    let motions: Vec<Vec<Motion>> = paths.iter().map(|p| occupancy(p, hold)).collect();
    let mut best: Option<Conflict> = None;
    for i in 0..motions.len() {
        for j in (i + 1)..motions.len() {
            let (a, b) = (AgentId::new(i), AgentId::new(j));
            let found = overlap_windows(&motions[i], &motions[j], clearance(env, a, b))
                .first()
                .map(|w| Conflict::new(a, b, *w));
            if let Some(c) = found {
                if best.is_none_or(|x| c.start() < x.start()) {
                    best = Some(c);
                }
            }
        }
    }
    best
}

/// Number of conflicting agent pairs.
pub fn count_conflicts(env: &Environment, paths: &[Path], hold: GoalHoldPolicy) -> usize {
    let motions: Vec<Vec<Motion>> = paths.iter().map(|p| occupancy(p, hold)).collect();
    let mut count = 0;
    for i in 0..motions.len() {
        for j in (i + 1)..motions.len() {
            let c = clearance(env, AgentId::new(i), AgentId::new(j));
            if !overlap_windows(&motions[i], &motions[j], c).is_empty() {
                count += 1;
            }
        }
    }
    count
}

/// Constraints keeping `agent` at least `clearance` away from `other` while
/// `other` follows its path during `window`.
///
/// Each motion of `other` overlapping the window becomes one constraint
/// that moves with it, so nothing outside the other disc's actual position
/// is forbidden.
pub fn avoidance_constraints(
    agent: AgentId,
    other: &Path,
    hold: GoalHoldPolicy,
    window: TimeInterval,
    clearance: f64,
) -> Vec<Constraint> {
    occupancy(other, hold)
        .iter()
        .filter_map(|m| m.clipped(window))
        .map(|zone| Constraint::following(agent, zone, clearance))
        .collect()
}
