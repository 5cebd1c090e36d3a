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

use sicbs_core::{
    geometry::Point,
    time::{TimeInterval, TimePoint},
};
use sicbs_model::path::Waypoint;
use std::{fmt::Display, ops::Index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub const fn new(value: usize) -> Self {
        NodeId(value)
    }

    #[inline]
    pub const fn value(&self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A reachable (point, safe interval) pair.
///
/// `arrival` is the earliest known arrival inside `interval`; `departed` is
/// the time the agent leaves its parent to get here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeNode {
    pub point: Point,
    pub interval: TimeInterval,
    pub parent: Option<NodeId>,
    pub arrival: TimePoint,
    pub departed: TimePoint,
}

impl TreeNode {
    /// `true` once no departure is left inside the node's safe interval.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.arrival >= self.interval.end()
    }
}

/// Arena of tree nodes; node `0` is the root.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    pub fn with_root(point: Point, interval: TimeInterval) -> Self {
        Self {
            nodes: vec![TreeNode {
                point,
                interval,
                parent: None,
                arrival: TimePoint::ZERO,
                departed: TimePoint::ZERO,
            }],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn push(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Closest node to `p` that can still be left; ties go to the lowest id.
    /// Falls back to the root if every node is exhausted.
    pub fn nearest(&self, p: Point) -> NodeId {
        let mut best: Option<(usize, f64)> = None;
        for (i, n) in self.nodes.iter().enumerate() {
            if n.is_exhausted() {
                continue;
            }
            let d = n.point.distance_squared(p);
            if best.is_none_or(|(_, b)| d < b) {
                best = Some((i, d));
            }
        }
        NodeId(best.map_or(0, |(i, _)| i))
    }

    /// All nodes whose point lies within `radius` of `p`, in id order.
    pub fn within(&self, p: Point, radius: f64) -> Vec<NodeId> {
        let r2 = radius * radius;
        self.iter()
            .filter(|(_, n)| n.point.distance_squared(p) <= r2)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn find(&self, point: Point, interval: TimeInterval) -> Option<NodeId> {
        self.iter()
            .find(|(_, n)| n.point == point && n.interval == interval)
            .map(|(id, _)| id)
    }

    /// Waypoints from the root to `id`, with an extra waypoint wherever the
    /// agent waits before leaving a node.
    pub fn waypoints_to(&self, id: NodeId) -> Vec<Waypoint> {
        let mut chain = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.nodes[cursor.0].parent {
            chain.push(parent);
            cursor = parent;
        }
        chain.reverse();

        let root = &self.nodes[chain[0].0];
        let mut out = vec![Waypoint::new(root.point, root.arrival)];
        for pair in chain.windows(2) {
            let (parent, child) = (&self.nodes[pair[0].0], &self.nodes[pair[1].0]);
            let last = out.last().map(Waypoint::time).unwrap_or(TimePoint::ZERO);
            if child.departed > last {
                out.push(Waypoint::new(parent.point, child.departed));
            }
            out.push(Waypoint::new(child.point, child.arrival));
        }
        out
    }
}

impl Index<NodeId> for Tree {
    type Output = TreeNode;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}
