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
    err::{SolutionParseError, SolutionParseErrorKind},
    id::AgentId,
    path::{Path, Waypoint},
};
use sicbs_core::{cost::Cost, geometry::Point, time::TimePoint};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolutionStats {
    sum_of_costs: Cost,
    makespan: Cost,
    total_distance: f64,
}

impl SolutionStats {
    fn from_paths(paths: &[Path]) -> Self {
        Self {
            sum_of_costs: paths.iter().map(Path::cost).sum(),
            makespan: paths
                .iter()
                .map(Path::cost)
                .max()
                .unwrap_or_default(),
            total_distance: paths.iter().map(Path::length).sum(),
        }
    }

    /// Sum of all arrival times.
    #[inline]
    pub fn sum_of_costs(&self) -> Cost {
        self.sum_of_costs
    }

    /// Latest arrival time.
    #[inline]
    pub fn makespan(&self) -> Cost {
        self.makespan
    }

    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }
}

impl Display for SolutionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution statistics:")?;
        writeln!(f, "  Sum of costs: {}", self.sum_of_costs)?;
        writeln!(f, "  Makespan: {}", self.makespan)?;
        writeln!(f, "  Total distance: {}", self.total_distance)?;
        Ok(())
    }
}

/// One path per agent, indexed by [`AgentId`].
///
/// The `Display` form is the plain-text solution file, one agent per line:
///
/// ```text
/// 0: (1,1,0)-(3,1,4)
/// 1: (5,5,0)-(5,5,2)-(5,9,10)
/// ```
///
/// and `FromStr` parses it back.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    paths: Vec<Path>,
    stats: SolutionStats,
}

impl Solution {
    pub fn new(paths: Vec<Path>) -> Self {
        let stats = SolutionStats::from_paths(&paths);
        Self { paths, stats }
    }

    #[inline]
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    #[inline]
    pub fn path(&self, id: AgentId) -> Option<&Path> {
        self.paths.get(id.value())
    }

    #[inline]
    pub fn stats(&self) -> &SolutionStats {
        &self.stats
    }

    #[inline]
    pub fn num_agents(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Path)> + '_ {
        self.paths
            .iter()
            .enumerate()
            .map(|(i, p)| (AgentId::new(i), p))
    }

    pub fn into_paths(self) -> Vec<Path> {
        self.paths
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (id, path) in self.iter() {
            writeln!(f, "{}: {}", id.value(), path)?;
        }
        Ok(())
    }
}

impl FromStr for Solution {
    type Err = SolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut paths = Vec::new();
        for (line_idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let err = |kind| SolutionParseError::new(line_idx + 1, kind);

            let (id_str, rest) = line
                .split_once(':')
                .ok_or_else(|| err(SolutionParseErrorKind::MissingSeparator))?;
            let id: usize = id_str
                .trim()
                .parse()
                .map_err(|_| err(SolutionParseErrorKind::BadAgentId(id_str.to_string())))?;
            if id != paths.len() {
                return Err(err(SolutionParseErrorKind::UnexpectedAgentId {
                    expected: paths.len(),
                    found: id,
                }));
            }

            let waypoints = parse_waypoints(rest.trim()).map_err(err)?;
            let path = Path::new(waypoints)
                .map_err(|e| err(SolutionParseErrorKind::InvalidPath(e)))?;
            paths.push(path);
        }
        Ok(Solution::new(paths))
    }
}

fn parse_waypoints(s: &str) -> Result<Vec<Waypoint>, SolutionParseErrorKind> {
    let bad = || SolutionParseErrorKind::BadWaypoint(s.to_string());
    let inner = s
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(bad)?;

    inner
        .split(")-(")
        .map(|token| {
            let mut fields = token.split(',').map(|v| v.trim().parse::<f64>());
            match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(Ok(x)), Some(Ok(y)), Some(Ok(t)), None) if !t.is_nan() => {
                    Ok(Waypoint::new(Point::new(x, y), TimePoint::new(t)))
                }
                _ => Err(SolutionParseErrorKind::BadWaypoint(token.to_string())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::PathError;

    fn path(points: &[(f64, f64, f64)]) -> Path {
        Path::new(
            points
                .iter()
                .map(|&(x, y, t)| Waypoint::new(Point::new(x, y), TimePoint::new(t)))
                .collect(),
        )
        .unwrap()
    }

    fn sample() -> Solution {
        Solution::new(vec![
            path(&[(1.0, 1.0, 0.0), (3.0, 1.0, 4.0)]),
            path(&[(5.0, 5.0, 0.0), (5.0, 5.0, 2.0), (5.0, 9.0, 10.0)]),
        ])
    }

    #[test]
    fn test_stats() {
        let s = sample();
        assert_eq!(s.stats().sum_of_costs(), Cost::new(14.0));
        assert_eq!(s.stats().makespan(), Cost::new(10.0));
        assert_eq!(s.stats().total_distance(), 6.0);
    }

    #[test]
    fn test_display_matches_file_format() {
        assert_eq!(
            sample().to_string(),
            "0: (1,1,0)-(3,1,4)\n1: (5,5,0)-(5,5,2)-(5,9,10)\n"
        );
    }

    #[test]
    fn test_text_format_round_trip() {
        let s = sample();
        let parsed: Solution = s.to_string().parse().unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn test_parse_fractional_values_and_blank_lines() {
        let parsed: Solution = "\n0: (0.25,1.5,0)-(0.75,1.5,1.125)\n\n".parse().unwrap();
        let p = parsed.path(AgentId::new(0)).unwrap();
        assert_eq!(p.goal(), Point::new(0.75, 1.5));
        assert_eq!(p.arrival_time(), TimePoint::new(1.125));
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let e = "0: (1,1,0)\n1 (1,1,0)".parse::<Solution>().unwrap_err();
        assert_eq!(e.line(), 2);
        assert_eq!(e.kind(), &SolutionParseErrorKind::MissingSeparator);

        let e = "1: (1,1,0)".parse::<Solution>().unwrap_err();
        assert_eq!(
            e.kind(),
            &SolutionParseErrorKind::UnexpectedAgentId {
                expected: 0,
                found: 1
            }
        );

        let e = "0: (1,1)".parse::<Solution>().unwrap_err();
        assert!(matches!(e.kind(), SolutionParseErrorKind::BadWaypoint(_)));

        let e = "0: (1,1,0)-(2,1,0)".parse::<Solution>().unwrap_err();
        assert!(matches!(
            e.kind(),
            SolutionParseErrorKind::InvalidPath(PathError::NonIncreasingTime { .. })
        ));
    }
}
