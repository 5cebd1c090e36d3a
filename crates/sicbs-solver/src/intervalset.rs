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

//! Sorted, merged sets of half-open intervals.
//!
//! An [`IntervalSet`] never stores an empty interval, and two stored
//! intervals never touch: `[1, 3)` and `[3, 5)` are kept as `[1, 5)`. Point
//! lookups binary search on interval ends; the set algebra walks both
//! operands once.

use core::ops::Deref;
use sicbs_core::primitives::Interval;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntervalSet<T> {
    spans: Vec<Interval<T>>,
}

impl<T> IntervalSet<T> {
    #[inline]
    pub fn new() -> Self {
        Self { spans: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Interval<T>] {
        &self.spans
    }
}

impl<T: Ord + Copy> IntervalSet<T> {
    /// The set holding `span`, or nothing if `span` is empty.
    pub fn single(span: Interval<T>) -> Self {
        let mut set = Self::new();
        set.push_merging(span);
        set
    }

    /// Sorts `spans` by start and merges everything that overlaps or touches.
    pub fn from_vec(mut spans: Vec<Interval<T>>) -> Self {
        spans.sort_unstable_by_key(|s| s.start());
        let mut set = Self {
            spans: Vec::with_capacity(spans.len()),
        };
        for span in spans {
            set.push_merging(span);
        }
        set
    }

    /// Appends `span`, which must not start before the last stored span.
    fn push_merging(&mut self, span: Interval<T>) {
        if span.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(tail) if span.start() <= tail.end() => {
                if span.end() > tail.end() {
                    *tail = Interval::new(tail.start(), span.end());
                }
            }
            _ => self.spans.push(span),
        }
    }

    /// Position of the first span ending strictly after `point`.
    #[inline]
    fn seek(&self, point: T) -> usize {
        self.spans.partition_point(|s| s.end() <= point)
    }

    /// Adds `span` to the set, absorbing every span it overlaps or touches.
    pub fn insert(&mut self, span: Interval<T>) {
        if span.is_empty() {
            return;
        }
        let first = self.spans.partition_point(|s| s.end() < span.start());
        let last = self.spans.partition_point(|s| s.start() <= span.end());
        if first == last {
            self.spans.insert(first, span);
            return;
        }
        let start = span.start().min(self.spans[first].start());
        let end = span.end().max(self.spans[last - 1].end());
        self.spans[first] = Interval::new(start, end);
        self.spans.drain(first + 1..last);
    }

    #[inline]
    pub fn contains_point(&self, point: T) -> bool {
        self.first_containing(point).is_some()
    }

    /// The stored span that contains `point`.
    pub fn first_containing(&self, point: T) -> Option<Interval<T>> {
        self.spans
            .get(self.seek(point))
            .filter(|s| s.start() <= point)
            .copied()
    }

    /// The least member of the set that is not before `point`.
    pub fn earliest_at_or_after(&self, point: T) -> Option<T> {
        self.spans
            .get(self.seek(point))
            .map(|s| if s.start() > point { s.start() } else { point })
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = Self {
            spans: Vec::with_capacity(self.len() + other.len()),
        };
        let (mut lhs, mut rhs) = (self.spans.iter().peekable(), other.spans.iter().peekable());
        loop {
            let next = match (lhs.peek(), rhs.peek()) {
                (Some(a), Some(b)) if a.start() <= b.start() => lhs.next(),
                (Some(_), Some(_)) => rhs.next(),
                (Some(_), None) => lhs.next(),
                (None, Some(_)) => rhs.next(),
                (None, None) => break,
            };
            if let Some(span) = next {
                out.push_merging(*span);
            }
        }
        out
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Self::new();
        let (mut i, mut j) = (0, 0);
        while let (Some(a), Some(b)) = (self.spans.get(i), other.spans.get(j)) {
            if let Some(common) = a.intersection(b) {
                out.spans.push(common);
            }
            if a.end() <= b.end() {
                i += 1;
            } else {
                j += 1;
            }
        }
        out
    }

    /// Everything in `self` that is not in `other`.
    pub fn subtract(&self, other: &Self) -> Self {
        let mut out = Self::new();
        let mut j = 0;
        for span in &self.spans {
            // Holes that end before this span cannot touch later spans either.
            while other.spans.get(j).is_some_and(|h| h.end() <= span.start()) {
                j += 1;
            }
            let mut cursor = span.start();
            let mut k = j;
            while let Some(hole) = other.spans.get(k) {
                if hole.start() >= span.end() {
                    break;
                }
                if hole.start() > cursor {
                    out.spans.push(Interval::new(cursor, hole.start()));
                }
                cursor = cursor.max(hole.end());
                if hole.end() >= span.end() {
                    break;
                }
                k += 1;
            }
            if cursor < span.end() {
                out.spans.push(Interval::new(cursor, span.end()));
            }
        }
        out
    }
}

impl<T: Ord + Copy> FromIterator<Interval<T>> for IntervalSet<T> {
    fn from_iter<I: IntoIterator<Item = Interval<T>>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> Deref for IntervalSet<T> {
    type Target = [Interval<T>];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.spans
    }
}

impl<'a, T> IntoIterator for &'a IntervalSet<T> {
    type Item = &'a Interval<T>;
    type IntoIter = core::slice::Iter<'a, Interval<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
