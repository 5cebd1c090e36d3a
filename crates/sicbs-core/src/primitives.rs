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

//! Generic building blocks shared by the time and geometry layers.

use std::fmt;

/// A half-open window `[start, end)`.
///
/// The bounds are swapped on construction if given in reverse, so
/// `start <= end` holds for every comparable pair. Most of the planner uses
/// it through [`TimeInterval`](crate::time::TimeInterval).
///
/// ```
/// use sicbs_core::primitives::Interval;
/// let window = Interval::new(5, 1);
/// assert_eq!((window.start(), window.end()), (1, 5));
/// assert!(window.contains(1) && !window.contains(5));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    lo: T,
    hi: T,
}

impl<T: PartialOrd + Copy> Interval<T> {
    #[inline]
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Self { lo: b, hi: a }
        } else {
            Self { lo: a, hi: b }
        }
    }

    #[inline]
    pub fn start(&self) -> T {
        self.lo
    }

    #[inline]
    pub fn end(&self) -> T {
        self.hi
    }

    /// `true` if the window holds no point at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }

    #[inline]
    pub fn contains(&self, x: T) -> bool {
        self.lo <= x && x < self.hi
    }

    /// The common part of two windows. Windows that only touch have none.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let lo = if other.lo > self.lo { other.lo } else { self.lo };
        let hi = if other.hi < self.hi { other.hi } else { self.hi };
        (lo < hi).then_some(Self { lo, hi })
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}
