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

//! # Continuous Time
//!
//! - `TimePoint`: an instant on the planning clock, `t >= 0` in practice, may
//!   be `+∞` to express "from here on, forever".
//! - `TimeDelta`: a duration or the difference between two time points.
//! - `TimeInterval`: a half-open `[start, end)` window of `TimePoint`s.
//!
//! Both newtypes wrap an `f64` but carry a total order (via `f64::total_cmp`),
//! so they can be used as keys of sorted interval sets. NaN is rejected at
//! construction.

use crate::primitives::Interval;
use num_traits::Zero;
use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
    iter::Sum,
    ops::{Add, AddAssign, Mul, Sub, SubAssign},
};

/// An instant on the continuous planning clock.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TimePoint(f64);

/// A signed duration between two [`TimePoint`]s.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeDelta(f64);

pub type TimeInterval = Interval<TimePoint>;

impl TimePoint {
    pub const ZERO: TimePoint = TimePoint(0.0);
    pub const INFINITY: TimePoint = TimePoint(f64::INFINITY);

    /// # Panics
    ///
    /// Panics if `value` is NaN.
    #[inline]
    pub fn new(value: f64) -> Self {
        assert!(!value.is_nan(), "TimePoint::new: NaN");
        TimePoint(value)
    }

    #[inline]
    pub fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    #[inline]
    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }

    /// Interval `[self, self + len)`, or `None` for negative lengths.
    #[inline]
    pub fn span_of(self, len: TimeDelta) -> Option<TimeInterval> {
        if len.is_negative() {
            return None;
        }
        Some(Interval::new(self, self + len))
    }

    /// Interval `[self, +∞)`.
    #[inline]
    pub fn onwards(self) -> TimeInterval {
        Interval::new(self, TimePoint::INFINITY)
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        if self <= other { self } else { other }
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        if self >= other { self } else { other }
    }
}

impl TimeDelta {
    /// # Panics
    ///
    /// Panics if `value` is NaN.
    #[inline]
    pub fn new(value: f64) -> Self {
        assert!(!value.is_nan(), "TimeDelta::new: NaN");
        TimeDelta(value)
    }

    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn abs(self) -> Self {
        TimeDelta(self.0.abs())
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0.0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }

    /// Time needed to cover `distance` at constant `velocity`.
    ///
    /// # Panics
    ///
    /// Panics if `velocity` is not strictly positive.
    #[inline]
    pub fn travel(distance: f64, velocity: f64) -> Self {
        assert!(velocity > 0.0, "velocity must be > 0");
        TimeDelta::new(distance / velocity)
    }
}

impl PartialEq for TimePoint {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimePoint {}

impl PartialOrd for TimePoint {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimePoint {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        // -0.0 and 0.0 compare equal on the clock.
        if self.0 == other.0 {
            Ordering::Equal
        } else {
            self.0.total_cmp(&other.0)
        }
    }
}

impl Hash for TimePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let v = if self.0 == 0.0 { 0.0f64 } else { self.0 };
        v.to_bits().hash(state);
    }
}

impl PartialEq for TimeDelta {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeDelta {}

impl PartialOrd for TimeDelta {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeDelta {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            Ordering::Equal
        } else {
            self.0.total_cmp(&other.0)
        }
    }
}

impl Display for TimePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_infinite() {
            write!(f, "inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Display for TimeDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TimeDelta({})", self.0)
    }
}

impl From<f64> for TimePoint {
    #[inline]
    fn from(v: f64) -> Self {
        TimePoint::new(v)
    }
}

impl From<f64> for TimeDelta {
    #[inline]
    fn from(v: f64) -> Self {
        TimeDelta::new(v)
    }
}

impl Zero for TimeDelta {
    #[inline]
    fn zero() -> Self {
        TimeDelta(0.0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Add<TimeDelta> for TimePoint {
    type Output = TimePoint;

    #[inline]
    fn add(self, rhs: TimeDelta) -> Self::Output {
        TimePoint::new(self.0 + rhs.0)
    }
}

impl Sub<TimeDelta> for TimePoint {
    type Output = TimePoint;

    #[inline]
    fn sub(self, rhs: TimeDelta) -> Self::Output {
        TimePoint::new(self.0 - rhs.0)
    }
}

impl AddAssign<TimeDelta> for TimePoint {
    #[inline]
    fn add_assign(&mut self, rhs: TimeDelta) {
        *self = *self + rhs;
    }
}

impl SubAssign<TimeDelta> for TimePoint {
    #[inline]
    fn sub_assign(&mut self, rhs: TimeDelta) {
        *self = *self - rhs;
    }
}

impl Sub<TimePoint> for TimePoint {
    type Output = TimeDelta;

    /// `inf - inf` is defined as zero so that an empty `[inf, inf)` interval
    /// has length zero.
    #[inline]
    fn sub(self, rhs: TimePoint) -> Self::Output {
        if self.0 == rhs.0 {
            return TimeDelta(0.0);
        }
        TimeDelta::new(self.0 - rhs.0)
    }
}

impl Add for TimeDelta {
    type Output = TimeDelta;

    #[inline]
    fn add(self, rhs: TimeDelta) -> Self::Output {
        TimeDelta::new(self.0 + rhs.0)
    }
}

impl Sub for TimeDelta {
    type Output = TimeDelta;

    #[inline]
    fn sub(self, rhs: TimeDelta) -> Self::Output {
        TimeDelta::new(self.0 - rhs.0)
    }
}

impl Mul<f64> for TimeDelta {
    type Output = TimeDelta;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        TimeDelta::new(self.0 * rhs)
    }
}

impl Sum for TimeDelta {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(TimeDelta::zero(), |acc, x| acc + x)
    }
}
