//! Closed interval arithmetic over exact decimals.
//!
//! A numeric fact's reported precision widens its value into a range of
//! possible true values. Intervals here are closed ranges `[a, b]` with
//! `rust_decimal` bounds, so consistency verdicts never suffer binary
//! floating-point representation error. An *undefined* interval (a fact
//! that supports no range at all) is represented as `None` by the
//! operations that can produce one, and absorbs through arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::fact::{Fact, Precision};

/// A closed numeric interval `[a, b]` with exact decimal bounds.
///
/// Invariant: `a <= b`.
///
/// # Examples
///
/// ```
/// use crossfoot::Interval;
/// use rust_decimal::Decimal;
///
/// let i = Interval::new(Decimal::from(9000), Decimal::from(11000)).unwrap();
/// assert_eq!(i.midpoint(), Decimal::from(10000));
/// assert!(i.contains(Decimal::from(9500)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound (inclusive).
    pub a: Decimal,

    /// Upper bound (inclusive).
    pub b: Decimal,
}

impl Interval {
    /// Creates an interval from two bounds.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidInterval` if `a > b`.
    pub fn new(a: Decimal, b: Decimal) -> Result<Self, ValidationError> {
        if a > b {
            return Err(ValidationError::InvalidInterval { lower: a, upper: b });
        }
        Ok(Self { a, b })
    }

    /// Creates a zero-width interval at a single value.
    #[must_use]
    pub const fn point(value: Decimal) -> Self {
        Self { a: value, b: value }
    }

    /// The additive identity: `[0, 0]`.
    #[must_use]
    pub const fn zero() -> Self {
        Self::point(Decimal::ZERO)
    }

    /// The range of possible true values behind a reported fact.
    ///
    /// Undefined (`None`) if the fact is non-numeric or nil, its value does
    /// not parse as an exact decimal, its precision is unspecified, or the
    /// rounding tolerance falls outside the decimal range. Otherwise the
    /// half-width is `10^-decimals / 2` (zero for exact values).
    #[must_use]
    pub fn from_fact(fact: &Fact) -> Option<Self> {
        if !fact.is_numeric() || fact.is_nil() {
            return None;
        }
        let value = fact.decimal_value()?;
        let width = match fact.precision() {
            Precision::Exact => Decimal::ZERO,
            Precision::Unspecified => return None,
            Precision::Decimals(d) => half_power_of_ten(d.checked_neg()?)?,
        };
        Some(Self {
            a: value.checked_sub(width)?,
            b: value.checked_add(width)?,
        })
    }

    /// Returns the intersection of two intervals, or `None` if they do not
    /// overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let a = self.a.max(other.a);
        let b = self.b.min(other.b);
        if a > b {
            return None;
        }
        Some(Self { a, b })
    }

    /// Intersects every interval in the iterator.
    ///
    /// `None` for an empty iterator or when no point is common to all
    /// inputs; otherwise the bounds are the max of the lower bounds and the
    /// min of the upper bounds.
    pub fn intersect_all<I>(intervals: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut iter = intervals.into_iter();
        let first = iter.next()?;
        iter.try_fold(first, |acc, next| acc.intersection(&next))
    }

    /// Interval addition: `[a1 + a2, b1 + b2]`, saturating at the decimal
    /// range limits.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            a: self.a.saturating_add(other.a),
            b: self.b.saturating_add(other.b),
        }
    }

    /// Scales by a scalar. Negative scalars swap the bounds so that
    /// `a <= b` always holds.
    #[must_use]
    pub fn times(&self, scalar: Decimal) -> Self {
        let lower = self.a.saturating_mul(scalar);
        let upper = self.b.saturating_mul(scalar);
        if scalar < Decimal::ZERO {
            Self { a: upper, b: lower }
        } else {
            Self { a: lower, b: upper }
        }
    }

    /// The midpoint `(a + b) / 2`.
    #[must_use]
    pub fn midpoint(&self) -> Decimal {
        (self.a.saturating_add(self.b)) / Decimal::TWO
    }

    /// The width `b - a`.
    #[must_use]
    pub fn width(&self) -> Decimal {
        self.b - self.a
    }

    /// True if `value` lies within the closed range.
    #[must_use]
    pub fn contains(&self, value: Decimal) -> bool {
        self.a <= value && value <= self.b
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.a, self.b)
    }
}

/// `10^exp / 2`, the rounding tolerance of a value with `-exp` decimals.
fn half_power_of_ten(exp: i32) -> Option<Decimal> {
    let power = if exp >= 0 {
        let magnitude = 10i128.checked_pow(u32::try_from(exp).ok()?)?;
        Decimal::try_from_i128_with_scale(magnitude, 0).ok()?
    } else {
        let scale = exp.unsigned_abs();
        if scale > 28 {
            return None;
        }
        Decimal::new(1, scale)
    };
    power.checked_div(Decimal::TWO)
}
