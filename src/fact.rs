//! Facts: reported values with aspects and precision.
//!
//! A fact binds a value to a full set of aspects. Numeric facts carry a
//! [`Precision`] that states how many decimal places of the value are
//! significant; rounding a value to its stated precision and widening it
//! into an interval both start from here. Alignment between facts, the
//! basis of duplicate detection and calculation binding, compares aspect
//! maps under an [`AspectFilter`].

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::aspect::{Aspect, AspectFilter, AspectName, AspectValue};
use crate::concept::ConceptName;
use crate::period::Period;

/// The identifier of a fact within a report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactId(String);

impl FactId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FactId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for FactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for FactId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The stated precision of a numeric fact value.
///
/// On the wire this is the optional `d` field of a fact: absent means the
/// value is exact, an explicit null means the accuracy is unspecified, and
/// a number gives the count of significant decimal places (negative counts
/// round to the left of the decimal point).
///
/// Precisions order by how much they constrain the value: `Unspecified` is
/// the least precise, then `Decimals` by place count, and `Exact` is the
/// most precise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Precision {
    /// The value is exact (no `d` field).
    #[default]
    Exact,

    /// Accuracy was explicitly left unspecified (`d` is null).
    Unspecified,

    /// Significant decimal places.
    Decimals(i32),
}

impl Precision {
    /// True for an exact value.
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        matches!(self, Self::Exact)
    }

    /// True for an explicitly unspecified accuracy.
    #[must_use]
    pub const fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }

    /// The decimal place count, if one was stated.
    #[must_use]
    pub const fn decimals(&self) -> Option<i32> {
        match self {
            Self::Decimals(d) => Some(*d),
            _ => None,
        }
    }
}

impl Ord for Precision {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Self::Exact, Self::Exact) | (Self::Unspecified, Self::Unspecified) => Ordering::Equal,
            (Self::Exact, _) | (_, Self::Unspecified) => Ordering::Greater,
            (_, Self::Exact) | (Self::Unspecified, _) => Ordering::Less,
            (Self::Decimals(a), Self::Decimals(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Precision {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Precision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Exact | Self::Unspecified => serializer.serialize_none(),
            Self::Decimals(d) => serializer.serialize_some(d),
        }
    }
}

impl<'de> Deserialize<'de> for Precision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<i32>::deserialize(deserializer)? {
            None => Self::Unspecified,
            Some(d) => Self::Decimals(d),
        })
    }
}

/// How to break ties when a value sits exactly halfway between two
/// rounded candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round halves away from zero.
    #[default]
    HalfUp,

    /// Round halves towards zero.
    HalfDown,

    /// Round halves to the nearest even digit.
    HalfEven,
}

impl RoundingMode {
    /// The corresponding `rust_decimal` strategy.
    #[must_use]
    pub const fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfDown => RoundingStrategy::MidpointTowardZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Rounds a value to a number of decimal places, which may be negative to
/// round to tens, hundreds and so on.
///
/// `None` when the scaling factor or the scaled value leaves the decimal
/// range.
#[must_use]
pub fn round_decimal(value: Decimal, decimals: i32, mode: RoundingMode) -> Option<Decimal> {
    if decimals >= 0 {
        let dp = u32::try_from(decimals).ok()?.min(28);
        Some(value.round_dp_with_strategy(dp, mode.strategy()))
    } else {
        let factor = power_of_ten(decimals.unsigned_abs())?;
        let scaled = value.checked_div(factor)?;
        scaled
            .round_dp_with_strategy(0, mode.strategy())
            .checked_mul(factor)
    }
}

fn power_of_ten(exp: u32) -> Option<Decimal> {
    let magnitude = 10i128.checked_pow(exp)?;
    Decimal::try_from_i128_with_scale(magnitude, 0).ok()
}

/// A single reported fact.
///
/// Facts are built by [`Report`](crate::report::Report) from its wire
/// data, with aspect values and the monetary flag already resolved against
/// the report's prefix and concept maps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    id: FactId,
    aspects: BTreeMap<AspectName, AspectValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Precision::is_exact")]
    precision: Precision,
    monetary: bool,
}

impl Fact {
    pub(crate) const fn new(
        id: FactId,
        aspects: BTreeMap<AspectName, AspectValue>,
        value: Option<String>,
        precision: Precision,
        monetary: bool,
    ) -> Self {
        Self {
            id,
            aspects,
            value,
            precision,
            monetary,
        }
    }

    /// The fact's identifier.
    #[must_use]
    pub const fn id(&self) -> &FactId {
        &self.id
    }

    /// All aspects of the fact.
    #[must_use]
    pub const fn aspects(&self) -> &BTreeMap<AspectName, AspectValue> {
        &self.aspects
    }

    /// Looks up one aspect by name.
    #[must_use]
    pub fn aspect(&self, name: &AspectName) -> Option<Aspect> {
        self.aspects
            .get(name)
            .map(|value| Aspect::new(name.clone(), value.clone()))
    }

    /// The concept this fact reports against.
    #[must_use]
    pub fn concept_name(&self) -> Option<ConceptName> {
        self.aspects.get("c")?.as_str().map(ConceptName::from)
    }

    /// The unit aspect value, for numeric facts.
    #[must_use]
    pub fn unit_value(&self) -> Option<&str> {
        self.aspects.get("u")?.as_str()
    }

    /// The reported value as text. `None` for nil facts.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True for an explicit nil value.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.value.is_none()
    }

    /// True if the fact has a unit aspect.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.aspects.contains_key("u")
    }

    /// True if the fact's unit is an ISO 4217 currency.
    #[must_use]
    pub const fn is_monetary(&self) -> bool {
        self.monetary
    }

    /// The currency code of a monetary fact.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        if !self.monetary {
            return None;
        }
        let (_, localname) = self.unit_value()?.split_once(':')?;
        Some(localname)
    }

    /// The stated precision.
    #[must_use]
    pub const fn precision(&self) -> Precision {
        self.precision
    }

    /// The stated decimal place count, if any.
    #[must_use]
    pub const fn decimals(&self) -> Option<i32> {
        self.precision.decimals()
    }

    /// The value parsed as an exact decimal.
    ///
    /// Accepts plain and exponent notation. `None` for nil facts and for
    /// values that do not parse.
    #[must_use]
    pub fn decimal_value(&self) -> Option<Decimal> {
        let text = self.value.as_deref()?.trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .ok()
    }

    /// The value rounded to the stated precision.
    ///
    /// Exact and unspecified precisions leave the value unrounded.
    #[must_use]
    pub fn rounded_value(&self, mode: RoundingMode) -> Option<Decimal> {
        let value = self.decimal_value()?;
        match self.precision {
            Precision::Exact | Precision::Unspecified => Some(value),
            Precision::Decimals(d) => round_decimal(value, d, mode),
        }
    }

    /// The period aspect, parsed.
    #[must_use]
    pub fn period(&self) -> Option<Period> {
        self.aspects.get("p")?.as_str()?.parse().ok()
    }

    /// The taxonomy-defined dimensions of the fact.
    pub fn dimensions(&self) -> impl Iterator<Item = Aspect> + '_ {
        self.aspects
            .iter()
            .filter(|(name, _)| name.is_taxonomy_defined())
            .map(|(name, value)| Aspect::new(name.clone(), value.clone()))
    }

    /// Whether this fact and another agree on all uncovered aspects.
    ///
    /// Both facts must have the same number of aspects. Each aspect of
    /// this fact is then checked: aspects covered by the filter are tested
    /// against the filter's admitted values (note: against *this* fact's
    /// value, making the relation asymmetric for restricted coverage),
    /// while uncovered aspects must be equal on both facts.
    #[must_use]
    pub fn is_aligned(&self, other: &Self, covered: &AspectFilter) -> bool {
        if self.aspects.len() != other.aspects.len() {
            return false;
        }
        for (name, value) in &self.aspects {
            match covered.get(name) {
                Some(coverage) => {
                    if !coverage.admits(value) {
                        return false;
                    }
                }
                None => {
                    if other.aspects.get(name) != Some(value) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// A human-readable description of the fact's accuracy.
    #[must_use]
    pub fn readable_accuracy(&self) -> String {
        if !self.is_numeric() || self.is_nil() {
            return "n/a".to_owned();
        }
        let d = match self.precision {
            Precision::Exact => return "Infinite precision".to_owned(),
            Precision::Unspecified => return "Unspecified".to_owned(),
            Precision::Decimals(d) => d,
        };
        let mut name = match d {
            3 => Some("thousandths"),
            2 => Some("hundredths"),
            0 => Some("ones"),
            -1 => Some("tens"),
            -2 => Some("hundreds"),
            -3 => Some("thousands"),
            -6 => Some("millions"),
            -9 => Some("billions"),
            _ => None,
        };
        if d == 2 && self.monetary {
            match self.currency() {
                Some("USD" | "EUR" | "AUD" | "ZAR") => name = Some("cents"),
                Some("GBP") => name = Some("pence"),
                _ => {}
            }
        }
        match name {
            Some(name) => format!("{d} ({name})"),
            None => d.to_string(),
        }
    }
}
