//! Fact aspects and aspect filters.
//!
//! Every fact is characterised by a set of aspects: the built-in concept,
//! entity, period and unit aspects (single-letter names) plus any number
//! of taxonomy-defined dimensions (prefixed names). Alignment between
//! facts is a comparison of their aspect maps, optionally loosened by an
//! [`AspectFilter`] that *covers* selected aspects.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::concept::ConceptName;

/// The name of an aspect.
///
/// Built-in aspects use single-letter names (`c`, `e`, `p`, `u`);
/// taxonomy-defined dimensions use `prefix:localname` strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AspectName(String);

impl AspectName {
    /// The built-in concept aspect.
    #[must_use]
    pub fn concept() -> Self {
        Self("c".to_owned())
    }

    /// The built-in entity aspect.
    #[must_use]
    pub fn entity() -> Self {
        Self("e".to_owned())
    }

    /// The built-in period aspect.
    #[must_use]
    pub fn period() -> Self {
        Self("p".to_owned())
    }

    /// The built-in unit aspect.
    #[must_use]
    pub fn unit() -> Self {
        Self("u".to_owned())
    }

    /// A taxonomy-defined dimension aspect.
    #[must_use]
    pub fn dimension(qname: impl Into<String>) -> Self {
        Self(qname.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the concept aspect.
    #[must_use]
    pub fn is_concept(&self) -> bool {
        self.0 == "c"
    }

    /// True for the entity aspect.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        self.0 == "e"
    }

    /// True for the period aspect.
    #[must_use]
    pub fn is_period(&self) -> bool {
        self.0 == "p"
    }

    /// True for the unit aspect.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.0 == "u"
    }

    /// True for taxonomy-defined dimensions, whose names are prefixed.
    #[must_use]
    pub fn is_taxonomy_defined(&self) -> bool {
        self.0.contains(':')
    }

    /// A human-readable label for the built-in aspects.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "c" => Some("Concept"),
            "e" => Some("Entity"),
            "p" => Some("Period"),
            "u" => Some("Unit"),
            _ => None,
        }
    }
}

impl From<&str> for AspectName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for AspectName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for AspectName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AspectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The value a fact reports for one aspect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AspectValue {
    /// An explicit nil.
    Nil,

    /// A reference to a taxonomy object by prefixed name.
    Qname(String),

    /// Free text, such as a period lexical form or a typed dimension value.
    Text(String),
}

impl AspectValue {
    /// True for an explicit nil value.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the textual content, `None` for nil.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Nil => None,
            Self::Qname(s) | Self::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for AspectValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Qname(s) | Self::Text(s) => f.write_str(s),
        }
    }
}

/// One named aspect of a fact together with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aspect {
    name: AspectName,
    value: AspectValue,
}

impl Aspect {
    /// Pairs a name with a value.
    #[must_use]
    pub const fn new(name: AspectName, value: AspectValue) -> Self {
        Self { name, value }
    }

    /// The aspect name.
    #[must_use]
    pub const fn name(&self) -> &AspectName {
        &self.name
    }

    /// The aspect value.
    #[must_use]
    pub const fn value(&self) -> &AspectValue {
        &self.value
    }

    /// True if the value is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.value.is_nil()
    }

    /// True for a taxonomy-defined dimension.
    #[must_use]
    pub fn is_taxonomy_defined(&self) -> bool {
        self.name.is_taxonomy_defined()
    }

    /// A human-readable label for built-in aspects.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        self.name.label()
    }
}

/// How a covered aspect admits values during alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Covered {
    /// Any value (or absence elsewhere is still checked by map length).
    Any,

    /// Exactly one admissible value.
    One(AspectValue),

    /// Any of a list of admissible values.
    AnyOf(Vec<AspectValue>),
}

impl Covered {
    /// True if the given value is admitted.
    #[must_use]
    pub fn admits(&self, value: &AspectValue) -> bool {
        match self {
            Self::Any => true,
            Self::One(allowed) => allowed == value,
            Self::AnyOf(allowed) => allowed.contains(value),
        }
    }
}

/// A set of covered aspects used to loosen fact alignment.
///
/// Aspects not present in the filter must match exactly between the two
/// facts; covered aspects are checked against the filter instead.
///
/// # Examples
///
/// ```
/// use crossfoot::{AspectFilter, AspectName};
///
/// let filter = AspectFilter::none().cover(AspectName::period());
/// assert_eq!(filter.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AspectFilter {
    covered: BTreeMap<AspectName, Covered>,
}

impl AspectFilter {
    /// A filter covering nothing: alignment is exact duplication.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Covers an aspect with any value admitted.
    #[must_use]
    pub fn cover(mut self, name: AspectName) -> Self {
        self.covered.insert(name, Covered::Any);
        self
    }

    /// Covers an aspect admitting a single value.
    #[must_use]
    pub fn restrict(mut self, name: AspectName, value: AspectValue) -> Self {
        self.covered.insert(name, Covered::One(value));
        self
    }

    /// Covers an aspect admitting any of a list of values.
    #[must_use]
    pub fn restrict_to(mut self, name: AspectName, values: Vec<AspectValue>) -> Self {
        self.covered.insert(name, Covered::AnyOf(values));
        self
    }

    /// Covers the concept aspect with the given concept names admitted.
    #[must_use]
    pub fn covering_concepts<I>(concepts: I) -> Self
    where
        I: IntoIterator<Item = ConceptName>,
    {
        let values = concepts
            .into_iter()
            .map(|c| AspectValue::Qname(c.into()))
            .collect();
        Self::none().restrict_to(AspectName::concept(), values)
    }

    /// Looks up the coverage of an aspect.
    #[must_use]
    pub fn get(&self, name: &AspectName) -> Option<&Covered> {
        self.covered.get(name)
    }

    /// True if no aspect is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.covered.is_empty()
    }

    /// The number of covered aspects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.covered.len()
    }
}
