//! Sets of aligned duplicate facts.
//!
//! A report may state the same datapoint more than once, for instance in
//! the primary statements and again in the notes. A [`FactSet`] collects
//! the aligned duplicates of one datapoint and answers the questions the
//! calculation engine asks of them: do they all agree exactly, which
//! single range of true values do they jointly support, and which member
//! is the most precise.

use serde::Serialize;

use crate::aspect::AspectFilter;
use crate::fact::Fact;
use crate::interval::Interval;

/// A set of aligned facts reporting the same datapoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FactSet<'r> {
    facts: Vec<&'r Fact>,
}

impl<'r> FactSet<'r> {
    /// Wraps a list of aligned facts, in document order.
    #[must_use]
    pub const fn new(facts: Vec<&'r Fact>) -> Self {
        Self { facts }
    }

    /// True if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// The number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// The first member in document order.
    #[must_use]
    pub fn first(&self) -> Option<&'r Fact> {
        self.facts.first().copied()
    }

    /// Iterates the members in document order.
    pub fn iter(&self) -> impl Iterator<Item = &'r Fact> + '_ {
        self.facts.iter().copied()
    }

    /// The members as a slice.
    #[must_use]
    pub fn facts(&self) -> &[&'r Fact] {
        &self.facts
    }

    /// True if every member reports the same value at the same precision.
    ///
    /// Vacuously true for an empty set.
    #[must_use]
    pub fn complete_duplicates(&self) -> bool {
        let Some(first) = self.facts.first() else {
            return true;
        };
        self.facts
            .iter()
            .all(|f| f.value() == first.value() && f.precision() == first.precision())
    }

    /// The single range of true values all members jointly support.
    ///
    /// `None` for an empty set, when any member has no interval of its
    /// own, or when the members' intervals share no common point.
    #[must_use]
    pub fn value_intersection(&self) -> Option<Interval> {
        let mut iter = self.facts.iter();
        let first = Interval::from_fact(iter.next()?)?;
        iter.try_fold(first, |acc, fact| {
            acc.intersection(&Interval::from_fact(fact)?)
        })
    }

    /// True if the members could all be rounded renderings of one true
    /// value. Vacuously true for an empty set.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.is_empty() || self.value_intersection().is_some()
    }

    /// The member with the highest stated precision.
    ///
    /// Ties keep the earliest member in document order.
    #[must_use]
    pub fn most_precise(&self) -> Option<&'r Fact> {
        let mut iter = self.facts.iter().copied();
        let mut best = iter.next()?;
        for fact in iter {
            if fact.precision() > best.precision() {
                best = fact;
            }
        }
        Some(best)
    }
}

impl<'a, 'r> IntoIterator for &'a FactSet<'r> {
    type Item = &'r Fact;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, &'r Fact>>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter().copied()
    }
}

/// Drops all but the first of each group of exact duplicates.
///
/// Facts are exact duplicates when they align with no aspects covered.
/// Order is otherwise preserved.
#[must_use]
pub fn deduplicate<'r>(facts: &[&'r Fact]) -> Vec<&'r Fact> {
    let none = AspectFilter::none();
    let mut kept: Vec<&'r Fact> = Vec::new();
    for &fact in facts {
        if !kept.iter().any(|k| k.is_aligned(fact, &none)) {
            kept.push(fact);
        }
    }
    kept
}
