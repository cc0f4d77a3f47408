//! Report loading and cross-fact queries.
//!
//! A report arrives as a single JSON document holding a prefix map, a
//! taxonomy extract (concept metadata), the facts, and the relationship
//! forest grouped by arc role and extended link role (ELR). [`Report`]
//! deserializes that document into typed wire structs, then eagerly
//! resolves every fact's aspect values and monetary flag so the query
//! side never needs the raw data again.
//!
//! Relationship edits go through [`Report::set_relationships`], which
//! bumps a version counter; resolved calculation views borrow the report
//! immutably, so the borrow checker retires them before any edit can be
//! applied.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::aspect::{AspectFilter, AspectName, AspectValue};
use crate::calculation::{CalcVersion, Calculation};
use crate::concept::{ConceptData, ConceptName};
use crate::error::{CrossfootResult, ValidationError};
use crate::fact::{Fact, FactId, Precision};
use crate::qname::QName;

/// One fact as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactData {
    /// Aspect values keyed by aspect name; null marks a nil value.
    #[serde(rename = "a", default)]
    pub aspects: IndexMap<String, Option<String>>,

    /// The reported value. Numbers and booleans are accepted and read as
    /// their textual form; null or absent means nil.
    #[serde(
        rename = "v",
        default,
        deserialize_with = "scalar_to_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,

    /// The stated precision (`d` field).
    #[serde(rename = "d", default, skip_serializing_if = "Precision::is_exact")]
    pub precision: Precision,
}

fn scalar_to_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// One summation arc: a contributing concept and its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipData {
    /// The contributing concept.
    #[serde(rename = "t")]
    pub target: ConceptName,

    /// The summation weight, normally `1` or `-1`.
    #[serde(rename = "w")]
    pub weight: Decimal,
}

/// The full wire document.
///
/// Relationships nest as arc role, then ELR, then source concept, each
/// source holding its arcs in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// Namespace bindings for every prefix the document uses.
    #[serde(default)]
    pub prefixes: IndexMap<String, String>,

    /// Concept metadata keyed by prefixed name.
    #[serde(default)]
    pub concepts: IndexMap<ConceptName, ConceptData>,

    /// Facts keyed by identifier, in document order.
    #[serde(default)]
    pub facts: IndexMap<FactId, FactData>,

    /// The relationship forest.
    #[serde(default)]
    pub rels: IndexMap<String, IndexMap<String, IndexMap<ConceptName, Vec<RelationshipData>>>>,
}

/// A loaded report with fully resolved facts.
///
/// # Examples
///
/// ```
/// use crossfoot::Report;
///
/// let report = Report::parse(r#"{
///     "prefixes": {"eg": "http://www.example.com"},
///     "facts": {"f1": {"v": 12, "a": {"c": "eg:Cash"}}}
/// }"#).unwrap();
/// assert_eq!(report.fact_count(), 1);
/// assert_eq!(report.fact("f1").unwrap().value(), Some("12"));
/// ```
#[derive(Debug, Clone)]
pub struct Report {
    data: ReportData,
    facts: IndexMap<FactId, Fact>,
    version: u64,
}

impl Report {
    /// Parses a report from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns `CrossfootError::Json` if the document is not valid JSON or
    /// does not match the wire layout.
    pub fn parse(text: &str) -> CrossfootResult<Self> {
        let data: ReportData = serde_json::from_str(text)?;
        Ok(Self::new(data))
    }

    /// Builds a report from already-deserialized wire data.
    #[must_use]
    pub fn new(data: ReportData) -> Self {
        let facts = data
            .facts
            .iter()
            .map(|(id, fact)| (id.clone(), build_fact(&data, id.clone(), fact)))
            .collect::<IndexMap<_, _>>();
        tracing::info!(
            facts = facts.len(),
            concepts = data.concepts.len(),
            "loaded report"
        );
        Self {
            data,
            facts,
            version: 0,
        }
    }

    /// All facts in document order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// Looks up a fact by identifier.
    #[must_use]
    pub fn fact(&self, id: &str) -> Option<&Fact> {
        self.facts.get(id)
    }

    /// The number of facts in the report.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Looks up concept metadata by prefixed name.
    #[must_use]
    pub fn concept(&self, name: &str) -> Option<&ConceptData> {
        self.data.concepts.get(name)
    }

    /// The standard English label of a concept, if any.
    #[must_use]
    pub fn label(&self, concept: &str) -> Option<&str> {
        self.concept(concept)?.label("std", "en")
    }

    /// Resolves a prefixed name against the report's prefix map.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name has no prefix separator or
    /// uses an unbound prefix.
    pub fn qname(&self, name: &str) -> Result<QName, ValidationError> {
        QName::parse(&self.data.prefixes, name)
    }

    /// The prefix map.
    #[must_use]
    pub const fn prefixes(&self) -> &IndexMap<String, String> {
        &self.data.prefixes
    }

    /// The underlying wire data.
    #[must_use]
    pub const fn data(&self) -> &ReportData {
        &self.data
    }

    /// The arcs leaving a source concept, for every ELR of an arc role.
    ///
    /// ELRs that carry the arc role but have no arcs from this source
    /// still appear, with an empty slice.
    #[must_use]
    pub fn child_relationships(
        &self,
        source: &ConceptName,
        arc_role: &str,
    ) -> IndexMap<&str, &[RelationshipData]> {
        let mut out = IndexMap::new();
        if let Some(by_elr) = self.data.rels.get(arc_role) {
            for (elr, by_source) in by_elr {
                let arcs = by_source.get(source).map_or(&[][..], Vec::as_slice);
                out.insert(elr.as_str(), arcs);
            }
        }
        out
    }

    /// The arcs leaving a source concept in one specific ELR.
    #[must_use]
    pub fn relationship_arcs(
        &self,
        arc_role: &str,
        elr: &str,
        source: &ConceptName,
    ) -> Option<&[RelationshipData]> {
        self.data
            .rels
            .get(arc_role)?
            .get(elr)?
            .get(source)
            .map(Vec::as_slice)
    }

    /// All facts aligned with the given fact under a filter, in document
    /// order. The fact itself is included.
    #[must_use]
    pub fn aligned_facts(&self, fact: &Fact, covered: &AspectFilter) -> Vec<&Fact> {
        self.facts
            .values()
            .filter(|candidate| candidate.is_aligned(fact, covered))
            .collect()
    }

    /// True if the report carries summation arcs of either version.
    #[must_use]
    pub fn uses_calculations(&self) -> bool {
        CalcVersion::ALL.iter().any(|version| {
            self.data
                .rels
                .get(version.arc_role())
                .is_some_and(|by_elr| by_elr.values().any(|sources| !sources.is_empty()))
        })
    }

    /// Resolves the calculations of one fact under one arc version.
    #[must_use]
    pub fn calculation<'r>(&'r self, fact: &'r Fact, version: CalcVersion) -> Calculation<'r> {
        Calculation::new(self, fact, version)
    }

    /// True if any arc version defines a populated calculation for the
    /// fact's concept.
    #[must_use]
    pub fn fact_has_calculations(&self, fact: &Fact) -> bool {
        CalcVersion::ALL
            .into_iter()
            .any(|version| self.calculation(fact, version).has_calculations())
    }

    /// Replaces the arcs leaving a source concept in one ELR.
    ///
    /// Bumps the relationship version; resolved views built before the
    /// edit cannot outlive it, since they borrow the report.
    pub fn set_relationships(
        &mut self,
        arc_role: &str,
        elr: &str,
        source: ConceptName,
        arcs: Vec<RelationshipData>,
    ) {
        self.data
            .rels
            .entry(arc_role.to_owned())
            .or_default()
            .entry(elr.to_owned())
            .or_default()
            .insert(source, arcs);
        self.version += 1;
        tracing::debug!(arc_role, elr, version = self.version, "relationships updated");
    }

    /// A counter that increments on every relationship edit, for callers
    /// that snapshot resolved results.
    #[must_use]
    pub const fn relationships_version(&self) -> u64 {
        self.version
    }
}

/// Resolves one fact's wire data against the report context.
fn build_fact(data: &ReportData, id: FactId, fact: &FactData) -> Fact {
    let mut aspects = BTreeMap::new();
    for (name, value) in &fact.aspects {
        let name = AspectName::from(name.clone());
        let value = resolve_aspect_value(data, &name, value.as_deref());
        aspects.insert(name, value);
    }
    let monetary = aspects
        .get("u")
        .and_then(AspectValue::as_str)
        .and_then(|unit| QName::parse(&data.prefixes, unit).ok())
        .is_some_and(|qname| qname.is_iso4217());
    Fact::new(id, aspects, fact.value.clone(), fact.precision, monetary)
}

/// Classifies an aspect's wire value.
///
/// Periods and typed dimension values are free text; concept, entity,
/// unit and explicit dimension values are prefixed names.
fn resolve_aspect_value(data: &ReportData, name: &AspectName, value: Option<&str>) -> AspectValue {
    let Some(value) = value else {
        return AspectValue::Nil;
    };
    if name.is_period() {
        return AspectValue::Text(value.to_owned());
    }
    if name.is_taxonomy_defined()
        && data
            .concepts
            .get(name.as_str())
            .is_some_and(ConceptData::is_typed_dimension)
    {
        return AspectValue::Text(value.to_owned());
    }
    AspectValue::Qname(value.to_owned())
}
