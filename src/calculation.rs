//! Calculation resolution and consistency checking.
//!
//! A summation arc network declares that a total concept should equal the
//! weighted sum of its contributing concepts. [`Calculation`] resolves
//! those arcs for one total fact: per extended link role (ELR) it gathers
//! the facts aligned with the total that report each contributing
//! concept, then wraps them in a [`ResolvedCalculation`] that can deliver
//! a verdict.
//!
//! Two checking regimes exist, selected by [`CalcVersion`]:
//!
//! * **Legacy** rounds every contributor to its stated precision, sums
//!   the rounded values, and demands exact equality with the rounded
//!   total. Duplicate contributors that are not exact duplicates leave
//!   the check *unchecked* rather than failing it.
//! * **V1.1** widens every value into the interval of true values it
//!   could have been rounded from, sums the intervals, and accepts the
//!   total when the summed range overlaps the total's own range.
//!
//! Verdicts that cannot be computed (a value that does not parse, an
//! unspecified precision, contradictory duplicates) surface as `None`
//! and make the calculation inconsistent or unchecked; they are never
//! errors.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aspect::AspectFilter;
use crate::concept::ConceptName;
use crate::fact::{Fact, FactId, RoundingMode};
use crate::factset::FactSet;
use crate::interval::Interval;
use crate::report::Report;

/// The two generations of calculation arcs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcVersion {
    /// XBRL 2.1 summation-item arcs, checked by rounded-value equality.
    Legacy,

    /// Calculations 1.1 arcs, checked by interval overlap.
    V11,
}

impl CalcVersion {
    /// Both versions, in checking order.
    pub const ALL: [Self; 2] = [Self::Legacy, Self::V11];

    /// The arc role key this version reads from the relationship forest.
    #[must_use]
    pub const fn arc_role(self) -> &'static str {
        match self {
            Self::Legacy => "calc",
            Self::V11 => "calc11",
        }
    }
}

impl std::fmt::Display for CalcVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::V11 => f.write_str("v1.1"),
        }
    }
}

/// The resolved calculations of one total fact under one arc version.
///
/// Resolution happens eagerly at construction: for every ELR that
/// carries the version's arc role, the facts aligned with the total and
/// reporting a contributing concept are collected, grouped by concept,
/// in document order. ELRs in which the total's concept has no arcs are
/// recorded with no facts.
pub struct Calculation<'r> {
    report: &'r Report,
    fact: &'r Fact,
    version: CalcVersion,
    concept_facts: IndexMap<String, IndexMap<ConceptName, Vec<&'r Fact>>>,
}

impl<'r> Calculation<'r> {
    /// Resolves the calculation facts for a total fact.
    #[must_use]
    pub fn new(report: &'r Report, fact: &'r Fact, version: CalcVersion) -> Self {
        let mut concept_facts = IndexMap::new();
        if let Some(concept) = fact.concept_name() {
            for (elr, arcs) in report.child_relationships(&concept, version.arc_role()) {
                let mut by_concept: IndexMap<ConceptName, Vec<&'r Fact>> = IndexMap::new();
                if !arcs.is_empty() {
                    let covered = AspectFilter::covering_concepts(
                        arcs.iter().map(|arc| arc.target.clone()),
                    );
                    for aligned in report.aligned_facts(fact, &covered) {
                        if let Some(target) = aligned.concept_name() {
                            by_concept.entry(target).or_default().push(aligned);
                        }
                    }
                }
                concept_facts.insert(elr.to_owned(), by_concept);
            }
        }
        tracing::debug!(
            fact = %fact.id(),
            version = %version,
            elrs = concept_facts.len(),
            "resolved calculation facts"
        );
        Self {
            report,
            fact,
            version,
            concept_facts,
        }
    }

    /// The arc version being checked.
    #[must_use]
    pub const fn version(&self) -> CalcVersion {
        self.version
    }

    /// The total fact.
    #[must_use]
    pub const fn fact(&self) -> &'r Fact {
        self.fact
    }

    /// The resolved facts: ELR to contributing concept to aligned facts.
    #[must_use]
    pub const fn calculation_facts(
        &self,
    ) -> &IndexMap<String, IndexMap<ConceptName, Vec<&'r Fact>>> {
        &self.concept_facts
    }

    /// True if at least one ELR found facts for a contributing concept.
    #[must_use]
    pub fn has_calculations(&self) -> bool {
        self.concept_facts.values().any(|concepts| !concepts.is_empty())
    }

    /// Resolves one ELR into a checkable calculation.
    ///
    /// `None` if the ELR is unknown for this version, or the total fact
    /// has no concept aspect.
    #[must_use]
    pub fn resolved_calculation(&self, elr: &str) -> Option<ResolvedCalculation<'r>> {
        let concept = self.fact.concept_name()?;
        let by_concept = self.concept_facts.get(elr)?;
        let arcs = self
            .report
            .relationship_arcs(self.version.arc_role(), elr, &concept)?;
        let rows = arcs
            .iter()
            .map(|arc| {
                let facts = by_concept.get(&arc.target).cloned().unwrap_or_default();
                CalculationContribution::new(arc.target.clone(), arc.weight, FactSet::new(facts))
            })
            .collect();
        let total_fact_set =
            FactSet::new(self.report.aligned_facts(self.fact, &AspectFilter::none()));
        let binding = CalculationBinding {
            elr: elr.to_owned(),
            total_fact: self.fact,
            total_fact_set,
            rows,
        };
        Some(match self.version {
            CalcVersion::Legacy => ResolvedCalculation::Legacy(binding),
            CalcVersion::V11 => ResolvedCalculation::V11(binding),
        })
    }

    /// Resolves every ELR that found at least one contributing fact, in
    /// document order.
    #[must_use]
    pub fn resolved_calculations(&self) -> Vec<ResolvedCalculation<'r>> {
        self.concept_facts
            .iter()
            .filter(|(_, concepts)| !concepts.is_empty())
            .filter_map(|(elr, _)| self.resolved_calculation(elr))
            .collect()
    }

    /// The ELR whose contributing concepts best match a set of facts.
    ///
    /// Each candidate ELR scores the fraction of its contributing
    /// concepts for which at least one resolved fact is in the given
    /// set. ELRs that resolved no facts at all are not candidates; on a
    /// tied score the earlier ELR wins. `None` when no ELR qualifies.
    #[must_use]
    pub fn best_elr_for_fact_set(&self, facts: &[FactId]) -> Option<&str> {
        let mut best: Option<(&str, usize, usize)> = None;
        for (elr, concepts) in &self.concept_facts {
            let total = concepts.len();
            if total == 0 {
                continue;
            }
            let matched = concepts
                .values()
                .filter(|group| group.iter().any(|f| facts.contains(f.id())))
                .count();
            let improves = match best {
                None => true,
                // Compare matched/total fractions without leaving integers
                Some((_, best_matched, best_total)) => matched * best_total > best_matched * total,
            };
            if improves {
                best = Some((elr.as_str(), matched, total));
            }
        }
        best.map(|(elr, _, _)| elr)
    }
}

/// One row of a resolved calculation: a contributing concept, its
/// weight, and the facts found for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationContribution<'r> {
    concept: ConceptName,
    weight: Decimal,
    facts: FactSet<'r>,
}

impl<'r> CalculationContribution<'r> {
    pub(crate) const fn new(concept: ConceptName, weight: Decimal, facts: FactSet<'r>) -> Self {
        Self {
            concept,
            weight,
            facts,
        }
    }

    /// The contributing concept.
    #[must_use]
    pub const fn concept(&self) -> &ConceptName {
        &self.concept
    }

    /// The summation weight.
    #[must_use]
    pub const fn weight(&self) -> Decimal {
        self.weight
    }

    /// The facts found for the concept, possibly empty.
    #[must_use]
    pub const fn facts(&self) -> &FactSet<'r> {
        &self.facts
    }

    /// The weight rendered for display: `+`, `-`, or the number itself.
    #[must_use]
    pub fn weight_sign(&self) -> String {
        if self.weight == Decimal::ONE {
            "+".to_owned()
        } else if self.weight == Decimal::NEGATIVE_ONE {
            "-".to_owned()
        } else {
            self.weight.to_string()
        }
    }

    /// The weighted range of true values this row contributes.
    ///
    /// `None` when the row's facts support no common range.
    #[must_use]
    pub fn contribution_interval(&self) -> Option<Interval> {
        Some(self.facts.value_intersection()?.times(self.weight))
    }
}

/// The per-ELR data both checking regimes share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationBinding<'r> {
    elr: String,
    total_fact: &'r Fact,
    total_fact_set: FactSet<'r>,
    rows: Vec<CalculationContribution<'r>>,
}

impl<'r> CalculationBinding<'r> {
    fn any_populated_row(&self) -> bool {
        self.rows.iter().any(|row| !row.facts.is_empty())
    }

    fn all_rows_complete_duplicates(&self) -> bool {
        self.rows.iter().all(|row| row.facts.complete_duplicates())
    }

    /// Sum of first-duplicate rounded values times weights; empty rows
    /// contribute nothing.
    fn calculated_total(&self, mode: RoundingMode) -> Option<Decimal> {
        let mut total = Decimal::ZERO;
        for row in &self.rows {
            if !row.facts.is_consistent() {
                return None;
            }
            let Some(first) = row.facts.first() else {
                continue;
            };
            let rounded = first.rounded_value(mode)?;
            total = total.checked_add(rounded.checked_mul(row.weight)?)?;
        }
        Some(total)
    }

    /// Sum of weighted value intersections; empty rows contribute
    /// nothing, a row with no common range poisons the whole sum.
    fn calculated_total_interval(&self) -> Option<Interval> {
        let mut total = Interval::zero();
        for row in &self.rows {
            if row.facts.is_empty() {
                continue;
            }
            total = total.plus(&row.contribution_interval()?);
        }
        Some(total)
    }
}

/// A calculation resolved for one ELR, ready to deliver a verdict.
///
/// The variant fixes which checking regime the verdict methods apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "version", content = "calculation", rename_all = "snake_case")]
pub enum ResolvedCalculation<'r> {
    /// Checked by rounded-value equality.
    Legacy(CalculationBinding<'r>),

    /// Checked by interval overlap.
    V11(CalculationBinding<'r>),
}

impl<'r> ResolvedCalculation<'r> {
    const fn binding(&self) -> &CalculationBinding<'r> {
        match self {
            Self::Legacy(binding) | Self::V11(binding) => binding,
        }
    }

    /// The arc version this calculation was resolved under.
    #[must_use]
    pub const fn version(&self) -> CalcVersion {
        match self {
            Self::Legacy(_) => CalcVersion::Legacy,
            Self::V11(_) => CalcVersion::V11,
        }
    }

    /// The ELR the calculation came from.
    #[must_use]
    pub fn elr(&self) -> &str {
        &self.binding().elr
    }

    /// The total fact being checked.
    #[must_use]
    pub const fn total_fact(&self) -> &'r Fact {
        self.binding().total_fact
    }

    /// The total fact and its exact-aligned duplicates.
    #[must_use]
    pub const fn total_fact_set(&self) -> &FactSet<'r> {
        &self.binding().total_fact_set
    }

    /// The contribution rows, in arc document order.
    #[must_use]
    pub fn rows(&self) -> &[CalculationContribution<'r>] {
        &self.binding().rows
    }

    /// Whether the calculation binds, making its verdict meaningful.
    ///
    /// Both regimes need at least one populated row. Legacy additionally
    /// requires every row's duplicates to be exact.
    #[must_use]
    pub fn binds(&self) -> bool {
        match self {
            Self::Legacy(binding) => {
                binding.any_populated_row() && binding.all_rows_complete_duplicates()
            }
            Self::V11(binding) => binding.any_populated_row(),
        }
    }

    /// True when a legacy calculation would bind but duplicate
    /// contributors that are not exact duplicates prevent checking it.
    /// Always false for v1.1, which handles duplicates by intersection.
    #[must_use]
    pub fn unchecked(&self) -> bool {
        match self {
            Self::Legacy(binding) => {
                binding.any_populated_row() && !binding.all_rows_complete_duplicates()
            }
            Self::V11(_) => false,
        }
    }

    /// The legacy weighted sum of rounded contributor values.
    ///
    /// `None` for v1.1 calculations and when any row has contradictory
    /// duplicates or a value that cannot be rounded.
    #[must_use]
    pub fn calculated_total(&self) -> Option<Decimal> {
        match self {
            Self::Legacy(binding) => binding.calculated_total(RoundingMode::HalfUp),
            Self::V11(_) => None,
        }
    }

    /// The v1.1 weighted sum of contributor value ranges.
    ///
    /// `None` for legacy calculations and when any populated row
    /// supports no common range.
    #[must_use]
    pub fn calculated_total_interval(&self) -> Option<Interval> {
        match self {
            Self::Legacy(_) => None,
            Self::V11(binding) => binding.calculated_total_interval(),
        }
    }

    /// The verdict.
    ///
    /// Legacy: the calculated total equals the total fact's rounded
    /// value. V1.1: the calculated interval overlaps the range jointly
    /// supported by the total fact and its duplicates. Either way, a
    /// total that cannot be computed is inconsistent.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match self {
            Self::Legacy(binding) => {
                let calculated = binding.calculated_total(RoundingMode::HalfUp);
                let reported = binding.total_fact.rounded_value(RoundingMode::HalfUp);
                match (calculated, reported) {
                    (Some(calculated), Some(reported)) => calculated == reported,
                    _ => false,
                }
            }
            Self::V11(binding) => {
                let (Some(calculated), Some(reported)) = (
                    binding.calculated_total_interval(),
                    binding.total_fact_set.value_intersection(),
                ) else {
                    return false;
                };
                calculated.intersection(&reported).is_some()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn fixture(facts: serde_json::Value, rels: serde_json::Value) -> Report {
        let data = json!({
            "prefixes": {
                "eg": "http://www.example.com",
                "iso4217": "http://www.xbrl.org/2003/iso4217",
                "group": "http://www.example.com/group"
            },
            "concepts": {
                "eg:Total": {"labels": {"std": {"en": "Total"}}},
                "eg:Item1": {"labels": {"std": {"en": "Item 1"}}},
                "eg:Item2": {"labels": {"std": {"en": "Item 2"}}}
            },
            "facts": facts,
            "rels": rels
        });
        Report::new(serde_json::from_value(data).unwrap())
    }

    fn standard_rels() -> serde_json::Value {
        json!({
            "calc": {
                "group": {
                    "eg:Total": [
                        {"t": "eg:Item1", "w": 1},
                        {"t": "eg:Item2", "w": -1}
                    ]
                }
            }
        })
    }

    #[test]
    fn test_calc_version() {
        assert_eq!(CalcVersion::Legacy.arc_role(), "calc");
        assert_eq!(CalcVersion::V11.arc_role(), "calc11");
        assert_eq!(CalcVersion::ALL, [CalcVersion::Legacy, CalcVersion::V11]);
        assert_eq!(format!("{}", CalcVersion::Legacy), "legacy");
        assert_eq!(format!("{}", CalcVersion::V11), "v1.1");
    }

    #[test]
    fn test_weight_sign() {
        let plus = CalculationContribution::new(
            ConceptName::from("eg:Item1"),
            Decimal::ONE,
            FactSet::default(),
        );
        assert_eq!(plus.weight_sign(), "+");

        let minus = CalculationContribution::new(
            ConceptName::from("eg:Item1"),
            Decimal::NEGATIVE_ONE,
            FactSet::default(),
        );
        assert_eq!(minus.weight_sign(), "-");

        let half = CalculationContribution::new(
            ConceptName::from("eg:Item1"),
            dec("0.5"),
            FactSet::default(),
        );
        assert_eq!(half.weight_sign(), "0.5");
    }

    #[test]
    fn test_contribution_interval_weighting() {
        let report = fixture(
            json!({
                "f1": {"v": 2000, "d": -3, "a": {"c": "eg:Item2", "u": "iso4217:USD"}}
            }),
            json!({}),
        );
        let fact = report.fact("f1").unwrap();
        let row = CalculationContribution::new(
            ConceptName::from("eg:Item2"),
            Decimal::NEGATIVE_ONE,
            FactSet::new(vec![fact]),
        );
        assert_eq!(
            row.contribution_interval(),
            Some(Interval::new(dec("-2500"), dec("-1500")).unwrap())
        );

        let empty = CalculationContribution::new(
            ConceptName::from("eg:Item1"),
            Decimal::ONE,
            FactSet::default(),
        );
        assert!(empty.contribution_interval().is_none());
    }

    #[test]
    fn test_resolution_rows_follow_arc_order() {
        let report = fixture(
            json!({
                "f1": {"v": 10000, "d": -3, "a": {"c": "eg:Total", "u": "iso4217:USD"}},
                "f2": {"v": 12000, "d": -3, "a": {"c": "eg:Item1", "u": "iso4217:USD"}},
                "f3": {"v": 2000, "d": -3, "a": {"c": "eg:Item2", "u": "iso4217:USD"}}
            }),
            standard_rels(),
        );
        let fact = report.fact("f1").unwrap();
        let calc = report.calculation(fact, CalcVersion::Legacy);
        let resolved = calc.resolved_calculation("group").unwrap();
        let concepts: Vec<_> = resolved
            .rows()
            .iter()
            .map(|row| row.concept().as_str())
            .collect();
        assert_eq!(concepts, ["eg:Item1", "eg:Item2"]);
        assert_eq!(resolved.elr(), "group");
        assert_eq!(resolved.total_fact().id().as_str(), "f1");
        assert_eq!(resolved.total_fact_set().len(), 1);
    }

    #[test]
    fn test_resolved_calculation_unknown_elr() {
        let report = fixture(
            json!({
                "f1": {"v": 10000, "d": -3, "a": {"c": "eg:Total", "u": "iso4217:USD"}}
            }),
            standard_rels(),
        );
        let fact = report.fact("f1").unwrap();
        let calc = report.calculation(fact, CalcVersion::Legacy);
        assert!(calc.resolved_calculation("other-group").is_none());
    }

    #[test]
    fn test_has_calculations_requires_populated_row() {
        let report = fixture(
            json!({
                "f1": {"v": 10000, "d": -3, "a": {"c": "eg:Total", "u": "iso4217:USD"}},
                "f2": {"v": 12000, "d": -3, "a": {"c": "eg:Item1", "u": "iso4217:USD"}}
            }),
            standard_rels(),
        );
        let total = report.fact("f1").unwrap();
        assert!(report
            .calculation(total, CalcVersion::Legacy)
            .has_calculations());
        // Arcs exist for the total's concept only; a contributor has none
        let contributor = report.fact("f2").unwrap();
        assert!(!report
            .calculation(contributor, CalcVersion::Legacy)
            .has_calculations());
        assert!(!report
            .calculation(contributor, CalcVersion::V11)
            .has_calculations());
        // No calc11 arcs anywhere
        assert!(!report.calculation(total, CalcVersion::V11).has_calculations());
    }

    #[test]
    fn test_resolved_calculations_skip_unpopulated_elrs() {
        let report = fixture(
            json!({
                "f1": {"v": 10000, "d": -3, "a": {"c": "eg:Total", "u": "iso4217:USD"}},
                "f2": {"v": 12000, "d": -3, "a": {"c": "eg:Item1", "u": "iso4217:USD"}}
            }),
            json!({
                "calc": {
                    "group": {
                        "eg:Total": [{"t": "eg:Item1", "w": 1}]
                    },
                    "orphan-group": {
                        "eg:Total": [{"t": "eg:Item2", "w": 1}]
                    }
                }
            }),
        );
        let fact = report.fact("f1").unwrap();
        let calc = report.calculation(fact, CalcVersion::Legacy);
        let resolved = calc.resolved_calculations();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].elr(), "group");
        // The unpopulated ELR is still recorded in the resolution map
        assert_eq!(calc.calculation_facts().len(), 2);
    }

    #[test]
    fn test_best_elr_prefers_higher_match_fraction() {
        let report = fixture(
            json!({
                "f1": {"v": 10000, "d": -3, "a": {"c": "eg:Total", "u": "iso4217:USD"}},
                "f2": {"v": 12000, "d": -3, "a": {"c": "eg:Item1", "u": "iso4217:USD"}},
                "f3": {"v": 2000, "d": -3, "a": {"c": "eg:Item2", "u": "iso4217:USD"}}
            }),
            json!({
                "calc": {
                    "both-items": {
                        "eg:Total": [
                            {"t": "eg:Item1", "w": 1},
                            {"t": "eg:Item2", "w": 1}
                        ]
                    },
                    "item2-only": {
                        "eg:Total": [{"t": "eg:Item2", "w": 1}]
                    }
                }
            }),
        );
        let fact = report.fact("f1").unwrap();
        let calc = report.calculation(fact, CalcVersion::Legacy);

        // f2 matches one of two concepts in the first ELR (1/2), none in
        // the second (0/1)
        let best = calc.best_elr_for_fact_set(&[FactId::from("f2")]);
        assert_eq!(best, Some("both-items"));

        // f3 matches 1/2 in the first and 1/1 in the second
        let best = calc.best_elr_for_fact_set(&[FactId::from("f3")]);
        assert_eq!(best, Some("item2-only"));

        // No matches at all: equal scores keep the earlier ELR
        let best = calc.best_elr_for_fact_set(&[FactId::from("f9")]);
        assert_eq!(best, Some("both-items"));
    }

    #[test]
    fn test_best_elr_with_no_candidates() {
        let report = fixture(
            json!({
                "f2": {"v": 12000, "d": -3, "a": {"c": "eg:Item1", "u": "iso4217:USD"}}
            }),
            standard_rels(),
        );
        // A contributor resolves no facts in any ELR
        let fact = report.fact("f2").unwrap();
        let calc = report.calculation(fact, CalcVersion::Legacy);
        assert!(calc.best_elr_for_fact_set(&[FactId::from("f2")]).is_none());
    }

    #[test]
    fn test_version_tag_in_serialized_form() {
        let report = fixture(
            json!({
                "f1": {"v": 10000, "d": -3, "a": {"c": "eg:Total", "u": "iso4217:USD"}},
                "f2": {"v": 12000, "d": -3, "a": {"c": "eg:Item1", "u": "iso4217:USD"}}
            }),
            json!({
                "calc11": {
                    "group": {
                        "eg:Total": [{"t": "eg:Item1", "w": 1}]
                    }
                }
            }),
        );
        let fact = report.fact("f1").unwrap();
        let calc = report.calculation(fact, CalcVersion::V11);
        let resolved = calc.resolved_calculation("group").unwrap();
        assert_eq!(resolved.version(), CalcVersion::V11);
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["version"], "v11");
        assert_eq!(json["calculation"]["elr"], "group");
    }

    #[test]
    fn test_unparseable_contributor_value() {
        let report = fixture(
            json!({
                "f1": {"v": 10000, "d": -3, "a": {"c": "eg:Total", "u": "iso4217:USD"}},
                "f2": {"v": "not a number", "d": -3, "a": {"c": "eg:Item1", "u": "iso4217:USD"}}
            }),
            standard_rels(),
        );
        let fact = report.fact("f1").unwrap();
        let resolved = report
            .calculation(fact, CalcVersion::Legacy)
            .resolved_calculation("group")
            .unwrap();
        assert!(resolved.calculated_total().is_none());
        assert!(!resolved.is_consistent());
    }
}
