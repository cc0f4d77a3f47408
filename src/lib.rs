//! # Crossfoot - Calculation Consistency for Inline XBRL Reports
//!
//! Crossfoot loads the JSON data extract of an Inline XBRL report and
//! checks its summation ("calculation") relationships: does each reported
//! total agree with the weighted sum of its contributing facts, once the
//! stated rounding of every value is taken into account?
//!
//! ## Core Concepts
//!
//! - **Fact**: A reported value with aspects (concept, entity, period, unit,
//!   dimensions) and a stated decimal precision
//! - **Interval**: The closed range of true values a rounded fact could have
//!   been produced from, in exact decimal arithmetic
//! - **FactSet**: The aligned duplicates of one datapoint, with their joint
//!   value intersection
//! - **ResolvedCalculation**: One total's calculation in one extended link
//!   role, carrying a consistency verdict under legacy (rounded-equality) or
//!   v1.1 (interval-overlap) rules
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crossfoot::{CalcVersion, Report};
//!
//! let report = Report::parse(&std::fs::read_to_string("report.json")?)?;
//! let total = report.fact("f1").unwrap();
//!
//! for resolved in report.calculation(total, CalcVersion::V11).resolved_calculations() {
//!     println!(
//!         "{}: consistent={} calculated={:?}",
//!         resolved.elr(),
//!         resolved.is_consistent(),
//!         resolved.calculated_total_interval(),
//!     );
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Value model
pub mod aspect;
pub mod concept;
pub mod error;
pub mod fact;
pub mod factset;
pub mod interval;
pub mod period;
pub mod qname;

// Loading and resolution
pub mod calculation;
pub mod report;

// Re-export primary types at crate root for convenience
pub use aspect::{Aspect, AspectFilter, AspectName, AspectValue, Covered};
pub use calculation::{
    CalcVersion, Calculation, CalculationBinding, CalculationContribution, ResolvedCalculation,
};
pub use concept::{ConceptData, ConceptName};
pub use error::{CrossfootError, CrossfootResult, ValidationError};
pub use fact::{round_decimal, Fact, FactId, Precision, RoundingMode};
pub use factset::{deduplicate, FactSet};
pub use interval::Interval;
pub use period::Period;
pub use qname::{QName, NAMESPACE_ISO4217};
pub use report::{FactData, RelationshipData, Report, ReportData};
