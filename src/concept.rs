//! Taxonomy concepts and their metadata.
//!
//! The report's concept map carries the per-concept metadata needed for
//! presentation and aspect resolution: labels keyed by role and language,
//! the dimension kind for dimension concepts, and enumeration and text
//! block markers.

use std::borrow::Borrow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The prefixed name of a taxonomy concept.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptName(String);

impl ConceptName {
    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConceptName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for ConceptName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<ConceptName> for String {
    fn from(name: ConceptName) -> Self {
        name.0
    }
}

impl Borrow<str> for ConceptName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConceptName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata attached to a concept in the report's taxonomy extract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptData {
    /// Labels keyed by role, then by language.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    labels: HashMap<String, HashMap<String, String>>,

    /// Dimension kind: `"e"` for explicit, `"t"` for typed.
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    dimension_kind: Option<String>,

    /// True for extensible enumeration concepts.
    #[serde(rename = "e", default, skip_serializing_if = "is_false")]
    enumeration: bool,

    /// True for text block concepts.
    #[serde(rename = "t", default, skip_serializing_if = "is_false")]
    text_block: bool,

    /// Reference data, passed through untouched.
    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    references: Option<serde_json::Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(flag: &bool) -> bool {
    !flag
}

impl ConceptData {
    /// Looks up a label by role and language.
    ///
    /// Falls back from the requested language to `en` and then `en-us`.
    #[must_use]
    pub fn label(&self, role: &str, lang: &str) -> Option<&str> {
        let by_lang = self.labels.get(role)?;
        by_lang
            .get(lang)
            .or_else(|| by_lang.get("en"))
            .or_else(|| by_lang.get("en-us"))
            .map(String::as_str)
    }

    /// True for explicit dimension concepts.
    #[must_use]
    pub fn is_explicit_dimension(&self) -> bool {
        self.dimension_kind.as_deref() == Some("e")
    }

    /// True for typed dimension concepts.
    #[must_use]
    pub fn is_typed_dimension(&self) -> bool {
        self.dimension_kind.as_deref() == Some("t")
    }

    /// True for any dimension concept.
    #[must_use]
    pub fn is_dimension(&self) -> bool {
        self.dimension_kind.is_some()
    }

    /// True for extensible enumeration concepts.
    #[must_use]
    pub const fn is_enumeration(&self) -> bool {
        self.enumeration
    }

    /// True for text block concepts.
    #[must_use]
    pub const fn is_text_block(&self) -> bool {
        self.text_block
    }

    /// The raw reference data, if any.
    #[must_use]
    pub const fn references(&self) -> Option<&serde_json::Value> {
        self.references.as_ref()
    }
}
