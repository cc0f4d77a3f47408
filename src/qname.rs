//! Prefixed names and namespace resolution.
//!
//! Report data refers to concepts, units and dimension members by
//! `prefix:localname` strings. The prefix map at the top of a report binds
//! each prefix to a namespace URI; resolving a name against that map yields
//! a [`QName`] whose namespace can be inspected, most importantly to
//! recognise ISO 4217 currency units.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The namespace URI of ISO 4217 currency units.
pub const NAMESPACE_ISO4217: &str = "http://www.xbrl.org/2003/iso4217";

/// A namespace-resolved prefixed name.
///
/// # Examples
///
/// ```
/// use crossfoot::QName;
/// use indexmap::IndexMap;
///
/// let mut prefixes = IndexMap::new();
/// prefixes.insert(
///     "iso4217".to_owned(),
///     "http://www.xbrl.org/2003/iso4217".to_owned(),
/// );
/// let unit = QName::parse(&prefixes, "iso4217:USD").unwrap();
/// assert_eq!(unit.localname, "USD");
/// assert!(unit.is_iso4217());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    /// The prefix part of the name.
    pub prefix: String,

    /// The local part of the name.
    pub localname: String,

    /// The namespace URI the prefix resolves to.
    pub namespace: String,
}

impl QName {
    /// Resolves a `prefix:localname` string against a prefix map.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingPrefixSeparator` if the name has no
    /// `:`, or `ValidationError::UnknownPrefix` if the prefix is not bound
    /// in the map.
    pub fn parse(prefixes: &IndexMap<String, String>, name: &str) -> Result<Self, ValidationError> {
        let Some((prefix, localname)) = name.split_once(':') else {
            return Err(ValidationError::MissingPrefixSeparator {
                name: name.to_owned(),
            });
        };
        let Some(namespace) = prefixes.get(prefix) else {
            return Err(ValidationError::UnknownPrefix {
                prefix: prefix.to_owned(),
                name: name.to_owned(),
            });
        };
        Ok(Self {
            prefix: prefix.to_owned(),
            localname: localname.to_owned(),
            namespace: namespace.clone(),
        })
    }

    /// True if the namespace is the ISO 4217 currency namespace.
    #[must_use]
    pub fn is_iso4217(&self) -> bool {
        self.namespace == NAMESPACE_ISO4217
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prefix, self.localname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        map.insert("eg".to_owned(), "http://www.example.com/".to_owned());
        map.insert("iso4217".to_owned(), NAMESPACE_ISO4217.to_owned());
        map
    }

    #[test]
    fn test_qname_parse() {
        let q = QName::parse(&prefixes(), "eg:Concept1").unwrap();
        assert_eq!(q.prefix, "eg");
        assert_eq!(q.localname, "Concept1");
        assert_eq!(q.namespace, "http://www.example.com/");
    }

    #[test]
    fn test_qname_parse_missing_separator() {
        let err = QName::parse(&prefixes(), "Concept1").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingPrefixSeparator { .. }
        ));
    }

    #[test]
    fn test_qname_parse_unknown_prefix() {
        let err = QName::parse(&prefixes(), "zz:Concept1").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownPrefix { .. }));
    }

    #[test]
    fn test_qname_localname_keeps_extra_colons() {
        // Only the first colon separates prefix from localname
        let q = QName::parse(&prefixes(), "eg:a:b").unwrap();
        assert_eq!(q.prefix, "eg");
        assert_eq!(q.localname, "a:b");
    }

    #[test]
    fn test_qname_is_iso4217() {
        let usd = QName::parse(&prefixes(), "iso4217:USD").unwrap();
        assert!(usd.is_iso4217());
        let concept = QName::parse(&prefixes(), "eg:Concept1").unwrap();
        assert!(!concept.is_iso4217());
    }

    #[test]
    fn test_qname_display() {
        let q = QName::parse(&prefixes(), "iso4217:GBP").unwrap();
        assert_eq!(format!("{q}"), "iso4217:GBP");
    }
}
