use std::{collections::hash_map::Entry, str::FromStr};

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use knuffel::Decode;
use miette::{Diagnostic, Result};
use molmass::{Count, OffsetKind};
use thiserror::Error;

// Local Crate Imports
use crate::Ion;

// Public API ==========================================================================================================

/// Shorthand names for common solvents and acids, like `ACN` or `FA`, mapped to their elemental formulae
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AbbreviationTable {
    abbreviations: HashMap<String, String>,
}

impl AbbreviationTable {
    pub const DEFAULT_KDL: &'static str = include_str!("../abbreviations.kdl");

    pub fn new(file_name: impl AsRef<str>, kdl_text: impl AsRef<str>) -> Result<Self> {
        let parsed_table: AbbreviationTableKdl =
            knuffel::parse(file_name.as_ref(), kdl_text.as_ref())?;

        let mut abbreviations = HashMap::with_capacity(parsed_table.abbreviations.len());
        for AbbreviationKdl {
            abbreviation: Identifier(abbreviation),
            formula,
        } in parsed_table.abbreviations
        {
            match abbreviations.entry(abbreviation) {
                Entry::Occupied(e) => {
                    return Err(AbbreviationError::Duplicate(e.key().clone()).into());
                }
                Entry::Vacant(e) => e.insert(formula),
            };
        }

        Ok(Self { abbreviations })
    }

    pub fn len(&self) -> usize {
        self.abbreviations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abbreviations.is_empty()
    }

    pub fn get(&self, abbreviation: &str) -> Option<&str> {
        self.abbreviations.get(abbreviation).map(String::as_str)
    }

    /// Replaces a known abbreviation with its formula, passing anything else through unchanged
    pub fn expand<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.get(identifier).unwrap_or(identifier)
    }

    /// Splits a signed ion token, like `+2ACN`, and expands its identifier
    ///
    /// # Panics
    ///
    /// If `token` doesn't start with a `+` or `-`. Tokens produced by the adduct grammar always do.
    pub fn normalize<'a>(&'a self, token: &'a str) -> Ion<'a> {
        let (kind, count, identifier) = split_ion(token);
        Ion {
            kind,
            count,
            formula: self.expand(identifier),
        }
    }
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        // SAFETY: The built-in table is checked by the tests below, so this can't fail at runtime
        Self::new("abbreviations.kdl", Self::DEFAULT_KDL).unwrap()
    }
}

// Ion Token Splitting =================================================================================================

// Leading digits that don't make a valid count (zero, or too large for a `u32`) are left as part of the identifier
fn split_ion(token: &str) -> (OffsetKind, Count, &str) {
    let (kind, rest) = match token.split_at_checked(1) {
        Some(("+", rest)) => (OffsetKind::Add, rest),
        Some(("-", rest)) => (OffsetKind::Remove, rest),
        _ => unreachable!("ion tokens always start with '+' or '-', but got {token:?}"),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, identifier) = rest.split_at(digits_end);

    match digits.parse().ok().and_then(Count::new) {
        Some(count) => (kind, count, identifier),
        None => (kind, Count::default(), rest),
    }
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
struct AbbreviationTableKdl {
    #[knuffel(child, unwrap(children))]
    abbreviations: Vec<AbbreviationKdl>,
}

#[derive(Debug, Decode)]
struct AbbreviationKdl {
    #[knuffel(node_name)]
    abbreviation: Identifier,
    #[knuffel(argument)]
    formula: String,
}

#[derive(Debug)]
struct Identifier(String);

impl FromStr for Identifier {
    type Err = AbbreviationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let starts_with_letter = s.starts_with(|c: char| c.is_ascii_alphabetic());
        if starts_with_letter && s.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(AbbreviationError::InvalidIdentifier(s.to_owned()))
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum AbbreviationError {
    #[error(
        "expected an ASCII letter followed by any number of ASCII letters or digits, got {0:?}"
    )]
    InvalidIdentifier(String),

    #[diagnostic(help("each abbreviation may only be defined once"))]
    #[error("the abbreviation {0:?} was defined more than once")]
    Duplicate(String),
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use insta::assert_snapshot;

    use super::*;

    fn count(n: u32) -> Count {
        Count::new(n).unwrap()
    }

    #[test]
    fn default_table() {
        let table = AbbreviationTable::default();
        assert_eq!(table.len(), 8);
        assert!(!table.is_empty());
        assert_eq!(table.get("ACN"), Some("CH3CN"));
        assert_eq!(table.get("DMSO"), Some("C2H6OS"));
        assert_eq!(table.get("FA"), Some("CH2O2"));
        assert_eq!(table.get("HAc"), Some("CH3COOH"));
        assert_eq!(table.get("Hac"), Some("CH3COOH"));
        assert_eq!(table.get("TFA"), Some("C2HF3O2"));
        assert_eq!(table.get("IsoProp"), Some("CH3CHOHCH3"));
        assert_eq!(table.get("MeOH"), Some("CH3OH"));
        // Lookups are case-sensitive
        assert_eq!(table.get("acn"), None);
        assert_eq!(table.get("HAC"), None);
    }

    #[test]
    fn custom_table() {
        let kdl = indoc! {r#"
            abbreviations {
              EtOH "C2H5OH"
              NH4 "NH4"
            }
        "#};
        let table = AbbreviationTable::new("custom.kdl", kdl).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.expand("EtOH"), "C2H5OH");
        assert_eq!(table.expand("ACN"), "ACN");

        let empty = AbbreviationTable::new("empty.kdl", "abbreviations").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn invalid_tables() {
        let duplicate = indoc! {r#"
            abbreviations {
              FA "CH2O2"
              FA "HCOOH"
            }
        "#};
        let error = AbbreviationTable::new("test", duplicate).unwrap_err();
        assert_snapshot!(error, @r#"the abbreviation "FA" was defined more than once"#);

        // Abbreviations can't start with a count
        assert!(AbbreviationTable::new("test", r#"abbreviations { 2FA "C2H4O4"; }"#).is_err());
        // Formulae are required
        assert!(AbbreviationTable::new("test", "abbreviations { FA; }").is_err());
        assert!(AbbreviationTable::new("test", "").is_err());
    }

    #[test]
    fn identifier_from_str() {
        assert!(Identifier::from_str("IsoProp").is_ok());
        assert!(Identifier::from_str("C2H6OS").is_ok());
        assert_eq!(
            Identifier::from_str("2FA").unwrap_err(),
            AbbreviationError::InvalidIdentifier("2FA".to_owned())
        );
        assert!(Identifier::from_str("").is_err());
        assert!(Identifier::from_str("Me-OH").is_err());
    }

    #[test]
    fn test_split_ion() {
        // Signs
        assert_eq!(split_ion("+H"), (OffsetKind::Add, count(1), "H"));
        assert_eq!(split_ion("-H2O"), (OffsetKind::Remove, count(1), "H2O"));
        // Counts
        assert_eq!(split_ion("+2Na"), (OffsetKind::Add, count(2), "Na"));
        assert_eq!(split_ion("-12H"), (OffsetKind::Remove, count(12), "H"));
        assert_eq!(split_ion("+3ACN"), (OffsetKind::Add, count(3), "ACN"));
        // A count with nothing after it
        assert_eq!(split_ion("+2"), (OffsetKind::Add, count(2), ""));
        // Leading zeroes are ignored
        assert_eq!(split_ion("+02H"), (OffsetKind::Add, count(2), "H"));
        assert_eq!(split_ion("-007Na"), (OffsetKind::Remove, count(7), "Na"));
        // Invalid counts stay with the identifier
        assert_eq!(split_ion("+0H"), (OffsetKind::Add, count(1), "0H"));
        assert_eq!(split_ion("+00H"), (OffsetKind::Add, count(1), "00H"));
        assert_eq!(
            split_ion("+99999999999H"),
            (OffsetKind::Add, count(1), "99999999999H")
        );
    }

    #[test]
    #[should_panic(expected = "ion tokens always start with '+' or '-'")]
    fn split_unsigned_ion() {
        split_ion("H2O");
    }

    #[test]
    fn test_normalize() {
        let table = AbbreviationTable::default();
        let ion = |kind, count, formula| Ion {
            kind,
            count,
            formula,
        };
        assert_eq!(table.normalize("+FA"), ion(OffsetKind::Add, count(1), "CH2O2"));
        assert_eq!(
            table.normalize("-2ACN"),
            ion(OffsetKind::Remove, count(2), "CH3CN")
        );
        assert_eq!(
            table.normalize("+IsoProp"),
            ion(OffsetKind::Add, count(1), "CH3CHOHCH3")
        );
        // Unknown identifiers pass through untouched
        assert_eq!(table.normalize("+Na"), ion(OffsetKind::Add, count(1), "Na"));
        assert_eq!(table.normalize("-Qx"), ion(OffsetKind::Remove, count(1), "Qx"));
        // Abbreviations are only expanded when they make up the whole identifier
        assert_eq!(table.normalize("+FA2"), ion(OffsetKind::Add, count(1), "FA2"));
    }
}
