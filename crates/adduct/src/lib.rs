//! Interprets mass spectrometry adduct notation, like `[M+H]+` or `[2M+Na-H2O]2+`, turning it into the multiplier and
//! mass correction that relate an observed m/z to the mass of the neutral parent molecule

pub mod errors;
mod grammar;
pub mod normalizer;
pub mod resolver;

use std::fmt::{self, Display, Formatter};

// External Crate Imports
use molmass::{Charge, Count, OffsetKind};
use tracing::warn;

// Local Crate Imports
use grammar::AdductTokens;
use resolver::DEFAULT_ABBREVIATIONS;

pub use errors::{AdductError, Result};
pub use normalizer::AbbreviationTable;
pub use resolver::{AdductResolver, MassLookup, ResolvedMass};

// Public API ==========================================================================================================

/// Resolves `adduct` with the built-in atomic database and abbreviations, returning `(multiplier, correction_mass)`
///
/// Adducts that can't be interpreted are logged as a warning and give `(None, None)`
pub fn multiplier_and_correction(adduct: &str) -> (Option<f64>, Option<f64>) {
    match AdductResolver::default().resolve(adduct) {
        Ok(resolved) => resolved.to_f64().unzip(),
        Err(error) => {
            warn!("{error}");
            (None, None)
        }
    }
}

// NOTE: 'a lifetimes borrow from both the adduct text and the `AbbreviationTable` used to normalize it
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Adduct<'a> {
    text: &'a str,
    parent_multiplier: Count,
    ions: Vec<Ion<'a>>,
    charge: Charge,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ion<'a> {
    kind: OffsetKind,
    count: Count,
    formula: &'a str,
}

impl<'a> Adduct<'a> {
    pub fn new(text: &'a str) -> Result<Self> {
        Self::with_abbreviations(text, &DEFAULT_ABBREVIATIONS)
    }

    pub fn with_abbreviations(text: &'a str, abbreviations: &'a AbbreviationTable) -> Result<Self> {
        let AdductTokens {
            parent_multiplier,
            ions,
            charge,
        } = grammar::tokenize(text)?;
        let ions = ions
            .into_iter()
            .map(|token| abbreviations.normalize(token))
            .collect();

        Ok(Self {
            text,
            parent_multiplier,
            ions,
            charge,
        })
    }

    pub const fn text(&self) -> &'a str {
        self.text
    }

    pub const fn parent_multiplier(&self) -> Count {
        self.parent_multiplier
    }

    pub fn ions(&self) -> &[Ion<'a>] {
        &self.ions
    }

    pub const fn charge(&self) -> Charge {
        self.charge
    }
}

impl<'a> Ion<'a> {
    pub const fn kind(&self) -> OffsetKind {
        self.kind
    }

    pub const fn count(&self) -> Count {
        self.count
    }

    pub const fn formula(&self) -> &'a str {
        self.formula
    }
}

// Display Implementations =============================================================================================

impl Display for Adduct<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}M", self.parent_multiplier)?;
        for ion in &self.ions {
            write!(f, "{ion}")?;
        }

        let magnitude = i64::from(self.charge.abs());
        let sign = if self.charge.is_negative() { '-' } else { '+' };
        if magnitude > 1 {
            write!(f, "]{magnitude}{sign}")
        } else {
            write!(f, "]{sign}")
        }
    }
}

impl Display for Ion<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind, self.count, self.formula)
    }
}

// Module Tests ========================================================================================================
