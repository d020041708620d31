use ahash::HashMap;
use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

use crate::{Isotope, MassNumber};

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum AtomicLookupError {
    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error("the element {0:?} could not be found in the supplied atomic database")]
    Element(String),

    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error("the particle {0:?} could not be found in the supplied atomic database")]
    Particle(String),

    #[diagnostic(help(
        "a monoisotopic mass needs at least one isotope with a natural abundance, or a single reference isotope, \
        consider adjusting the atomic database"
    ))]
    #[error(
        "no natural abundance data could be found for {0} ({1}), though the following isotopes were found: {2}"
    )]
    Abundance(String, String, String),
}

impl AtomicLookupError {
    pub(crate) fn element(symbol: &str) -> Self {
        Self::Element(symbol.to_owned())
    }

    pub(crate) fn particle(symbol: &str) -> Self {
        Self::Particle(symbol.to_owned())
    }

    pub(crate) fn abundance(
        symbol: &str,
        name: &str,
        isotopes: &HashMap<MassNumber, Isotope>,
    ) -> Self {
        let isotopes = format!("[{}]", isotopes.keys().sorted().join(", "));
        Self::Abundance(name.to_owned(), symbol.to_owned(), isotopes)
    }
}
