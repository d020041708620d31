use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use rust_decimal::Decimal;

use crate::{AverageMass, Element, Isotope, Massive, MonoisotopicMass};

use super::{
    atomic_database::{AtomicDatabase, ElementDescription},
    errors::AtomicLookupError,
};

impl<'a> Element<'a> {
    pub(crate) fn new(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
    ) -> Result<Self, AtomicLookupError> {
        let symbol = symbol.as_ref();
        let (symbol, ElementDescription { name, isotopes }) = db
            .elements
            .get_key_value(symbol)
            .ok_or_else(|| AtomicLookupError::element(symbol))?;

        let element = Self {
            symbol,
            name,
            isotopes,
        };

        if element.abundances().next().is_none() {
            return Err(AtomicLookupError::abundance(symbol, name, isotopes));
        }

        Ok(element)
    }

    pub const fn symbol(&self) -> &'a str {
        self.symbol
    }

    pub const fn name(&self) -> &'a str {
        self.name
    }

    // Elements without any natural abundance data fall back to their sole reference isotope
    fn abundances(&self) -> impl Iterator<Item = (&Isotope, Decimal)> {
        let naturally_occurring = self
            .isotopes
            .values()
            .filter_map(|i| i.abundance.map(|abundance| (i, abundance)));
        let reference = self
            .isotopes
            .values()
            .exactly_one()
            .ok()
            .filter(|i| i.abundance.is_none())
            .map(|i| (i, Decimal::ONE));
        naturally_occurring.chain(reference)
    }
}

impl Display for Element<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl Massive for Element<'_> {
    fn monoisotopic_mass(&self) -> MonoisotopicMass {
        // NOTE: `Element::new()` guarantees at least one weighted isotope, so the fallback is never used
        self.abundances()
            .max_by_key(|&(_, abundance)| abundance)
            .map_or_else(MonoisotopicMass::default, |(i, _)| {
                MonoisotopicMass(i.relative_mass)
            })
    }

    fn average_mass(&self) -> AverageMass {
        AverageMass(
            self.abundances()
                .map(|(i, abundance)| i.relative_mass * abundance)
                .sum(),
        )
    }
}
