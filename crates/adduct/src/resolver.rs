//! Turns parsed adducts into parent multipliers and correction masses, using exact decimal arithmetic

use std::sync::LazyLock;

// External Crate Imports
use molmass::{AtomicDatabase, ChemicalComposition, Massive, MolmassError, Particle};
use rust_decimal::{Decimal, prelude::ToPrimitive};

// Local Crate Imports
use crate::{Adduct, Result, errors::AdductError, normalizer::AbbreviationTable};

static DEFAULT_ATOMIC_DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);
pub(crate) static DEFAULT_ABBREVIATIONS: LazyLock<AbbreviationTable> =
    LazyLock::new(AbbreviationTable::default);

// Formula Mass Lookup =================================================================================================

/// Something that can turn chemical formulae into monoisotopic masses
pub trait MassLookup {
    fn monoisotopic_mass(&self, formula: &str) -> Result<Decimal, MolmassError>;
    fn electron_mass(&self) -> Result<Decimal, MolmassError>;
}

impl MassLookup for AtomicDatabase {
    fn monoisotopic_mass(&self, formula: &str) -> Result<Decimal, MolmassError> {
        let composition = ChemicalComposition::new(self, formula).map_err(|e| *e)?;
        Ok(composition.monoisotopic_mass().into())
    }

    fn electron_mass(&self) -> Result<Decimal, MolmassError> {
        let electron = Particle::new(self, "e")?;
        Ok(electron.monoisotopic_mass().into())
    }
}

// Resolved Masses =====================================================================================================

/// Converts between the m/z of an observed ion and the mass of its neutral parent molecule:
/// `precursor_mz = multiplier * parent_mass + correction_mass`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResolvedMass {
    multiplier: Decimal,
    correction_mass: Decimal,
}

impl ResolvedMass {
    pub const fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    pub const fn correction_mass(&self) -> Decimal {
        self.correction_mass
    }

    pub fn to_f64(&self) -> Option<(f64, f64)> {
        Some((self.multiplier.to_f64()?, self.correction_mass.to_f64()?))
    }

    pub fn precursor_mz(&self, parent_mass: Decimal) -> Decimal {
        self.multiplier * parent_mass + self.correction_mass
    }

    pub fn parent_mass(&self, precursor_mz: Decimal) -> Decimal {
        (precursor_mz - self.correction_mass) / self.multiplier
    }
}

// Adduct Resolution ===================================================================================================

#[derive(Debug)]
pub struct AdductResolver<'a, L = AtomicDatabase> {
    lookup: &'a L,
    abbreviations: &'a AbbreviationTable,
}

impl<'a, L: MassLookup> AdductResolver<'a, L> {
    pub const fn new(lookup: &'a L, abbreviations: &'a AbbreviationTable) -> Self {
        Self {
            lookup,
            abbreviations,
        }
    }

    pub fn resolve(&self, adduct: &str) -> Result<ResolvedMass> {
        let adduct = Adduct::with_abbreviations(adduct, self.abbreviations)?;
        self.resolve_adduct(&adduct)
    }

    pub fn resolve_adduct(&self, adduct: &Adduct) -> Result<ResolvedMass> {
        let ion_masses: Decimal = adduct
            .ions()
            .iter()
            .map(|ion| -> Result<Decimal> {
                let mass = self
                    .lookup
                    .monoisotopic_mass(ion.formula())
                    .map_err(|e| AdductError::unrecognized_formula(adduct.text(), ion.formula(), e))?;
                Ok(ion.kind().offset(Decimal::from(ion.count()) * mass))
            })
            .sum::<Result<_>>()?;

        let electron_mass = self.lookup.electron_mass().map_err(AdductError::ElectronMass)?;
        let charge = Decimal::from(adduct.charge());
        let added_mass = ion_masses + electron_mass * -charge;

        let multiplier = Decimal::from(adduct.parent_multiplier()) / charge.abs();
        let correction_mass = added_mass / charge.abs();
        Ok(ResolvedMass {
            multiplier,
            correction_mass,
        })
    }
}

impl Default for AdductResolver<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_ATOMIC_DB, &DEFAULT_ABBREVIATIONS)
    }
}

// Module Tests ========================================================================================================
