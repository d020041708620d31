use std::fmt::{self, Display, Formatter};

// External Crate Imports
use nom_miette::final_parser;

// Local Crate Imports
use crate::{
    AtomicDatabase, AverageMass, ChemicalComposition, Element, Massive, MonoisotopicMass, Result,
    parsers::chemical_composition::chemical_composition,
};

// Public API ==========================================================================================================

impl<'a> ChemicalComposition<'a> {
    pub fn new(db: &'a AtomicDatabase, formula: impl AsRef<str>) -> Result<Self> {
        let mut parser = final_parser(chemical_composition(db));
        parser(formula.as_ref()).map_err(|e| Box::new(e.into()))
    }

    pub fn elements(&self) -> impl Iterator<Item = (&Element<'a>, u32)> {
        self.chemical_formula
            .iter()
            .map(|(element, count)| (element, count.get()))
    }
}

// Trait Implementations ===============================================================================================

impl Massive for ChemicalComposition<'_> {
    fn monoisotopic_mass(&self) -> MonoisotopicMass {
        self.chemical_formula
            .iter()
            .map(|&(ref element, count)| count * element.monoisotopic_mass())
            .sum()
    }

    fn average_mass(&self) -> AverageMass {
        self.chemical_formula
            .iter()
            .map(|&(ref element, count)| count * element.average_mass())
            .sum()
    }
}

impl Display for ChemicalComposition<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for &(ref element, count) in &self.chemical_formula {
            write!(f, "{element}{count}")?;
        }
        Ok(())
    }
}

// Module Tests ========================================================================================================
