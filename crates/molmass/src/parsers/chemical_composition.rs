// External Crate Imports
use nom::{
    Parser,
    combinator::{opt, recognize},
    multi::many1,
    sequence::pair,
};
use nom_miette::{map_res, wrap_err};

// Local Crate Imports
use super::{
    errors::{MolmassErrorKind, ParseResult},
    primitives::{count, lowercase, uppercase},
};
use crate::{AtomicDatabase, ChemicalComposition, Count, Element};

// Public API ==========================================================================================================

/// Chemical Composition = { Atomic Offset }- ;
pub fn chemical_composition<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, ChemicalComposition<'a>> {
    let parser = many1(atomic_offset(db)).map(|chemical_formula| ChemicalComposition {
        chemical_formula,
    });
    wrap_err(parser, MolmassErrorKind::ExpectedChemicalComposition)
}

// Private Sub-Parsers =================================================================================================

/// Atomic Offset = Element , [ Count ] ;
fn atomic_offset<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, (Element<'a>, Count)> {
    let optional_count = opt(count).map(Option::unwrap_or_default);
    let parser = pair(element(db), optional_count);
    wrap_err(parser, MolmassErrorKind::ExpectedAtomicOffset)
}

/// Element = uppercase , [ lowercase ] ;
fn element<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Element<'a>> {
    map_res(element_symbol, |symbol| Element::new(db, symbol))
}

/// Element = uppercase , [ lowercase ] ;
fn element_symbol(i: &str) -> ParseResult<&str> {
    let parser = recognize(pair(uppercase, opt(lowercase)));
    wrap_err(parser, MolmassErrorKind::ExpectedElementSymbol)(i)
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use nom::combinator::all_consuming;
    use rust_decimal_macros::dec;

    use crate::{Massive, MonoisotopicMass};

    use super::*;

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

    #[test]
    fn test_element_symbol() {
        // Valid Element Symbols
        assert_eq!(element_symbol("H"), Ok(("", "H")));
        assert_eq!(element_symbol("He"), Ok(("", "He")));
        assert_eq!(element_symbol("Ca"), Ok(("", "Ca")));
        // Invalid Element Symbols
        assert!(element_symbol("h").is_err());
        assert!(element_symbol("1H").is_err());
        assert!(element_symbol("+H").is_err());
        // Multiple Element Symbols
        assert_eq!(element_symbol("HeH"), Ok(("H", "He")));
        assert_eq!(element_symbol("HHe"), Ok(("He", "H")));
        assert_eq!(element_symbol("HEN"), Ok(("EN", "H")));
    }

    #[test]
    fn test_element() {
        let mut element = element(&DB);
        // Valid Elements
        let (rest, na) = element("NaCl").unwrap();
        assert_eq!(rest, "Cl");
        assert_eq!(na.symbol(), "Na");
        let (rest, tc) = element("TcO4").unwrap();
        assert_eq!(rest, "O4");
        assert_eq!(tc.symbol(), "Tc");
        // Unknown elements are fatal errors
        assert!(matches!(element("Qx"), Err(nom::Err::Failure(_))));
        // Malformed symbols are recoverable
        assert!(matches!(element("1H"), Err(nom::Err::Error(_))));
    }

    #[test]
    fn test_atomic_offset() {
        let mut atomic_offset = atomic_offset(&DB);
        let (rest, (h, count)) = atomic_offset("H2O").unwrap();
        assert_eq!(rest, "O");
        assert_eq!(h.symbol(), "H");
        assert_eq!(count, Count::new(2).unwrap());
        // Missing counts default to one
        let (rest, (o, count)) = atomic_offset("O").unwrap();
        assert_eq!(rest, "");
        assert_eq!(o.symbol(), "O");
        assert_eq!(count, Count::default());
        // Zero counts are rejected
        assert!(atomic_offset("H0").is_err());
        assert!(atomic_offset("H02").is_err());
    }

    #[test]
    fn test_chemical_composition() {
        let mut chemical_composition = all_consuming(chemical_composition(&DB));
        let (_, water) = chemical_composition("H2O").unwrap();
        assert_eq!(water.to_string(), "H2O");
        assert_eq!(
            water.monoisotopic_mass(),
            MonoisotopicMass::from(dec!(18.01056468403))
        );
        // Repeated elements are kept in order
        let (_, acetic_acid) = chemical_composition("CH3COOH").unwrap();
        assert_eq!(acetic_acid.to_string(), "CH3COOH");
        // Invalid Compositions
        assert!(chemical_composition("").is_err());
        assert!(chemical_composition("h2o").is_err());
        assert!(chemical_composition("H2o").is_err());
        assert!(chemical_composition("+H").is_err());
        assert!(chemical_composition("2H").is_err());
    }
}
