use std::{ops::Deref, str::FromStr};

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use knuffel::{
    Decode, DecodeScalar,
    ast::{self, Integer, Literal, Radix, TypeName},
    decode::{Context, Kind},
    errors::{DecodeError, ExpectedType},
    span::Spanned,
    traits::ErrorSpan,
};
use miette::{Diagnostic, Result};
use rust_decimal::Decimal;
use thiserror::Error;

// Local Crate Imports
use crate::{Charge, Isotope, MassNumber};

// Public API ==========================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AtomicDatabase {
    pub(crate) elements: HashMap<String, ElementDescription>,
    pub(crate) particles: HashMap<String, ParticleDescription>,
}

impl AtomicDatabase {
    pub const DEFAULT_KDL: &'static str = include_str!("../../atomic_database.kdl");

    pub fn new(file_name: impl AsRef<str>, kdl_text: impl AsRef<str>) -> Result<Self> {
        let parsed_db: AtomicDatabaseKdl = knuffel::parse(file_name.as_ref(), kdl_text.as_ref())?;
        Ok(parsed_db.validate()?)
    }

    pub fn contains_element(&self, symbol: &str) -> bool {
        self.elements.contains_key(symbol)
    }

    pub fn contains_particle(&self, symbol: &str) -> bool {
        self.particles.contains_key(symbol)
    }
}

impl Default for AtomicDatabase {
    fn default() -> Self {
        // SAFETY: The built-in database is checked by the tests below, so this can't fail at runtime
        Self::new("atomic_database.kdl", Self::DEFAULT_KDL).unwrap()
    }
}

// Database Entries ====================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct ElementDescription {
    pub(crate) name: String,
    pub(crate) isotopes: HashMap<MassNumber, Isotope>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct ParticleDescription {
    pub(crate) name: String,
    pub(crate) mass: Decimal,
    pub(crate) charge: Charge,
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
struct AtomicDatabaseKdl {
    #[knuffel(child, unwrap(children))]
    elements: Vec<ElementKdl>,
    #[knuffel(child, unwrap(children))]
    particles: Vec<ParticleKdl>,
}

#[derive(Debug, Decode)]
struct ElementKdl {
    #[knuffel(node_name)]
    symbol: ElementSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(children(name = "isotope", non_empty))]
    isotopes: Vec<IsotopeKdl>,
}

#[derive(Debug, Decode)]
struct ParticleKdl {
    #[knuffel(node_name)]
    symbol: ParticleSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(child, unwrap(argument))]
    mass: DecimalKdl,
    #[knuffel(child, unwrap(argument))]
    charge: i64,
}

#[derive(Debug, Decode)]
struct IsotopeKdl {
    #[knuffel(argument)]
    mass_number: u32,
    #[knuffel(argument)]
    relative_mass: DecimalKdl,
    #[knuffel(argument)]
    abundance: Option<DecimalKdl>,
}

// Lossless Parsing of KDL Numbers to Decimal ==========================================================================

#[derive(Debug, Default)]
struct DecimalKdl(Decimal);

impl<S: ErrorSpan> DecodeScalar<S> for DecimalKdl {
    fn type_check(type_name: &Option<Spanned<TypeName, S>>, ctx: &mut Context<S>) {
        if let Some(t) = type_name {
            ctx.emit_error(DecodeError::TypeName {
                span: t.span().clone(),
                found: Some(t.deref().clone()),
                expected: ExpectedType::no_type(),
                rust_type: "Decimal",
            });
        }
    }

    fn raw_decode(
        value: &Spanned<Literal, S>,
        ctx: &mut Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        match &**value {
            Literal::Decimal(ast::Decimal(s)) | Literal::Int(Integer(Radix::Dec, s)) => {
                let res = if s.contains(['e', 'E']) {
                    Decimal::from_scientific(s)
                } else {
                    Decimal::from_str_exact(s)
                };
                match res {
                    Ok(d) => Ok(Self(d)),
                    Err(e) => {
                        ctx.emit_error(DecodeError::conversion(value, Box::new(e)));
                        Ok(Self::default())
                    }
                }
            }
            unsupported => {
                ctx.emit_error(DecodeError::unsupported(
                    value,
                    format!(
                        "expected a decimal number, found {}",
                        Kind::from(unsupported)
                    ),
                ));
                Ok(Self::default())
            }
        }
    }
}

// Element and Particle Symbol Validation ==============================================================================

#[derive(Debug)]
struct ElementSymbol(String);

impl FromStr for ElementSymbol {
    type Err = InvalidAtomicSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<_> = s.chars().collect();
        match chars[..] {
            [f] if f.is_ascii_uppercase() => Ok(Self(s.to_owned())),
            [f, l] if f.is_ascii_uppercase() && l.is_ascii_lowercase() => Ok(Self(s.to_owned())),
            _ => Err(InvalidAtomicSymbolError::Element(s.to_owned())),
        }
    }
}

#[derive(Debug)]
struct ParticleSymbol(String);

impl FromStr for ParticleSymbol {
    type Err = InvalidAtomicSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => Ok(Self(s.to_owned())),
            _ => Err(InvalidAtomicSymbolError::Particle(s.to_owned())),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Diagnostic, Error)]
enum InvalidAtomicSymbolError {
    #[error(
        "expected a single uppercase ASCII letter optionally followed by a lowercase ASCII letter, got {0:?}"
    )]
    Element(String),
    #[error("expected a single lowercase ASCII letter, got {0:?}")]
    Particle(String),
}

// Validation of Parsed KDL ============================================================================================

#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum AtomicDatabaseError {
    #[diagnostic(help("each element symbol may only be defined once"))]
    #[error("the element {0:?} was defined more than once")]
    DuplicateElement(String),

    #[diagnostic(help("each particle symbol may only be defined once"))]
    #[error("the particle {0:?} was defined more than once")]
    DuplicateParticle(String),

    #[diagnostic(help("each mass number may only appear once per element"))]
    #[error("the isotope {1} of {0:?} was defined more than once")]
    DuplicateIsotope(String, MassNumber),

    #[error("the element {0:?} has an isotope with a mass number of 0")]
    ZeroMassNumber(String),
}

impl AtomicDatabaseKdl {
    fn validate(self) -> Result<AtomicDatabase, AtomicDatabaseError> {
        let mut elements = HashMap::with_capacity(self.elements.len());
        for ElementKdl {
            symbol: ElementSymbol(symbol),
            name,
            isotopes,
        } in self.elements
        {
            let isotopes = validate_isotopes(&symbol, isotopes)?;
            if elements.contains_key(&symbol) {
                return Err(AtomicDatabaseError::DuplicateElement(symbol));
            }
            elements.insert(symbol, ElementDescription { name, isotopes });
        }

        let mut particles = HashMap::with_capacity(self.particles.len());
        for ParticleKdl {
            symbol: ParticleSymbol(symbol),
            name,
            mass: DecimalKdl(mass),
            charge,
        } in self.particles
        {
            if particles.contains_key(&symbol) {
                return Err(AtomicDatabaseError::DuplicateParticle(symbol));
            }
            let charge = Charge(charge);
            particles.insert(symbol, ParticleDescription { name, mass, charge });
        }

        Ok(AtomicDatabase {
            elements,
            particles,
        })
    }
}

fn validate_isotopes(
    symbol: &str,
    isotopes: Vec<IsotopeKdl>,
) -> Result<HashMap<MassNumber, Isotope>, AtomicDatabaseError> {
    let mut validated = HashMap::with_capacity(isotopes.len());
    for IsotopeKdl {
        mass_number,
        relative_mass: DecimalKdl(relative_mass),
        abundance,
    } in isotopes
    {
        let mass_number = MassNumber::new(mass_number)
            .ok_or_else(|| AtomicDatabaseError::ZeroMassNumber(symbol.to_owned()))?;
        let isotope = Isotope {
            relative_mass,
            abundance: abundance.map(|DecimalKdl(a)| a),
        };
        if validated.insert(mass_number, isotope).is_some() {
            return Err(AtomicDatabaseError::DuplicateIsotope(
                symbol.to_owned(),
                mass_number,
            ));
        }
    }
    Ok(validated)
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use insta::assert_snapshot;
    use knuffel::Decode;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_default_atomic_database() {
        let db: AtomicDatabaseKdl =
            knuffel::parse("atomic_database.kdl", AtomicDatabase::DEFAULT_KDL).unwrap();
        assert_eq!(db.elements.len(), 120);
        assert_eq!(db.particles.len(), 2);
        assert_eq!(db.elements.iter().flat_map(|e| &e.isotopes).count(), 327);
    }

    #[test]
    fn build_default_atomic_database() {
        let db = AtomicDatabase::default();
        assert_eq!(db.elements.len(), 120);
        assert_eq!(db.particles.len(), 2);
        assert_eq!(
            db.elements.values().flat_map(|e| &e.isotopes).count(),
            327
        );
        assert!(db.contains_element("Na"));
        assert!(db.contains_element("D"));
        assert!(!db.contains_element("Xx"));
        assert!(db.contains_particle("e"));
        assert!(!db.contains_particle("E"));

        let electron = &db.particles["e"];
        assert_eq!(electron.name, "Electron");
        assert_eq!(electron.mass, dec!(0.000548579909065));
        assert_eq!(electron.charge, Charge(-1));
    }

    #[test]
    fn custom_atomic_database() {
        let kdl = indoc! {r#"
            elements {
              H "Hydrogen" {
                isotope 1 1.00782503223 0.999885
                isotope 2 2.01410177812 0.000115
              }
            }
            particles {
              e "Electron" {
                mass 5.485_799_090_65e-4
                charge -1
              }
            }
        "#};
        let db = AtomicDatabase::new("custom.kdl", kdl).unwrap();
        assert_eq!(db.elements.len(), 1);
        assert_eq!(db.elements["H"].isotopes.len(), 2);
        assert_eq!(db.particles["e"].mass, dec!(0.000548579909065));
    }

    #[test]
    fn duplicate_entries() {
        let duplicate_element = indoc! {r#"
            elements {
              Na "Sodium" {
                isotope 23 22.9897692820 1
              }
              Na "Sodium Again" {
                isotope 23 22.9897692820 1
              }
            }
            particles {}
        "#};
        let error = AtomicDatabase::new("test", duplicate_element).unwrap_err();
        assert_snapshot!(error, @r#"the element "Na" was defined more than once"#);

        let duplicate_isotope = indoc! {r#"
            elements {
              C "Carbon" {
                isotope 12 12 0.9893
                isotope 12 13.00335483507 0.0107
              }
            }
            particles {}
        "#};
        let error = AtomicDatabase::new("test", duplicate_isotope).unwrap_err();
        assert_snapshot!(error, @r#"the isotope 12 of "C" was defined more than once"#);

        let duplicate_particle = indoc! {r#"
            elements {}
            particles {
              e "Electron" {
                mass 0.000548579909065
                charge -1
              }
              e "Positron" {
                mass 0.000548579909065
                charge +1
              }
            }
        "#};
        let error = AtomicDatabase::new("test", duplicate_particle).unwrap_err();
        assert_snapshot!(error, @r#"the particle "e" was defined more than once"#);
    }

    #[test]
    fn zero_mass_number() {
        let kdl = indoc! {r#"
            elements {
              H "Hydrogen" {
                isotope 0 1.00782503223 1
              }
            }
            particles {}
        "#};
        let error = AtomicDatabase::new("test", kdl).unwrap_err();
        assert_snapshot!(error, @r#"the element "H" has an isotope with a mass number of 0"#);
    }

    #[test]
    fn invalid_symbols() {
        let particle = |kdl| knuffel::parse::<Vec<ParticleKdl>>("test", kdl);
        let element = |kdl| knuffel::parse::<Vec<ElementKdl>>("test", kdl);

        // Particles are a single lowercase letter
        assert!(particle("P \"Proton\" { mass 1.007276466621; charge +1; }").is_err());
        assert!(particle("pr \"Proton\" { mass 1.007276466621; charge +1; }").is_err());
        assert!(particle("p \"Proton\" { mass 1.007276466621; charge +1; }").is_ok());
        // Elements are an uppercase letter, optionally followed by a lowercase one
        assert!(element("d \"Deuterium\" { isotope 2 2.01410177812 1; }").is_err());
        assert!(element("DT \"Deuterium\" { isotope 2 2.01410177812 1; }").is_err());
        assert!(element("Deu \"Deuterium\" { isotope 2 2.01410177812 1; }").is_err());
        assert!(element("D \"Deuterium\" { isotope 2 2.01410177812 1; }").is_ok());
        // Elements need at least one isotope
        assert!(element("D \"Deuterium\" {}").is_err());
    }

    #[test]
    fn symbol_from_str() {
        assert!(ElementSymbol::from_str("Na").is_ok());
        assert_eq!(
            ElementSymbol::from_str("NA").unwrap_err(),
            InvalidAtomicSymbolError::Element("NA".to_owned())
        );
        assert!(ParticleSymbol::from_str("e").is_ok());
        assert_eq!(
            ParticleSymbol::from_str("").unwrap_err(),
            InvalidAtomicSymbolError::Particle(String::new())
        );
    }

    #[derive(Debug, Decode)]
    struct Lossless(#[knuffel(argument)] DecimalKdl);

    #[test]
    fn decimal_scientific() {
        let res = knuffel::parse::<Vec<Lossless>>("test", "lossless 5.485_799_090_65e-4");
        assert_eq!(res.unwrap()[0].0.0, dec!(0.000548579909065));
    }

    #[test]
    fn decimal_from_integer() {
        let res = knuffel::parse::<Vec<Lossless>>("test", "lossless 1");
        assert_eq!(res.unwrap()[0].0.0, dec!(1));
    }

    #[test]
    fn invalid_decimals() {
        let lossless = |kdl| knuffel::parse::<Vec<Lossless>>("test", kdl);
        // Too small to be represented without loss of precision
        assert!(lossless("lossless 0.00000_00000_00000_00000_00000_0001").is_err());
        assert!(lossless("lossless 1e-42").is_err());
        // Not a number at all
        assert!(lossless("lossless (pi)3.14").is_err());
        assert!(lossless("lossless true").is_err());
    }
}
