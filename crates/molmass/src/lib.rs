//! Chemical formulae and their masses, looked up in a configurable atomic database

pub mod atoms;
pub mod errors;
pub mod parsers;

use std::num::NonZeroU32;

// External Crate Imports
use ahash::HashMap;
use derive_more::{Add, Display, From, Into, Neg, Sub};
use rust_decimal::Decimal;

pub use atoms::atomic_database::AtomicDatabase;
pub use errors::{MolmassError, Result};

// NOTE: For the types in this module, 'a lifetimes indicate references to the AtomicDatabase

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ChemicalComposition<'a> {
    chemical_formula: Vec<(Element<'a>, Count)>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Element<'a> {
    symbol: &'a str,
    name: &'a str,
    isotopes: &'a HashMap<MassNumber, Isotope>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Particle<'a> {
    symbol: &'a str,
    name: &'a str,
    mass: &'a Decimal,
    charge: &'a Charge,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Count(NonZeroU32);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum OffsetKind {
    Add,
    Remove,
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct MassNumber(NonZeroU32);

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Isotope {
    relative_mass: Decimal,
    abundance: Option<Decimal>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, From, Into, Neg)]
pub struct Charge(i64);

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, From, Into, Add, Sub, Neg,
)]
pub struct MonoisotopicMass(Decimal);

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, From, Into, Add, Sub, Neg,
)]
pub struct AverageMass(Decimal);

// =====================================================================================================================

pub trait Massive {
    fn monoisotopic_mass(&self) -> MonoisotopicMass;
    fn average_mass(&self) -> AverageMass;
}

pub trait Charged {
    fn charge(&self) -> Charge;
}

// Blanket impls

macro_rules! massive_ref_impls {
    ($($ref_type:ty),+ $(,)?) => {
        $(
            impl<T: Massive> Massive for $ref_type {
                fn monoisotopic_mass(&self) -> MonoisotopicMass {
                    (**self).monoisotopic_mass()
                }

                fn average_mass(&self) -> AverageMass {
                    (**self).average_mass()
                }
            }
        )+
    };
}

massive_ref_impls!(&T, &mut T, Box<T>);

macro_rules! charged_ref_impls {
    ($($ref_type:ty),+ $(,)?) => {
        $(
            impl<T: Charged> Charged for $ref_type {
                fn charge(&self) -> Charge {
                    (**self).charge()
                }
            }
        )+
    };
}

charged_ref_impls!(&T, &mut T, Box<T>);
