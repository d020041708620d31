use miette::Diagnostic;
use molmass::MolmassError;
use thiserror::Error;

pub type Result<T, E = AdductError> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum AdductError {
    #[diagnostic(help("adducts are written with a single pair of brackets, like [M+H]+"))]
    #[error("expected brackets [] once in {adduct:?}, but found {found} opening brackets")]
    AmbiguousBracket { adduct: String, found: usize },

    #[diagnostic(help(
        "the charge should directly follow the closing bracket, like the 2+ in [M+2H]2+"
    ))]
    #[error("the charge was found {found} times in {adduct:?}")]
    AmbiguousCharge { adduct: String, found: usize },

    #[error("the adduct {adduct:?} has a charge of zero")]
    ZeroCharge { adduct: String },

    #[diagnostic(help("the parent molecule is written as M, optionally preceded by a count, like 2M"))]
    #[error("no parent mass (e.g. 2M or M) was found in {adduct:?}")]
    MissingParentMass { adduct: String },

    #[error("the formula {formula:?} in the adduct {adduct:?} is not recognized")]
    UnrecognizedFormula {
        adduct: String,
        formula: String,
        #[source]
        #[diagnostic_source]
        error: MolmassError,
    },

    #[error("failed to look up the mass of an electron")]
    ElectronMass(
        #[source]
        #[diagnostic_source]
        MolmassError,
    ),
}

impl AdductError {
    pub(crate) fn ambiguous_bracket(adduct: &str, found: usize) -> Self {
        let adduct = adduct.to_owned();

        Self::AmbiguousBracket { adduct, found }
    }

    pub(crate) fn ambiguous_charge(adduct: &str, found: usize) -> Self {
        let adduct = adduct.to_owned();

        Self::AmbiguousCharge { adduct, found }
    }

    pub(crate) fn zero_charge(adduct: &str) -> Self {
        let adduct = adduct.to_owned();

        Self::ZeroCharge { adduct }
    }

    pub(crate) fn missing_parent_mass(adduct: &str) -> Self {
        let adduct = adduct.to_owned();

        Self::MissingParentMass { adduct }
    }

    pub(crate) fn unrecognized_formula(adduct: &str, formula: &str, error: MolmassError) -> Self {
        let adduct = adduct.to_owned();
        let formula = formula.to_owned();

        Self::UnrecognizedFormula {
            adduct,
            formula,
            error,
        }
    }
}
