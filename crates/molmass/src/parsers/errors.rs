use miette::Diagnostic;
use nom::{IResult, error::ErrorKind};
use nom_miette::{FromExternalError, LabeledError, LabeledErrorKind, LabeledParseError};
use thiserror::Error;

use crate::atoms::errors::AtomicLookupError;

pub type CompositionError = LabeledError<MolmassErrorKind>;
pub type ParseResult<'a, O> = IResult<&'a str, O, LabeledParseError<'a, MolmassErrorKind>>;

#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum MolmassErrorKind {
    #[error("expected a chemical formula, like H2O or CH3COOH")]
    ExpectedChemicalComposition,

    #[error("expected an element (like Au) optionally followed by a number")]
    ExpectedAtomicOffset,

    #[diagnostic(help(
        "a 0 value doesn't make sense here, if you've mistakenly included a leading zero, like \
        NH02, try just NH2 instead"
    ))]
    #[error("counts cannot start with 0")]
    ExpectedNoLeadingZero,

    #[error("expected an ASCII digit 1-9")]
    ExpectedDigit,

    #[error("expected an element symbol")]
    ExpectedElementSymbol,

    #[error("expected an uppercase ASCII letter")]
    ExpectedUppercase,

    #[error("expected a lowercase ASCII letter")]
    ExpectedLowercase,

    #[diagnostic(transparent)]
    #[error(transparent)]
    LookupError(Box<AtomicLookupError>),

    #[diagnostic(help(
        "this is an internal error that you shouldn't ever see! If you have gotten this error, \
        then please report it as a bug!"
    ))]
    #[error("internal `nom` error: {0:?}")]
    NomError(ErrorKind),

    #[diagnostic(help(
        "check the unparsed region for errors, or remove it from the rest of the formula"
    ))]
    #[error("could not interpret the full input as a valid chemical formula")]
    Incomplete,
}

impl LabeledErrorKind for MolmassErrorKind {
    fn label(&self) -> Option<&'static str> {
        Some(match self {
            Self::LookupError(e) => match **e {
                AtomicLookupError::Element(..) => "element not found",
                AtomicLookupError::Particle(..) => "particle not found",
                AtomicLookupError::Abundance(..) => "no natural abundance",
            },
            Self::ExpectedUppercase => "expected uppercase",
            Self::ExpectedLowercase => "expected lowercase",
            Self::ExpectedDigit => "expected digit",
            Self::ExpectedNoLeadingZero => "expected non-zero",
            Self::Incomplete => "input was valid up until this point",
            Self::NomError(_) => "the region that triggered this bug!",
            _ => return None,
        })
    }
}

impl<'a> FromExternalError<'a, AtomicLookupError> for MolmassErrorKind {
    const FATAL: bool = true;

    fn from_external_error(input: &'a str, e: AtomicLookupError) -> LabeledParseError<'a, Self> {
        LabeledParseError::new(input, Self::LookupError(Box::new(e)))
    }
}

impl From<ErrorKind> for MolmassErrorKind {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Eof => Self::Incomplete,
            kind => Self::NomError(kind),
        }
    }
}
