//! Splits adduct notation like `[2M+Na-H2O]2+` into its parent multiplier, signed ion tokens, and charge

use std::sync::LazyLock;

use molmass::{Charge, Count};
use regex::Regex;
use tracing::warn;

use crate::errors::{AdductError, Result};

// SAFETY: These patterns are constant and are checked to compile by the tests below
static CHARGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\]([0-9]?[+-])").unwrap());
static PARENT_MASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[+-])([1-9]?M)(?:$|[+-])").unwrap());
static ION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[+-][0-9a-zA-Z]+").unwrap());

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct AdductTokens<'a> {
    pub(crate) parent_multiplier: Count,
    pub(crate) ions: Vec<&'a str>,
    pub(crate) charge: Charge,
}

pub(crate) fn tokenize(adduct: &str) -> Result<AdductTokens<'_>> {
    let charge = charge(adduct)?;
    let ions_part = bracket_contents(adduct)?;
    let parent_multiplier =
        parent_multiplier(ions_part).ok_or_else(|| AdductError::missing_parent_mass(adduct))?;
    let ions = ION.find_iter(ions_part).map(|m| m.as_str()).collect();

    Ok(AdductTokens {
        parent_multiplier,
        ions,
        charge,
    })
}

fn charge(adduct: &str) -> Result<Charge> {
    let matches: Vec<_> = CHARGE
        .captures_iter(adduct)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    let [charge] = matches[..] else {
        return Err(AdductError::ambiguous_charge(adduct, matches.len()));
    };

    let (magnitude, sign) = charge.split_at(charge.len() - 1);
    // A missing magnitude is an implicit 1, as in [M+H]+
    let magnitude: i64 = magnitude.parse().unwrap_or(1);
    if magnitude == 0 {
        return Err(AdductError::zero_charge(adduct));
    }

    Ok(Charge::from(if sign == "-" { -magnitude } else { magnitude }))
}

fn bracket_contents(adduct: &str) -> Result<&str> {
    if !adduct.contains('[') {
        return Ok(adduct);
    }

    let found = adduct.matches('[').count();
    let closing = adduct.matches(']').count();
    let contents = adduct
        .split_once('[')
        .and_then(|(_, rest)| rest.split_once(']'))
        .map(|(contents, _)| contents);
    match contents {
        Some(contents) if found == 1 && closing == 1 => Ok(contents),
        _ => Err(AdductError::ambiguous_bracket(adduct, found)),
    }
}

fn parent_multiplier(ions_part: &str) -> Option<Count> {
    let matches: Vec<_> = PARENT_MASS
        .captures_iter(ions_part)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if matches.len() > 1 {
        warn!(
            "the parent mass (e.g. 2M or M) was found {} times in {ions_part:?}, using {:?}",
            matches.len(),
            matches[0]
        );
    }

    let count = matches.first()?.trim_end_matches('M');
    Count::new(count.parse().unwrap_or(1))
}
