use nom::{
    character::complete::{char, one_of, satisfy, u32},
    combinator::{cut, map, map_opt, not},
    sequence::preceded,
};
use nom_miette::expect;

use crate::{Count, OffsetKind};

use super::errors::{MolmassErrorKind, ParseResult};

/// uppercase
///   = "A" | "B" | "C" | "D" | "E" | "F" | "G"
///   | "H" | "I" | "J" | "K" | "L" | "M" | "N"
///   | "O" | "P" | "Q" | "R" | "S" | "T" | "U"
///   | "V" | "W" | "X" | "Y" | "Z"
///   ;
pub fn uppercase(i: &str) -> ParseResult<char> {
    let parser = satisfy(|c| c.is_ascii_uppercase());
    expect(parser, MolmassErrorKind::ExpectedUppercase)(i)
}

/// lowercase
///   = "a" | "b" | "c" | "d" | "e" | "f" | "g"
///   | "h" | "i" | "j" | "k" | "l" | "m" | "n"
///   | "o" | "p" | "q" | "r" | "s" | "t" | "u"
///   | "v" | "w" | "x" | "y" | "z"
///   ;
pub fn lowercase(i: &str) -> ParseResult<char> {
    let parser = satisfy(|c| c.is_ascii_lowercase());
    expect(parser, MolmassErrorKind::ExpectedLowercase)(i)
}

/// Count = digit - "0" , { digit } ;
pub fn count(i: &str) -> ParseResult<Count> {
    let not_zero = expect(cut(not(char('0'))), MolmassErrorKind::ExpectedNoLeadingZero);
    let digits = expect(u32, MolmassErrorKind::ExpectedDigit);
    map_opt(preceded(not_zero, digits), Count::new)(i)
}

/// Offset Kind = "+" | "-" ;
pub fn offset_kind(i: &str) -> ParseResult<OffsetKind> {
    map(one_of("+-"), |c| {
        if c == '+' {
            OffsetKind::Add
        } else {
            OffsetKind::Remove
        }
    })(i)
}
