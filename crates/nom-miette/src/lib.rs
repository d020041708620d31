//! Turns `nom` parse failures into `miette` diagnostics that point back at the offending input

use std::fmt;

use ahash::{HashMap, HashMapExt};
use miette::{Diagnostic, LabeledSpan, SourceCode, SourceSpan};
use nom::{
    Err, Finish, IResult, Parser,
    combinator::{all_consuming, complete, consumed},
    error::{ErrorKind, ParseError},
};
use thiserror::Error;

// Public API ==========================================================================================================

/// A finished parse error, owning a copy of the input it was produced from
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{error}")]
pub struct LabeledError<E: LabeledErrorKind> {
    full_input: String,
    labels: Vec<LabeledSpan>,
    error: ErrorTree<E>,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ErrorTree<E: LabeledErrorKind> {
    #[error("{kind}")]
    Node {
        kind: E,
        #[source]
        source: Option<Box<LabeledError<E>>>,
    },
    #[error("attempted {} parse branches unsuccessfully", .0.len())]
    Branch(Vec<LabeledError<E>>),
}

pub trait LabeledErrorKind: Diagnostic + Clone + Eq + From<ErrorKind> {
    fn label(&self) -> Option<&'static str> {
        None
    }
}

/// Lifts errors from non-`nom` code (like database lookups) into a parse error of kind `Self`
pub trait FromExternalError<'a, E>: Sized {
    /// Fatal errors stop `alt` from trying any further branches
    const FATAL: bool = false;

    fn from_external_error(input: &'a str, error: E) -> LabeledParseError<'a, Self>;
}

/// The in-flight error type threaded through `nom` parsers
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LabeledParseError<'a, E> {
    input: &'a str,
    length: usize,
    kind: E,
    source: Option<Box<LabeledParseError<'a, E>>>,
    alternatives: Vec<LabeledParseError<'a, E>>,
}

impl<'a, E: LabeledErrorKind> LabeledParseError<'a, E> {
    pub fn new(input: &'a str, kind: E) -> Self {
        Self::new_with_source(input, kind, None)
    }

    pub fn new_with_source(input: &'a str, kind: E, source: Option<Self>) -> Self {
        Self {
            input,
            length: 0,
            kind,
            source: source.map(Box::new),
            alternatives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_length(self, length: usize) -> Self {
        Self { length, ..self }
    }

    pub fn kind(&self) -> &E {
        &self.kind
    }
}

/// Runs `parser` to completion, demanding that all of the input is consumed
pub fn final_parser<'a, O, P, E>(parser: P) -> impl FnMut(&'a str) -> Result<O, LabeledError<E>>
where
    E: LabeledErrorKind,
    P: Parser<&'a str, O, LabeledParseError<'a, E>>,
{
    let mut parser = all_consuming(complete(parser));
    move |input| {
        parser
            .parse(input)
            .finish()
            .map(|(_, output)| output)
            .map_err(|e| {
                let mut error = e.finalize(input);
                error.bubble_labels();
                error
            })
    }
}

/// Like `nom::combinator::map_res`, but the error produced by `f` is kept and spans all of the consumed input
pub fn map_res<'a, O1, O2, E1, E2, P, F>(
    parser: P,
    mut f: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O2, LabeledParseError<'a, E1>>
where
    E1: LabeledErrorKind + FromExternalError<'a, E2>,
    P: Parser<&'a str, O1, LabeledParseError<'a, E1>>,
    F: FnMut(O1) -> Result<O2, E2>,
{
    let mut parser = consumed(parser);
    move |input| {
        let (rest, (matched, output)) = parser.parse(input)?;
        f(output).map(|o| (rest, o)).map_err(|e| {
            let error = E1::from_external_error(input, e).with_length(matched.len());
            if E1::FATAL {
                Err::Failure(error)
            } else {
                Err::Error(error)
            }
        })
    }
}

/// Wraps any error from `parser` in a new error of `kind`, keeping the original as its source
pub fn wrap_err<'a, O, P, E>(
    mut parser: P,
    kind: E,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, LabeledParseError<'a, E>>
where
    E: LabeledErrorKind,
    P: Parser<&'a str, O, LabeledParseError<'a, E>>,
{
    move |i| {
        parser
            .parse(i)
            .map_err(|e| e.map(|e| LabeledParseError::new_with_source(i, kind.clone(), Some(e))))
    }
}

/// Replaces any error from `parser` with a new error of `kind`, discarding the original
pub fn expect<'a, O, P, E>(
    mut parser: P,
    kind: E,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, LabeledParseError<'a, E>>
where
    E: LabeledErrorKind,
    P: Parser<&'a str, O, LabeledParseError<'a, E>>,
{
    move |i| {
        parser
            .parse(i)
            .map_err(|e| e.map(|_| LabeledParseError::new(i, kind.clone())))
    }
}

// Diagnostic Implementation ===========================================================================================

impl<E: LabeledErrorKind> Diagnostic for LabeledError<E> {
    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.full_input)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.error {
            ErrorTree::Node { kind, .. } => kind.help(),
            ErrorTree::Branch(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(self.labels.iter().cloned()))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        match &self.error {
            ErrorTree::Branch(related) => {
                Some(Box::new(related.iter().map(|e| e as &dyn Diagnostic)))
            }
            ErrorTree::Node { .. } => None,
        }
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        match &self.error {
            ErrorTree::Node { source, .. } => source.as_deref().map(|e| e as &dyn Diagnostic),
            ErrorTree::Branch(_) => None,
        }
    }
}

// Private Helper Methods ==============================================================================================

impl<E: LabeledErrorKind> LabeledError<E> {
    // Labels are only shown on the outermost error, so pull up any labels left on inner errors
    fn bubble_labels(&mut self) {
        if !self.labels.is_empty() {
            return;
        }

        match &mut self.error {
            ErrorTree::Node {
                source: Some(child),
                ..
            } => {
                child.bubble_labels();
                self.labels = child.labels.drain(..).collect();
            }
            ErrorTree::Branch(alternatives) => {
                let labels = alternatives.iter_mut().flat_map(|child| {
                    child.bubble_labels();
                    child.labels.drain(..)
                });
                self.labels = merge_labels(labels);
            }
            ErrorTree::Node { source: None, .. } => (),
        }
    }
}

// Labels sharing the same span are joined with "or", labels on different spans are kept apart
fn merge_labels(labels: impl Iterator<Item = LabeledSpan>) -> Vec<LabeledSpan> {
    let mut span_order = Vec::new();
    let mut span_labels: HashMap<SourceSpan, Vec<String>> = HashMap::new();
    for labeled_span in labels {
        let Some(label) = labeled_span.label() else {
            continue;
        };
        let span = *labeled_span.inner();
        let entry = span_labels.entry(span).or_insert_with(|| {
            span_order.push(span);
            Vec::new()
        });
        entry.push(label.to_owned());
    }

    span_order
        .into_iter()
        .filter_map(|span| {
            let label = span_labels.remove(&span)?.join(" or ");
            Some(LabeledSpan::new_with_span(Some(label), span))
        })
        .collect()
}

impl<E: LabeledErrorKind> LabeledParseError<'_, E> {
    fn finalize(self, full_input: &str) -> LabeledError<E> {
        // NOTE: The trailing space gives labels somewhere to point when an error occurs at the end of the input
        let padded_input = format!("{full_input} ");

        let Self {
            input,
            length,
            kind,
            source,
            alternatives,
        } = self;

        if alternatives.is_empty() {
            let span = span_of(full_input, input, length);
            let labels = kind
                .label()
                .map(|label| LabeledSpan::new_with_span(Some(label.to_owned()), span))
                .into_iter()
                .collect();
            let source = source.map(|e| Box::new(e.finalize(full_input)));
            LabeledError {
                full_input: padded_input,
                labels,
                error: ErrorTree::Node { kind, source },
            }
        } else {
            let first = Self {
                input,
                length,
                kind,
                source,
                alternatives: Vec::new(),
            };
            let branches = std::iter::once(first)
                .chain(alternatives)
                .map(|e| e.finalize(full_input))
                .collect();
            LabeledError {
                full_input: padded_input,
                labels: Vec::new(),
                error: ErrorTree::Branch(branches),
            }
        }
    }
}

// Every input `nom` hands out while parsing complete `&str`s is a suffix of the full input
fn span_of(full_input: &str, input: &str, length: usize) -> SourceSpan {
    let start = full_input.len().saturating_sub(input.len());
    SourceSpan::from(start..start + length)
}

impl<'a, E: LabeledErrorKind> ParseError<&'a str> for LabeledParseError<'a, E> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::new(input, kind.into())
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(mut self, other: Self) -> Self {
        self.alternatives.push(other);
        self
    }
}

// Module Tests ========================================================================================================
