//! Failure model and public error types.
//!
//! Internal failures travel upward as a [`Failure`] reason tree; the driver
//! resolves the final position and wraps the reason in a [`ParseError`],
//! which renders as a full miette diagnostic with the offending input
//! attached. Grammar construction problems are a separate, simpler
//! [`GrammarError`].
//!
//! Reason values are plain serializable data so callers can feed them to
//! their own pretty-printers.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::{Position, Source};

// ============================================================================
// FAILURE REASONS - What the interpreter expected and what it saw
// ============================================================================

/// What an operator expected at the failure position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expectation {
    /// A literal string.
    Value(String),
    /// Any single character.
    AnyChar,
    /// A definition for the named rule.
    Rule(String),
    /// Input matching a regex pattern (or its description).
    Pattern(String),
    /// The end of the input.
    EndOfInput,
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expectation::Value(text) => write!(f, "`{}`", text),
            Expectation::AnyChar => write!(f, "any character"),
            Expectation::Rule(name) => write!(f, "a definition for rule `{}`", name),
            Expectation::Pattern(pattern) => write!(f, "input matching `{}`", pattern),
            Expectation::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// The single character (never the remainder) recorded next to an
/// expectation, or the end-of-input marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sample {
    Found(String),
    EndOfInput,
}

impl Sample {
    /// The character at `pos`, or the end-of-input marker past the end.
    pub fn at(source: &Source, pos: usize) -> Self {
        match source.char_at(pos) {
            Some(ch) => Sample::Found(ch.to_string()),
            None => Sample::EndOfInput,
        }
    }

    /// The character at `pos`, or an empty `Found` past the end. Used where
    /// the failure shape always carries a value sample.
    pub fn found_at(source: &Source, pos: usize) -> Self {
        let text = source.char_at(pos).map(String::from).unwrap_or_default();
        Sample::Found(text)
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sample::Found(text) if text.is_empty() => write!(f, "nothing"),
            Sample::Found(text) => write!(f, "`{}`", text),
            Sample::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// A structured failure reason. Aggregate variants preserve the full causal
/// chain; nothing is flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Failure {
    /// A concrete expectation did not hold.
    Expected {
        expectation: Expectation,
        found: Sample,
    },
    /// A failure inside a named rule invocation.
    InRule { rule: String, cause: Box<Failure> },
    /// Every alternative of a choice failed; `found` samples the character
    /// at the choice's entry position.
    AllChoicesFailed { causes: Vec<Failure>, found: Sample },
    /// The grammar does not define its start rule.
    NoStartRule { name: String },
    /// Rule invocation exceeded the configured recursion limit.
    DepthLimit { rule: String },
}

impl Failure {
    pub fn expected(expectation: Expectation, found: Sample) -> Self {
        Failure::Expected { expectation, found }
    }

    /// The innermost `Expected` reason, walking through rule wrappers and
    /// taking the first branch of aggregates. Handy for terse reporting.
    pub fn root_cause(&self) -> &Failure {
        match self {
            Failure::InRule { cause, .. } => cause.root_cause(),
            Failure::AllChoicesFailed { causes, .. } => {
                causes.first().map(|c| c.root_cause()).unwrap_or(self)
            }
            _ => self,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Expected { expectation, found } => {
                write!(f, "expected {}, found {}", expectation, found)
            }
            Failure::InRule { rule, cause } => write!(f, "in rule `{}`: {}", rule, cause),
            Failure::AllChoicesFailed { causes, found } => {
                let inner = causes
                    .iter()
                    .map(|cause| cause.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "no alternative matched (found {}): {}", found, inner)
            }
            Failure::NoStartRule { name } => {
                write!(f, "grammar defines no rule named `{}`", name)
            }
            Failure::DepthLimit { rule } => {
                write!(f, "recursion limit exceeded while invoking rule `{}`", rule)
            }
        }
    }
}

// ============================================================================
// PUBLIC ERROR TYPES
// ============================================================================

/// A failed parse: the reason tree plus a resolved position, rendered by
/// miette with the offending character labeled in the attached input.
#[derive(Debug, Error, Diagnostic)]
#[error("parse failed at {position}: {failure}")]
#[diagnostic(code(matra::parse))]
pub struct ParseError {
    pub failure: Failure,
    /// 0-based line/column of the failure.
    pub position: Position,
    /// 0-based code-point offset of the failure.
    pub offset: usize,
    #[source_code]
    src: NamedSource<String>,
    #[label("failed here")]
    span: SourceSpan,
}

impl ParseError {
    pub(crate) fn at(source: &Source, offset: usize, failure: Failure) -> Self {
        let (start, len) = source.byte_span(offset);
        Self {
            failure,
            position: source.locate(offset),
            offset,
            src: NamedSource::new("input", source.text().to_string()),
            span: SourceSpan::from((start, len)),
        }
    }
}

/// A problem with the grammar itself, reported at construction or by
/// [`Grammar::validate`](crate::grammar::Grammar::validate) before any input
/// is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GrammarError {
    #[error("invalid pattern `{pattern}`: {message}")]
    #[diagnostic(code(matra::grammar::invalid_pattern))]
    InvalidPattern { pattern: String, message: String },

    #[error("rule `{referrer}` calls undefined rule `{target}`")]
    #[diagnostic(code(matra::grammar::undefined_rule))]
    UndefinedRule { referrer: String, target: String },

    #[error("grammar defines no start rule `{name}`")]
    #[diagnostic(code(matra::grammar::no_start_rule))]
    MissingStartRule { name: String },
}
