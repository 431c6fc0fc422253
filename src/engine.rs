//! Top-level parse driver.
//!
//! Ties the pieces together for a single run: resolve the start rule, build
//! the source table, execute the interpreter from position 0, and enforce
//! that the whole input was consumed. All public parse paths go through
//! [`run`]; `Grammar::parse` and `Grammar::parse_with` are thin wrappers.

use crate::errors::{Expectation, Failure, ParseError, Sample};
use crate::eval::{eval, EvalContext};
use crate::grammar::Grammar;
use crate::source::Source;
use crate::state::State;

/// Knobs for a parse run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum rule-invocation depth before the run fails with
    /// `Failure::DepthLimit`. This bounds stack use on recursive grammars;
    /// the interpreter recurses a few frames per rule entered, so the
    /// default of 128 stays well inside an ordinary thread stack. Raise it
    /// for deeply nested inputs, or lower it to fail fast.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

/// Runs `grammar`'s start rule over `input`.
///
/// Success requires the start operator to match AND consume every code
/// point; residual input is rewritten into an expected-end-of-input failure
/// located at the character the run stopped on.
pub fn run<U: Clone>(
    grammar: &Grammar<U>,
    input: &str,
    opts: &ParseOptions,
) -> Result<U, ParseError> {
    let source = Source::new(input);
    let Some(start_op) = grammar.get_rule(grammar.start_rule()) else {
        return Err(ParseError::at(
            &source,
            0,
            Failure::NoStartRule {
                name: grammar.start_rule().to_string(),
            },
        ));
    };

    let ctx = EvalContext {
        grammar,
        source: &source,
        opts,
    };
    let mut state = State::new();

    match eval(start_op, &ctx, &mut state, 0) {
        Ok(value) if state.pos == source.len() => Ok(value),
        Ok(_) => Err(ParseError::at(
            &source,
            state.pos,
            Failure::expected(Expectation::EndOfInput, Sample::at(&source, state.pos)),
        )),
        Err(failure) => Err(ParseError::at(&source, state.pos, failure)),
    }
}
