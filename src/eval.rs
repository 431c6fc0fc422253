//! The operator interpreter.
//!
//! This module is the engine's core: a recursive dispatcher that executes
//! one operator against the current state and composes child results. The
//! match over [`Operator`] is exhaustive over the closed variant set.
//!
//! ## Backtracking discipline
//!
//! Every failure path leaves the position where the failing operator found
//! it. Composite operators save their entry position and restore it
//! themselves rather than trusting children, so a misbehaving callback
//! cannot desynchronize a `Sequence` or `Choice`. The one documented
//! exception is an action callback that returns `Fail`: the position stays
//! where the inner operator left it.
//!
//! ## Adapter boundary
//!
//! Each match-producing arm builds a [`Token`] and immediately projects it
//! through the grammar's adapter, so child results are already in the
//! caller's type `U` by the time a parent composes them.

use crate::engine::ParseOptions;
use crate::errors::{Expectation, Failure, Sample};
use crate::grammar::Grammar;
use crate::operator::{ActionOutcome, Flow, Operator};
use crate::source::Source;
use crate::state::State;
use crate::token::Token;

/// Shared read-only context of a single parse run.
pub struct EvalContext<'a, U> {
    pub grammar: &'a Grammar<U>,
    pub source: &'a Source,
    pub opts: &'a ParseOptions,
}

impl<U> EvalContext<'_, U> {
    /// Projects a raw token through the grammar's adapter.
    fn project(&self, token: Token<U>) -> U {
        (self.grammar.adapter())(token)
    }

    fn empty_lexeme(&self) -> U {
        self.project(Token::Lexeme(String::new()))
    }
}

/// Executes one operator against `state`.
///
/// On success the position has advanced by exactly the consumed length; on
/// failure it is back at entry (see the module docs for the single
/// exception). `depth` counts rule invocations, not tree depth; it is
/// checked against [`ParseOptions::max_depth`] each time a rule is entered.
pub fn eval<U: Clone>(
    op: &Operator<U>,
    ctx: &EvalContext<'_, U>,
    state: &mut State<U>,
    depth: usize,
) -> Result<U, Failure> {
    match op {
        Operator::AnyChar => match ctx.source.char_at(state.pos) {
            Some(ch) => {
                state.pos += 1;
                Ok(ctx.project(Token::Lexeme(ch.to_string())))
            }
            None => Err(Failure::expected(Expectation::AnyChar, Sample::EndOfInput)),
        },

        Operator::Literal(text) => {
            if ctx.source.starts_with(state.pos, text) {
                state.pos += text.chars().count();
                Ok(ctx.project(Token::Lexeme(text.clone())))
            } else {
                Err(Failure::expected(
                    Expectation::Value(text.clone()),
                    Sample::at(ctx.source, state.pos),
                ))
            }
        }

        Operator::Pattern {
            regex,
            pattern,
            description,
        } => {
            // The compiled regex is `\A`-anchored, so a find can only ever
            // land at the start of the remaining input.
            match regex.find(ctx.source.rest(state.pos)) {
                Some(found) => {
                    let text = found.as_str().to_string();
                    state.pos += text.chars().count();
                    Ok(ctx.project(Token::Lexeme(text)))
                }
                None => {
                    let shown = description.clone().unwrap_or_else(|| pattern.clone());
                    Err(Failure::expected(
                        Expectation::Pattern(shown),
                        Sample::at(ctx.source, state.pos),
                    ))
                }
            }
        }

        Operator::TextOf(inner) => {
            let entry = state.pos;
            // The inner token is discarded; only the consumed span matters.
            match eval(inner, ctx, state, depth) {
                Ok(_) => {
                    let text = ctx.source.slice(entry, state.pos).to_string();
                    Ok(ctx.project(Token::Lexeme(text)))
                }
                Err(cause) => {
                    state.pos = entry;
                    Err(cause)
                }
            }
        }

        Operator::Maybe(inner) => {
            let entry = state.pos;
            match eval(inner, ctx, state, depth) {
                Ok(value) => Ok(value),
                Err(_) => {
                    state.pos = entry;
                    Ok(ctx.empty_lexeme())
                }
            }
        }

        Operator::OneOrMore(inner) => {
            let mut children = Vec::new();
            loop {
                let mark = state.pos;
                match eval(inner, ctx, state, depth) {
                    Ok(value) => {
                        let stalled = state.pos == mark;
                        children.push(value);
                        // A zero-width match would repeat forever.
                        if stalled {
                            break;
                        }
                    }
                    Err(cause) => {
                        state.pos = mark;
                        if children.is_empty() {
                            return Err(cause);
                        }
                        break;
                    }
                }
            }
            Ok(ctx.project(Token::Children(children)))
        }

        Operator::ZeroOrMore(inner) => {
            let mut children = Vec::new();
            loop {
                let mark = state.pos;
                match eval(inner, ctx, state, depth) {
                    Ok(value) => {
                        let stalled = state.pos == mark;
                        children.push(value);
                        if stalled {
                            break;
                        }
                    }
                    Err(_) => {
                        state.pos = mark;
                        break;
                    }
                }
            }
            Ok(ctx.project(Token::Children(children)))
        }

        Operator::Peek(inner) => {
            let entry = state.pos;
            let outcome = eval(inner, ctx, state, depth);
            state.pos = entry;
            outcome.map(|_| ctx.empty_lexeme())
        }

        Operator::Not(inner) => {
            let entry = state.pos;
            let outcome = eval(inner, ctx, state, depth);
            state.pos = entry;
            match outcome {
                Ok(_) => Err(Failure::expected(
                    Expectation::EndOfInput,
                    Sample::at(ctx.source, entry),
                )),
                Err(_) => Ok(ctx.empty_lexeme()),
            }
        }

        Operator::Sequence(items) => {
            let entry = state.pos;
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                match eval(item, ctx, state, depth) {
                    Ok(value) => children.push(value),
                    Err(cause) => {
                        state.pos = entry;
                        return Err(cause);
                    }
                }
            }
            Ok(ctx.project(Token::Children(children)))
        }

        Operator::Choice(items) => {
            let entry = state.pos;
            let mut causes = Vec::with_capacity(items.len());
            for item in items {
                match eval(item, ctx, state, depth) {
                    Ok(value) => return Ok(value),
                    Err(cause) => {
                        state.pos = entry;
                        causes.push(cause);
                    }
                }
            }
            Err(Failure::AllChoicesFailed {
                causes,
                found: Sample::at(ctx.source, entry),
            })
        }

        Operator::Action(inner, callback) => {
            let value = eval(inner, ctx, state, depth)?;
            match callback(&value, state) {
                ActionOutcome::Replace(replacement) => {
                    Ok(ctx.project(Token::Custom(replacement)))
                }
                ActionOutcome::Keep => Ok(value),
                // Position intentionally stays where the inner operator
                // stopped; see the module docs.
                ActionOutcome::Fail => Err(Failure::expected(
                    Expectation::AnyChar,
                    Sample::Found(String::new()),
                )),
            }
        }

        Operator::Guard(predicate) => match predicate(state) {
            Flow::Continue => Ok(ctx.empty_lexeme()),
            Flow::Halt => Err(Failure::expected(
                Expectation::EndOfInput,
                Sample::found_at(ctx.source, state.pos),
            )),
        },

        Operator::GuardNot(predicate) => match predicate(state) {
            Flow::Halt => Ok(ctx.empty_lexeme()),
            Flow::Continue => Err(Failure::expected(
                Expectation::EndOfInput,
                Sample::found_at(ctx.source, state.pos),
            )),
        },

        Operator::Label(name, inner) => {
            let value = eval(inner, ctx, state, depth)?;
            state.bind(name.clone(), value.clone());
            Ok(value)
        }

        Operator::Call(name) => invoke_rule(name, name, ctx, state, depth),

        Operator::CallAs { alias, target } => invoke_rule(alias, target, ctx, state, depth),
    }
}

/// Invokes `target` and tags the outcome with `wrapper` (the rule's own name
/// for `Call`, the alias for `CallAs`).
fn invoke_rule<U: Clone>(
    wrapper: &str,
    target: &str,
    ctx: &EvalContext<'_, U>,
    state: &mut State<U>,
    depth: usize,
) -> Result<U, Failure> {
    if depth >= ctx.opts.max_depth {
        return Err(Failure::DepthLimit {
            rule: wrapper.to_string(),
        });
    }
    let Some(rule_op) = ctx.grammar.get_rule(target) else {
        return Err(Failure::expected(
            Expectation::Rule(target.to_string()),
            Sample::at(ctx.source, state.pos),
        ));
    };
    match eval(rule_op, ctx, state, depth + 1) {
        Ok(inner) => Ok(ctx.project(Token::InRule(wrapper.to_string(), Box::new(inner)))),
        Err(cause) => Err(Failure::InRule {
            rule: wrapper.to_string(),
            cause: Box::new(cause),
        }),
    }
}
