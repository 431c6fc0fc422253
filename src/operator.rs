//! The operator AST.
//!
//! A grammar is a tree of [`Operator`] nodes. The set is closed: the
//! interpreter matches exhaustively over exactly these seventeen variants,
//! so extending the grammar vocabulary means adding a variant here and an
//! arm there, never subclassing.
//!
//! Operators are assembled with the builder functions at the bottom of this
//! module. The only fallible builder is [`pattern`], which compiles its
//! regex eagerly so a bad pattern surfaces at construction time rather than
//! mid-parse.

use std::sync::Arc;

use regex::Regex;

use crate::errors::GrammarError;
use crate::state::State;

/// Outcome of an action callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome<U> {
    /// Replace the inner token with a synthesized value.
    Replace(U),
    /// Keep the inner token untouched.
    Keep,
    /// Turn the whole action into a failure.
    Fail,
}

/// Outcome of a guard predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// User callback invoked by [`Operator::Action`] with the inner result and
/// the state reached after it.
pub type ActionFn<U> = Arc<dyn Fn(&U, &State<U>) -> ActionOutcome<U>>;

/// User predicate invoked by [`Operator::Guard`] / [`Operator::GuardNot`]
/// over the current state. Never advances the position.
pub type GuardFn<U> = Arc<dyn Fn(&State<U>) -> Flow>;

/// A node in the grammar tree.
#[derive(Clone)]
pub enum Operator<U> {
    /// Consume exactly one character.
    AnyChar,
    /// Consume the literal string if the input starts with it here.
    Literal(String),
    /// Consume an anchored regex match. The dialect is the Rust `regex`
    /// crate's; the stored regex is the user pattern wrapped in `\A(?:…)`.
    Pattern {
        regex: Regex,
        pattern: String,
        description: Option<String>,
    },
    /// Run the inner operator, then yield the consumed substring as a
    /// lexeme regardless of the inner token shape.
    TextOf(Box<Operator<U>>),
    /// Try the inner operator; yield an empty lexeme if it fails.
    Maybe(Box<Operator<U>>),
    /// Greedily repeat the inner operator, requiring at least one match.
    OneOrMore(Box<Operator<U>>),
    /// Greedily repeat the inner operator zero or more times.
    ZeroOrMore(Box<Operator<U>>),
    /// Positive lookahead: succeed iff the inner operator would, without
    /// consuming input.
    Peek(Box<Operator<U>>),
    /// Negative lookahead: succeed iff the inner operator would fail,
    /// without consuming input.
    Not(Box<Operator<U>>),
    /// Run each child in order; all must match.
    Sequence(Vec<Operator<U>>),
    /// Try each alternative in order; first match wins.
    Choice(Vec<Operator<U>>),
    /// Run the inner operator, then hand its result to a callback that may
    /// replace it, keep it, or fail the whole operator.
    Action(Box<Operator<U>>, ActionFn<U>),
    /// Succeed (without consuming) iff the predicate says `Continue`.
    Guard(GuardFn<U>),
    /// Succeed (without consuming) iff the predicate says `Halt`.
    GuardNot(GuardFn<U>),
    /// Run the inner operator and, on success, bind its token under the
    /// given name in the run's label map.
    Label(String, Box<Operator<U>>),
    /// Invoke the named rule.
    Call(String),
    /// Invoke `target`, tagging the result and any failure with `alias`.
    CallAs { alias: String, target: String },
}

impl<U> Operator<U> {
    /// Returns the variant name as a string, for diagnostics and debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operator::AnyChar => "AnyChar",
            Operator::Literal(_) => "Literal",
            Operator::Pattern { .. } => "Pattern",
            Operator::TextOf(_) => "TextOf",
            Operator::Maybe(_) => "Maybe",
            Operator::OneOrMore(_) => "OneOrMore",
            Operator::ZeroOrMore(_) => "ZeroOrMore",
            Operator::Peek(_) => "Peek",
            Operator::Not(_) => "Not",
            Operator::Sequence(_) => "Sequence",
            Operator::Choice(_) => "Choice",
            Operator::Action(_, _) => "Action",
            Operator::Guard(_) => "Guard",
            Operator::GuardNot(_) => "GuardNot",
            Operator::Label(_, _) => "Label",
            Operator::Call(_) => "Call",
            Operator::CallAs { .. } => "CallAs",
        }
    }

    /// Renders the tree in a compact PEG-like notation.
    pub fn pretty(&self) -> String {
        match self {
            Operator::AnyChar => ".".to_string(),
            Operator::Literal(text) => format!("{:?}", text),
            Operator::Pattern {
                pattern,
                description,
                ..
            } => match description {
                Some(desc) => format!("/{}/ ({})", pattern, desc),
                None => format!("/{}/", pattern),
            },
            Operator::TextOf(inner) => format!("$({})", inner.pretty()),
            Operator::Maybe(inner) => format!("{}?", inner.pretty()),
            Operator::OneOrMore(inner) => format!("{}+", inner.pretty()),
            Operator::ZeroOrMore(inner) => format!("{}*", inner.pretty()),
            Operator::Peek(inner) => format!("&{}", inner.pretty()),
            Operator::Not(inner) => format!("!{}", inner.pretty()),
            Operator::Sequence(items) => {
                let inner = items
                    .iter()
                    .map(|item| item.pretty())
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("({})", inner)
            }
            Operator::Choice(items) => {
                let inner = items
                    .iter()
                    .map(|item| item.pretty())
                    .collect::<Vec<_>>()
                    .join(" / ");
                format!("({})", inner)
            }
            Operator::Action(inner, _) => format!("{} {{action}}", inner.pretty()),
            Operator::Guard(_) => "&{guard}".to_string(),
            Operator::GuardNot(_) => "!{guard}".to_string(),
            Operator::Label(name, inner) => format!("{}:{}", name, inner.pretty()),
            Operator::Call(name) => name.clone(),
            Operator::CallAs { alias, target } => format!("{}@{}", alias, target),
        }
    }

    /// Collects the names of every rule this tree invokes, in visit order.
    /// Duplicates are kept; callers that want a set can dedup.
    pub fn called_rules(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_called_rules(&mut names);
        names
    }

    fn collect_called_rules<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Operator::Call(name) => out.push(name),
            Operator::CallAs { target, .. } => out.push(target),
            Operator::TextOf(inner)
            | Operator::Maybe(inner)
            | Operator::OneOrMore(inner)
            | Operator::ZeroOrMore(inner)
            | Operator::Peek(inner)
            | Operator::Not(inner)
            | Operator::Action(inner, _)
            | Operator::Label(_, inner) => inner.collect_called_rules(out),
            Operator::Sequence(items) | Operator::Choice(items) => {
                for item in items {
                    item.collect_called_rules(out);
                }
            }
            Operator::AnyChar
            | Operator::Literal(_)
            | Operator::Pattern { .. }
            | Operator::Guard(_)
            | Operator::GuardNot(_) => {}
        }
    }
}

impl<U> std::fmt::Debug for Operator<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.type_name(), self.pretty())
    }
}

// ============================================================================
// BUILDERS - One constructor per variant
// ============================================================================

pub fn any_char<U>() -> Operator<U> {
    Operator::AnyChar
}

pub fn literal<U>(text: impl Into<String>) -> Operator<U> {
    Operator::Literal(text.into())
}

/// Compiles `pat` anchored to the current position. Fails fast on a pattern
/// the `regex` crate rejects.
pub fn pattern<U>(pat: &str) -> Result<Operator<U>, GrammarError> {
    compile_pattern(pat, None)
}

/// Like [`pattern`], with a human-readable description used in failure
/// reports instead of the raw pattern.
pub fn pattern_described<U>(pat: &str, description: &str) -> Result<Operator<U>, GrammarError> {
    compile_pattern(pat, Some(description.to_string()))
}

fn compile_pattern<U>(pat: &str, description: Option<String>) -> Result<Operator<U>, GrammarError> {
    let regex = Regex::new(&format!(r"\A(?:{})", pat)).map_err(|err| {
        GrammarError::InvalidPattern {
            pattern: pat.to_string(),
            message: err.to_string(),
        }
    })?;
    Ok(Operator::Pattern {
        regex,
        pattern: pat.to_string(),
        description,
    })
}

pub fn text_of<U>(inner: Operator<U>) -> Operator<U> {
    Operator::TextOf(Box::new(inner))
}

pub fn maybe<U>(inner: Operator<U>) -> Operator<U> {
    Operator::Maybe(Box::new(inner))
}

pub fn one_or_more<U>(inner: Operator<U>) -> Operator<U> {
    Operator::OneOrMore(Box::new(inner))
}

pub fn zero_or_more<U>(inner: Operator<U>) -> Operator<U> {
    Operator::ZeroOrMore(Box::new(inner))
}

pub fn peek<U>(inner: Operator<U>) -> Operator<U> {
    Operator::Peek(Box::new(inner))
}

pub fn not<U>(inner: Operator<U>) -> Operator<U> {
    Operator::Not(Box::new(inner))
}

pub fn sequence<U>(items: Vec<Operator<U>>) -> Operator<U> {
    Operator::Sequence(items)
}

pub fn choice<U>(items: Vec<Operator<U>>) -> Operator<U> {
    Operator::Choice(items)
}

pub fn action<U>(
    inner: Operator<U>,
    callback: impl Fn(&U, &State<U>) -> ActionOutcome<U> + 'static,
) -> Operator<U> {
    Operator::Action(Box::new(inner), Arc::new(callback))
}

pub fn guard<U>(predicate: impl Fn(&State<U>) -> Flow + 'static) -> Operator<U> {
    Operator::Guard(Arc::new(predicate))
}

pub fn guard_not<U>(predicate: impl Fn(&State<U>) -> Flow + 'static) -> Operator<U> {
    Operator::GuardNot(Arc::new(predicate))
}

pub fn label<U>(name: impl Into<String>, inner: Operator<U>) -> Operator<U> {
    Operator::Label(name.into(), Box::new(inner))
}

pub fn call<U>(name: impl Into<String>) -> Operator<U> {
    Operator::Call(name.into())
}

pub fn call_as<U>(alias: impl Into<String>, target: impl Into<String>) -> Operator<U> {
    Operator::CallAs {
        alias: alias.into(),
        target: target.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_renders_peg_notation() {
        let op: Operator<String> = sequence(vec![
            literal("if"),
            one_or_more(any_char()),
            choice(vec![call("then"), maybe(literal("end"))]),
        ]);
        assert_eq!(op.pretty(), r#"("if" .+ (then / "end"?))"#);
    }

    #[test]
    fn pattern_rejects_bad_syntax() {
        let err = pattern::<String>("[unclosed").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidPattern { ref pattern, .. } if pattern == "[unclosed"));
    }

    #[test]
    fn pattern_keeps_original_text() {
        let op = pattern::<String>("[0-9]+").unwrap();
        let Operator::Pattern { pattern, regex, .. } = &op else {
            panic!("expected a pattern operator");
        };
        assert_eq!(pattern, "[0-9]+");
        assert!(regex.as_str().starts_with(r"\A"));
    }

    #[test]
    fn called_rules_walks_the_whole_tree() {
        let op: Operator<String> = sequence(vec![
            call("a"),
            choice(vec![call_as("x", "b"), text_of(call("c"))]),
            label("l", maybe(call("a"))),
        ]);
        assert_eq!(op.called_rules(), vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn debug_includes_variant_name() {
        let op: Operator<String> = not(literal("x"));
        assert_eq!(format!("{:?}", op), "Not !\"x\"");
    }
}
