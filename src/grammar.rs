//! Grammar registry and parse entry points.
//!
//! A [`Grammar`] maps rule names to operator trees, designates a start rule,
//! and carries the adapter that projects raw match tokens into the caller's
//! result type. The registry is the single source of truth for rule lookup:
//! the interpreter resolves every `Call` through it at run time, and
//! [`Grammar::validate`] checks the same wiring statically.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{self, ParseOptions};
use crate::errors::{GrammarError, ParseError};
use crate::operator::Operator;
use crate::token::Token;

/// The rule name a grammar starts from unless told otherwise.
pub const DEFAULT_START_RULE: &str = "start";

/// The user projection applied at every match-producing step.
///
/// Adapters must map `Token::Custom(v)` to `v` unchanged; everything else is
/// the caller's choice of representation.
pub type Adapter<U> = Arc<dyn Fn(Token<U>) -> U>;

/// A named-rule grammar plus its adapter. Owned by the caller and borrowed
/// read-only for the duration of each parse run.
#[derive(Clone)]
pub struct Grammar<U> {
    rules: HashMap<String, Operator<U>>,
    start: String,
    adapter: Adapter<U>,
}

impl<U> Grammar<U> {
    /// An empty grammar with the default start rule name.
    pub fn new(adapter: Adapter<U>) -> Self {
        Self {
            rules: HashMap::new(),
            start: DEFAULT_START_RULE.to_string(),
            adapter,
        }
    }

    /// Builds a grammar from `(name, operator)` pairs. Later pairs replace
    /// earlier ones with the same name.
    pub fn from_rules<N: Into<String>>(
        rules: impl IntoIterator<Item = (N, Operator<U>)>,
        adapter: Adapter<U>,
    ) -> Self {
        let mut grammar = Self::new(adapter);
        for (name, op) in rules {
            grammar.register(name, op);
        }
        grammar
    }

    /// Binds `op` under `name`, replacing any previous definition.
    pub fn register(&mut self, name: impl Into<String>, op: Operator<U>) {
        self.rules.insert(name.into(), op);
    }

    pub fn get_rule(&self, name: &str) -> Option<&Operator<U>> {
        self.rules.get(name)
    }

    pub fn start_rule(&self) -> &str {
        &self.start
    }

    pub fn set_start_rule(&mut self, name: impl Into<String>) {
        self.start = name.into();
    }

    /// All rule names, sorted for stable output.
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn adapter(&self) -> &Adapter<U> {
        &self.adapter
    }

    /// Statically checks the grammar's wiring: the start rule must exist and
    /// every `Call`/`CallAs` target must be defined. Returns every problem
    /// found; an empty vector means the grammar is well-formed.
    pub fn validate(&self) -> Vec<GrammarError> {
        let mut problems = Vec::new();
        if !self.rules.contains_key(&self.start) {
            problems.push(GrammarError::MissingStartRule {
                name: self.start.clone(),
            });
        }
        let mut referrers: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        referrers.sort_unstable();
        for referrer in referrers {
            for target in self.rules[referrer].called_rules() {
                if !self.rules.contains_key(target) {
                    problems.push(GrammarError::UndefinedRule {
                        referrer: referrer.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }
        problems
    }
}

impl<U: Clone> Grammar<U> {
    /// Runs the start rule over `input`, requiring the whole input to be
    /// consumed. Uses default [`ParseOptions`].
    pub fn parse(&self, input: &str) -> Result<U, ParseError> {
        engine::run(self, input, &ParseOptions::default())
    }

    /// Like [`Grammar::parse`] with explicit options.
    pub fn parse_with(&self, input: &str, opts: &ParseOptions) -> Result<U, ParseError> {
        engine::run(self, input, opts)
    }
}

impl<U> std::fmt::Debug for Grammar<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("start", &self.start)
            .field("rules", &self.rule_names())
            .finish()
    }
}
