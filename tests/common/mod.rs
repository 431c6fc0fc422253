//! Shared helpers for the integration suites: a concrete user tree type
//! that mirrors the token shapes one-to-one, and the adapter that projects
//! into it.

#![allow(dead_code)]

use std::sync::Arc;

use matra::{Adapter, Grammar, Token};

/// The result type the integration tests parse into. Mirroring the token
/// model makes every assertion a plain structural equality.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Lexeme(String),
    Children(Vec<Tree>),
    InRule(String, Box<Tree>),
}

impl Tree {
    pub fn lexeme(text: &str) -> Tree {
        Tree::Lexeme(text.to_string())
    }

    pub fn children(items: Vec<Tree>) -> Tree {
        Tree::Children(items)
    }

    pub fn in_rule(rule: &str, inner: Tree) -> Tree {
        Tree::InRule(rule.to_string(), Box::new(inner))
    }
}

/// Projects tokens structurally; `Custom` passes its payload through, as
/// every adapter must.
pub fn tree_adapter() -> Adapter<Tree> {
    Arc::new(|token| match token {
        Token::Lexeme(text) => Tree::Lexeme(text),
        Token::Children(items) => Tree::Children(items),
        Token::InRule(rule, inner) => Tree::InRule(rule, inner),
        Token::Custom(value) => value,
    })
}

/// A grammar whose start rule is the given operator.
pub fn grammar_of(start: matra::Operator<Tree>) -> Grammar<Tree> {
    Grammar::from_rules(vec![("start", start)], tree_adapter())
}
