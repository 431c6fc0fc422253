//! # matra
//!
//! A PEG-style combinator engine. A host program assembles a grammar as a
//! tree of composable [`Operator`]s, binds rules to names in a [`Grammar`],
//! and runs the grammar against an input string to get either a typed parse
//! tree or a precisely located [`ParseError`].
//!
//! Grammars are already-constructed operator trees; there is no grammar
//! source syntax. Parsing is a single-threaded pure function of
//! `(grammar, input)` with prioritized choice and unlimited lookahead, no
//! left-recursion handling and no memoization.
//!
//! ```rust
//! use std::sync::Arc;
//! use matra::operator::{call, literal, one_or_more, sequence};
//! use matra::{Grammar, Token};
//!
//! // The caller picks the result type; here the raw matched text.
//! let adapter: matra::Adapter<String> = Arc::new(|token| match token {
//!     Token::Lexeme(text) => text,
//!     Token::Children(items) => items.concat(),
//!     Token::InRule(_, inner) => *inner,
//!     Token::Custom(value) => value,
//! });
//!
//! let grammar = Grammar::from_rules(
//!     vec![
//!         ("word", one_or_more(literal("ab"))),
//!         ("start", sequence(vec![call("word"), literal("!")])),
//!     ],
//!     adapter,
//! );
//!
//! assert_eq!(grammar.parse("abab!").unwrap(), "abab!");
//! assert!(grammar.parse("abab?").is_err());
//! ```

pub mod engine;
pub mod errors;
pub mod eval;
pub mod grammar;
pub mod operator;
pub mod source;
pub mod state;
pub mod token;

pub use engine::ParseOptions;
pub use errors::{Expectation, Failure, GrammarError, ParseError, Sample};
pub use grammar::{Adapter, Grammar, DEFAULT_START_RULE};
pub use operator::{ActionFn, ActionOutcome, Flow, GuardFn, Operator};
pub use source::{Position, Source};
pub use state::State;
pub use token::Token;
