//! Match token model.
//!
//! A [`Token`] is the shape of a successful match before the adapter
//! projects it into the caller's result type `U`. The inner slots carry `U`
//! rather than `Token` because the projection is applied at every
//! match-producing step of the interpreter; by the time a composite operator
//! assembles its token, the children have already been adapted.

use serde::{Deserialize, Serialize};

/// A successful match fragment, handed to the grammar's adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token<U> {
    /// A literal matched substring.
    Lexeme(String),
    /// The collected results of a composite operator's children.
    Children(Vec<U>),
    /// The result of a named rule invocation, tagged with the rule name.
    InRule(String, Box<U>),
    /// A value synthesized by a user action callback. Adapters must project
    /// this variant to its payload unchanged.
    Custom(U),
}

impl<U> Token<U> {
    /// Returns the variant name as a string, for diagnostics and debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Token::Lexeme(_) => "Lexeme",
            Token::Children(_) => "Children",
            Token::InRule(_, _) => "InRule",
            Token::Custom(_) => "Custom",
        }
    }

    /// Returns the matched text if this is a lexeme.
    pub fn as_lexeme(&self) -> Option<&str> {
        match self {
            Token::Lexeme(text) => Some(text),
            _ => None,
        }
    }
}

impl<U: std::fmt::Display> std::fmt::Display for Token<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Lexeme(text) => write!(f, "{:?}", text),
            Token::Children(items) => {
                let inner = items
                    .iter()
                    .map(|item| item.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "({})", inner)
            }
            Token::InRule(rule, inner) => write!(f, "{}:{}", rule, inner),
            Token::Custom(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_cover_all_variants() {
        assert_eq!(Token::<String>::Lexeme("a".into()).type_name(), "Lexeme");
        assert_eq!(Token::<String>::Children(vec![]).type_name(), "Children");
        let in_rule = Token::InRule("digit".into(), Box::new("7".to_string()));
        assert_eq!(in_rule.type_name(), "InRule");
        assert_eq!(Token::Custom("x".to_string()).type_name(), "Custom");
    }

    #[test]
    fn as_lexeme_extracts_only_lexemes() {
        let lexeme: Token<String> = Token::Lexeme("abc".into());
        assert_eq!(lexeme.as_lexeme(), Some("abc"));
        assert_eq!(Token::<String>::Children(vec![]).as_lexeme(), None);
    }

    #[test]
    fn display_renders_nested_shapes() {
        let children: Token<String> =
            Token::Children(vec!["\"f\"".to_string(), "\"o\"".to_string()]);
        assert_eq!(children.to_string(), "(\"f\" \"o\")");
        let in_rule: Token<String> = Token::InRule("word".into(), Box::new("\"hi\"".to_string()));
        assert_eq!(in_rule.to_string(), "word:\"hi\"");
    }
}
