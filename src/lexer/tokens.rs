//! Token definitions for directive scripts

use logos::Logos;
use std::fmt;

/// All tokens of the directive language.
///
/// Whitespace (including line breaks) is insignificant and skipped.
#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    /// Display label such as `12:`, ignored by the parser
    #[regex(r"[0-9]+:")]
    Ordinal,

    /// Quoted literal, quotes and entities kept verbatim
    #[regex(r#""[^"]*""#, |lex| lex.slice().to_string())]
    #[regex(r"'[^']*'", |lex| lex.slice().to_string())]
    Literal(String),

    /// Command keyword candidate
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Semicolon => write!(f, "';'"),
            Token::Comma => write!(f, "','"),
            Token::Ordinal => write!(f, "ordinal"),
            Token::Literal(literal) => write!(f, "literal {}", literal),
            Token::Word(word) => write!(f, "'{}'", word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Token::Semicolon.to_string(), "';'");
        assert_eq!(Token::Word("ADD".to_string()).to_string(), "'ADD'");
        assert_eq!(
            Token::Literal("\"x\"".to_string()).to_string(),
            "literal \"x\""
        );
    }
}
