//! Core tokenization implementation for the directive lexer

use std::ops::Range;

use crate::lexer::tokens::Token;
use logos::Logos;

/// Tokenize a script, keeping failures and byte ranges.
///
/// A failed token carries the span logos could not match, so the parser can
/// report which statement it belongs to.
pub fn tokenize_with_spans(source: &str) -> Vec<(Result<Token, ()>, Range<usize>)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        tokens.push((result, lexer.span()));
    }

    tokens
}

/// Tokenize a script, dropping anything that failed to lex.
pub fn tokenize(source: &str) -> Vec<Token> {
    tokenize_with_spans(source)
        .into_iter()
        .filter_map(|(result, _)| result.ok())
        .collect()
}
