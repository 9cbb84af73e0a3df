//! Lexer for directive scripts
//!
//! Tokenization is done entirely by logos. A script is a flat sequence of
//! statements, so there is no transformation pass: the parser consumes the
//! raw tokens with their byte ranges.
//!
//! Quoted literals are lexed as one token, which is what keeps a `;` inside a
//! quoted argument from ending the statement. A quote that is never closed
//! cannot be lexed and surfaces as a lexing failure.

pub mod lexer_impl;
pub mod tokens;

pub use lexer_impl::{tokenize, tokenize_with_spans};
pub use tokens::Token;
