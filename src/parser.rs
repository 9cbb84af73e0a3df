//! Parser for directive scripts
//!
//! Parsing happens in two steps. The chumsky grammar in `combinators`
//! checks the shape of every statement (`ORDINAL? WORD (LITERAL (',' LITERAL)?)? ';'`)
//! and keeps the byte ranges of what it saw. [`api`] then resolves each
//! statement's keyword against the command table, checks its arity and decodes
//! its literals into [`Directive`](crate::directive::Directive)s.
//!
//! Either step failing aborts the whole parse with a
//! [`SyntaxError`](crate::error::SyntaxError) naming the statement that failed.

pub mod api;
pub(crate) mod combinators;

pub use api::parse;
