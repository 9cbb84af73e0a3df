//! # xdirect
//!
//! A small language of directives for building and editing XML trees, and
//! the engine that runs it.
//!
//! A script is a flat list of statements such as
//!
//! ```text
//! ADD 'catalog'; ADD 'book'; ATTR 'id', '1'; SET 'Dune'; UP;
//! XPATH '/catalog/book'; STRICT '1';
//! ```
//!
//! Each directive acts on every node of the current selection (the cursor)
//! and produces the next selection. `PUSH` and `POP` save and restore
//! selections.
//!
//! The pipeline is:
//! 1. [`lexer`] and [`parser`] turn text into [`Directive`]s
//! 2. [`Script`] (or the [`Directives`] builder) holds them
//! 3. [`runner::apply`] drives the [`engine`] over anything implementing
//!    [`dom::PathQuery`], such as [`xml::XmlDocument`]
//! 4. [`xml::render`] writes the result back out

pub mod arg;
pub mod config;
pub mod directive;
pub mod dom;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod script;
pub mod xml;

pub use arg::Arg;
pub use directive::Directive;
pub use error::{ApplyError, ContentError, Error, ModificationError, SyntaxError, XdResult};
pub use runner::{apply, Runner};
pub use script::{Directives, Script};
