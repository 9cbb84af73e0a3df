//! Error types for every stage of the pipeline.
//!
//! Parsing fails with [`SyntaxError`], argument validation with
//! [`ContentError`], execution with [`ModificationError`] (wrapped into a
//! positioned [`ApplyError`] by the runner) and serialization with
//! [`RenderError`]. [`Error`] gathers all of them for callers that do not care
//! which stage failed.

use thiserror::Error;

/// An argument value that cannot be carried by a directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("character #{code:02X} is illegal in XML")]
    IllegalCharacter { code: u32 },

    #[error("literal {0} is not enclosed in quotes")]
    Unquoted(String),

    #[error("entity starting at `{0}` is not terminated by ';'")]
    UnterminatedEntity(String),

    #[error("unknown entity `&{0};`")]
    UnknownEntity(String),

    #[error("invalid character reference `&{0};`")]
    InvalidReference(String),
}

/// A script that does not follow the directive grammar.
///
/// `fragment` is the trimmed source of the statement that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error in `{fragment}`: {message}")]
pub struct SyntaxError {
    pub fragment: String,
    pub message: String,
}

impl SyntaxError {
    pub fn new(fragment: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            message: message.into(),
        }
    }
}

/// Refusals raised by a tree backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("'{0}' is not a valid XML name")]
    InvalidName(String),

    #[error("cannot {operation} {path}")]
    Unsupported {
        operation: &'static str,
        path: String,
    },

    #[error("document already has a root element '{0}'")]
    DuplicateDocumentElement(String),

    #[error("node {0} is not attached to a parent")]
    Detached(String),
}

/// Failures of the path-query evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("malformed query `{expr}`: {reason}")]
    Malformed { expr: String, reason: String },

    #[error("query `{expr}` failed: {reason}")]
    Evaluation { expr: String, reason: String },

    #[error("query `{expr}` does not select nodes")]
    NotANodeSet { expr: String },
}

/// A directive whose preconditions do not hold against the current tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModificationError {
    #[error("there is no parent node at {path}, can't {action}")]
    NoParent {
        path: String,
        action: &'static str,
    },

    #[error("stack is empty, can't POP")]
    EmptyStack,

    #[error("{message}")]
    Cardinality {
        expected: usize,
        actual: usize,
        message: String,
    },

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// The first directive of a script that failed, with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("directive #{position} `{directive}` failed: {cause}")]
pub struct ApplyError {
    pub position: usize,
    pub directive: String,
    #[source]
    pub cause: ModificationError,
}

/// Serializer failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("failed to write document: {0}")]
    Write(String),

    #[error("failed to indent document: {0}")]
    Indent(String),

    #[error("failed to parse document: {0}")]
    Parse(String),
}

/// Any failure the crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type XdResult<T> = Result<T, Error>;
