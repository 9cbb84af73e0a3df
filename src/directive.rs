//! The directive model.
//!
//! A [`Directive`] is one statement of a script. The set of commands is closed:
//! the engine matches on every variant, so a new command is a new variant plus
//! one execution arm.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::arg::Arg;
use crate::error::ContentError;

/// Every keyword of the language with the number of quoted arguments it takes.
pub const COMMANDS: &[(&str, usize)] = &[
    ("ADD", 1),
    ("ADDIF", 1),
    ("REMOVE", 0),
    ("SET", 1),
    ("ATTR", 2),
    ("XATTR", 2),
    ("XSET", 1),
    ("COMMENT", 1),
    ("CDATA", 1),
    ("PI", 2),
    ("NS", 1),
    ("UP", 0),
    ("XPATH", 1),
    ("STRICT", 1),
    ("PUSH", 0),
    ("POP", 0),
];

/// Number of arguments `keyword` takes, or `None` for an unknown keyword.
pub fn arity(keyword: &str) -> Option<usize> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == keyword)
        .map(|(_, count)| *count)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// `ADD`: append a new element to every current node.
    Add(Arg),
    /// `ADDIF`: reuse a same-named child (ignoring ASCII case) or create it.
    AddIfAbsent(Arg),
    /// `REMOVE`: detach the current nodes and move to their parents.
    Remove,
    /// `SET`: replace the text content.
    SetText(Arg),
    /// `ATTR`
    SetAttr { name: Arg, value: Arg },
    /// `XATTR`: attribute value computed by a query relative to each node.
    SetComputedAttr { name: Arg, query: Arg },
    /// `XSET`: text computed by a query relative to each node.
    SetComputedText(Arg),
    /// `COMMENT`
    AddComment(Arg),
    /// `CDATA`
    AddCData(Arg),
    /// `PI`: before the document element when nothing is selected.
    AddProcessingInstruction { target: Arg, data: Arg },
    /// `NS`: sets the `xmlns` attribute.
    AddNamespace(Arg),
    /// `UP`
    Up,
    /// `XPATH`: select nodes from the document root.
    NavigateTo(Arg),
    /// `STRICT`: fail unless exactly `n` nodes are selected.
    AssertCount(usize),
    /// `PUSH`
    Push,
    /// `POP`
    Pop,
}

impl Directive {
    pub fn add(name: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::Add(Arg::new(name)?))
    }

    pub fn add_if_absent(name: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::AddIfAbsent(Arg::new(name)?))
    }

    pub fn set(text: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::SetText(Arg::new(text)?))
    }

    pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::SetAttr {
            name: Arg::new(name)?,
            value: Arg::new(value)?,
        })
    }

    pub fn xattr(name: impl Into<String>, query: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::SetComputedAttr {
            name: Arg::new(name)?,
            query: Arg::new(query)?,
        })
    }

    pub fn xset(query: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::SetComputedText(Arg::new(query)?))
    }

    pub fn comment(text: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::AddComment(Arg::new(text)?))
    }

    pub fn cdata(text: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::AddCData(Arg::new(text)?))
    }

    pub fn pi(target: impl Into<String>, data: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::AddProcessingInstruction {
            target: Arg::new(target)?,
            data: Arg::new(data)?,
        })
    }

    pub fn ns(uri: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::AddNamespace(Arg::new(uri)?))
    }

    pub fn xpath(query: impl Into<String>) -> Result<Self, ContentError> {
        Ok(Directive::NavigateTo(Arg::new(query)?))
    }

    /// `STRICT` takes no content, so it cannot fail.
    pub fn strict(count: usize) -> Self {
        Directive::AssertCount(count)
    }

    /// The script keyword of this directive.
    pub fn keyword(&self) -> &'static str {
        match self {
            Directive::Add(_) => "ADD",
            Directive::AddIfAbsent(_) => "ADDIF",
            Directive::Remove => "REMOVE",
            Directive::SetText(_) => "SET",
            Directive::SetAttr { .. } => "ATTR",
            Directive::SetComputedAttr { .. } => "XATTR",
            Directive::SetComputedText(_) => "XSET",
            Directive::AddComment(_) => "COMMENT",
            Directive::AddCData(_) => "CDATA",
            Directive::AddProcessingInstruction { .. } => "PI",
            Directive::AddNamespace(_) => "NS",
            Directive::Up => "UP",
            Directive::NavigateTo(_) => "XPATH",
            Directive::AssertCount(_) => "STRICT",
            Directive::Push => "PUSH",
            Directive::Pop => "POP",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = self.keyword();
        match self {
            Directive::Remove | Directive::Up | Directive::Push | Directive::Pop => {
                write!(f, "{}", keyword)
            }
            Directive::Add(arg)
            | Directive::AddIfAbsent(arg)
            | Directive::SetText(arg)
            | Directive::SetComputedText(arg)
            | Directive::AddComment(arg)
            | Directive::AddCData(arg)
            | Directive::AddNamespace(arg)
            | Directive::NavigateTo(arg) => write!(f, "{} {}", keyword, arg),
            Directive::SetAttr { name, value } => write!(f, "{} {}, {}", keyword, name, value),
            Directive::SetComputedAttr { name, query } => {
                write!(f, "{} {}, {}", keyword, name, query)
            }
            Directive::AddProcessingInstruction { target, data } => {
                write!(f, "{} {}, {}", keyword, target, data)
            }
            Directive::AssertCount(count) => write!(f, "{} \"{}\"", keyword, count),
        }
    }
}
