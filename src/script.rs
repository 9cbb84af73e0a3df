//! Scripts and the script builder.
//!
//! A [`Script`] is the frozen, shareable form of a directive sequence. It is
//! what the runner executes and it never changes once built. [`Directives`] is
//! the builder: every method appends through a mutex, so one builder can be
//! filled from several threads before [`Directives::freeze`] hands out the
//! finished script.
//!
//! Both render the same canonical text: statements joined by `;` with no
//! spaces, wrapped onto a new `N:`-labelled line once a line grows past
//! [`MARGIN`] characters. The labels are ignored when the text is parsed back.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::directive::Directive;
use crate::error::{ContentError, SyntaxError};
use crate::parser;

/// Width after which canonical text starts a new line.
pub const MARGIN: usize = 80;

/// An immutable directive sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Directive>", into = "Vec<Directive>")]
pub struct Script {
    directives: Arc<[Directive]>,
}

impl Script {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self {
            directives: directives.into(),
        }
    }

    /// Parse script text, see [`parser::parse`].
    pub fn parse(source: &str) -> Result<Self, SyntaxError> {
        parser::parse(source).map(Self::new)
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FromStr for Script {
    type Err = SyntaxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl From<Vec<Directive>> for Script {
    fn from(directives: Vec<Directive>) -> Self {
        Self::new(directives)
    }
}

impl From<Script> for Vec<Directive> {
    fn from(script: Script) -> Self {
        script.directives.to_vec()
    }
}

impl FromIterator<Directive> for Script {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical(&self.directives))
    }
}

fn canonical(directives: &[Directive]) -> String {
    let mut text = String::new();
    let mut width = 0;
    for (idx, directive) in directives.iter().enumerate() {
        if idx > 0 && width == 0 {
            text.push('\n');
            text.push_str(&idx.to_string());
            text.push(':');
        }
        let statement = directive.to_string();
        text.push_str(&statement);
        text.push(';');
        width += statement.chars().count();
        if width > MARGIN {
            width = 0;
        }
    }
    text.trim().to_string()
}

/// Thread-safe script builder.
///
/// Methods take `&self` and return `&Self` so calls chain; the ones that carry
/// content validate it and return `Result<&Self, ContentError>`.
#[derive(Debug, Default)]
pub struct Directives {
    all: Mutex<Vec<Directive>>,
}

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from parsed script text.
    pub fn parse(source: &str) -> Result<Self, SyntaxError> {
        let directives = Self::new();
        directives.append(parser::parse(source)?);
        Ok(directives)
    }

    fn append_one(&self, directive: Directive) -> &Self {
        self.all.lock().push(directive);
        self
    }

    /// Append every directive of `directives`, keeping their order.
    pub fn append(&self, directives: impl IntoIterator<Item = Directive>) -> &Self {
        let directives: Vec<Directive> = directives.into_iter().collect();
        self.all.lock().extend(directives);
        self
    }

    pub fn add(&self, name: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::add(name)?))
    }

    /// One child per entry, named by the key and holding the value as text.
    /// The cursor ends where it started.
    pub fn add_map<K, V>(&self, entries: impl IntoIterator<Item = (K, V)>) -> Result<&Self, ContentError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut batch = Vec::new();
        for (key, value) in entries {
            batch.push(Directive::add(key)?);
            batch.push(Directive::set(value)?);
            batch.push(Directive::Up);
        }
        Ok(self.append(batch))
    }

    pub fn addif(&self, name: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::add_if_absent(name)?))
    }

    pub fn remove(&self) -> &Self {
        self.append_one(Directive::Remove)
    }

    pub fn set(&self, text: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::set(text)?))
    }

    pub fn xset(&self, query: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::xset(query)?))
    }

    pub fn attr(&self, name: impl Into<String>, value: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::attr(name, value)?))
    }

    pub fn xattr(&self, name: impl Into<String>, query: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::xattr(name, query)?))
    }

    pub fn comment(&self, text: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::comment(text)?))
    }

    pub fn cdata(&self, text: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::cdata(text)?))
    }

    pub fn pi(&self, target: impl Into<String>, data: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::pi(target, data)?))
    }

    pub fn ns(&self, uri: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::ns(uri)?))
    }

    pub fn up(&self) -> &Self {
        self.append_one(Directive::Up)
    }

    pub fn xpath(&self, query: impl Into<String>) -> Result<&Self, ContentError> {
        Ok(self.append_one(Directive::xpath(query)?))
    }

    pub fn strict(&self, count: usize) -> &Self {
        self.append_one(Directive::strict(count))
    }

    pub fn push(&self) -> &Self {
        self.append_one(Directive::Push)
    }

    pub fn pop(&self) -> &Self {
        self.append_one(Directive::Pop)
    }

    pub fn len(&self) -> usize {
        self.all.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.lock().is_empty()
    }

    /// Snapshot the directives appended so far.
    pub fn freeze(&self) -> Script {
        Script::new(self.all.lock().clone())
    }
}

impl Clone for Directives {
    fn clone(&self) -> Self {
        Self {
            all: Mutex::new(self.all.lock().clone()),
        }
    }
}

impl From<Script> for Directives {
    fn from(script: Script) -> Self {
        Self {
            all: Mutex::new(script.into()),
        }
    }
}

impl IntoIterator for Directives {
    type Item = Directive;
    type IntoIter = std::vec::IntoIter<Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.all.into_inner().into_iter()
    }
}

impl fmt::Display for Directives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical(&self.all.lock()))
    }
}
