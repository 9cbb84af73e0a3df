//! Argument literals.
//!
//! Every argument in a script is a quoted literal. Inside the quotes the five
//! XML-reserved characters appear as named entities and control characters as
//! decimal character references, so a literal can always be written back out
//! and read again without loss. [`Arg`] is the decoded, validated value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ContentError;

/// Whether `c` may appear in an XML document.
///
/// Excludes the C0 controls other than tab, line feed and carriage return,
/// plus the discouraged C1 ranges (NEL at U+0085 stays legal).
pub fn is_legal(c: char) -> bool {
    !matches!(
        c as u32,
        0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F..=0x84 | 0x86..=0x9F
    )
}

/// Reject the first illegal character of `value`, if any.
pub fn check(value: &str) -> Result<(), ContentError> {
    match value.chars().find(|c| !is_legal(*c)) {
        Some(c) => Err(ContentError::IllegalCharacter { code: c as u32 }),
        None => Ok(()),
    }
}

/// Replace reserved characters with entities and controls with `&#N;`.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("&#{};", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Escape `raw` and wrap it in double quotes.
pub fn encode(raw: &str) -> String {
    format!("\"{}\"", escape(raw))
}

/// Strip the surrounding quotes of `literal` and resolve its entities.
///
/// The first and last characters are dropped without looking at them; the
/// tokenizer is responsible for quote balancing.
pub fn decode(literal: &str) -> Result<String, ContentError> {
    let mut chars = literal.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => unescape(chars.as_str()),
        _ => Err(ContentError::Unquoted(literal.to_string())),
    }
}

/// Resolve `&name;`, `&#N;` and `&#xH;` sequences in `text`.
pub fn unescape(text: &str) -> Result<String, ContentError> {
    let mut raw = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        raw.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let semicolon = tail
            .find(';')
            .ok_or_else(|| ContentError::UnterminatedEntity(rest[amp..].to_string()))?;
        raw.push(resolve(&tail[..semicolon])?);
        rest = &tail[semicolon + 1..];
    }
    raw.push_str(rest);
    Ok(raw)
}

fn resolve(entity: &str) -> Result<char, ContentError> {
    match entity {
        "apos" => Ok('\''),
        "quot" => Ok('"'),
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "amp" => Ok('&'),
        _ => match entity.strip_prefix('#') {
            Some(number) => {
                let code = match number
                    .strip_prefix('x')
                    .or_else(|| number.strip_prefix('X'))
                {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| ContentError::InvalidReference(entity.to_string()))
            }
            None => Err(ContentError::UnknownEntity(entity.to_string())),
        },
    }
}

/// A directive argument: any string made of legal XML characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Arg(String);

impl Arg {
    pub fn new(value: impl Into<String>) -> Result<Self, ContentError> {
        let value = value.into();
        check(&value)?;
        Ok(Self(value))
    }

    /// The unescaped value.
    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn into_raw(self) -> String {
        self.0
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(&self.0))
    }
}

impl AsRef<str> for Arg {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Arg {
    type Error = ContentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Arg {
    type Error = ContentError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Arg> for String {
    fn from(arg: Arg) -> Self {
        arg.0
    }
}
