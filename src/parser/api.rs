//! Public API for the parser.

use chumsky::prelude::*;
use std::ops::Range;

use crate::arg::{decode, Arg};
use crate::directive::{arity, Directive};
use crate::error::SyntaxError;
use crate::lexer::{tokenize_with_spans, Token};
use crate::parser::combinators::{script, ParserError, RawStatement, TokenLocation};

/// Parse a script into its directives.
///
/// Ordinal labels are ignored. Empty or whitespace-only input yields no
/// directives. Nothing is returned unless every statement is valid.
pub fn parse(source: &str) -> Result<Vec<Directive>, SyntaxError> {
    let tokens = lex(source)?;
    let statements = script()
        .parse(tokens.clone())
        .map_err(|errors| structural_error(source, &tokens, errors))?;
    statements
        .iter()
        .map(|statement| interpret(source, statement))
        .collect()
}

/// Turn the lexer output into parser input, failing on the first bad token.
fn lex(source: &str) -> Result<Vec<TokenLocation>, SyntaxError> {
    let mut tokens = Vec::new();
    for (result, range) in tokenize_with_spans(source) {
        match result {
            Ok(token) => tokens.push((token, range)),
            Err(()) => {
                let slice = &source[range.clone()];
                let message = if slice.starts_with('\'') || slice.starts_with('"') {
                    "unterminated literal".to_string()
                } else {
                    format!("unexpected character `{}`", slice)
                };
                return Err(SyntaxError::new(
                    fragment_around(source, &tokens, range.start),
                    message,
                ));
            }
        }
    }
    Ok(tokens)
}

/// Byte range of the statement containing byte `position`.
///
/// Bounded by the last `;` before `position` and the first `;` at or after it.
fn statement_range(source: &str, tokens: &[TokenLocation], position: usize) -> Range<usize> {
    let start = tokens
        .iter()
        .filter(|(token, range)| *token == Token::Semicolon && range.end <= position)
        .map(|(_, range)| range.end)
        .last()
        .unwrap_or(0);
    let end = tokens
        .iter()
        .find(|(token, range)| *token == Token::Semicolon && range.start >= position)
        .map(|(_, range)| range.start)
        .unwrap_or(source.len());
    start..end
}

/// Like [`statement_range`] for a lexing failure, where only the tokens before
/// `position` exist and the rest of the source has to be searched directly.
fn fragment_around(source: &str, tokens: &[TokenLocation], position: usize) -> String {
    let start = statement_range(source, tokens, position).start;
    let end = source[position..]
        .find(';')
        .map_or(source.len(), |offset| position + offset);
    source[start..end].trim().to_string()
}

fn structural_error(source: &str, tokens: &[TokenLocation], errors: Vec<ParserError>) -> SyntaxError {
    let Some(error) = errors.into_iter().next() else {
        return SyntaxError::new(source.trim(), "unparseable script");
    };
    let position = error
        .found()
        .map_or(source.len(), |(_, range)| range.start);
    let range = statement_range(source, tokens, position);
    let fragment = match source[range.clone()].trim() {
        "" => preceding_statement(source, tokens, range.start),
        text => text.to_string(),
    };

    // A statement that does not open with a command is reported as such,
    // whatever the grammar tripped over afterwards.
    if let Some(keyword) = leading_word(tokens, &range) {
        if arity(&keyword).is_none() {
            return SyntaxError::new(fragment, format!("unknown command '{}'", keyword));
        }
    }

    let message = match error.found() {
        Some((token, _)) => format!("unexpected {}", token),
        None => "unexpected end of script".to_string(),
    };
    SyntaxError::new(fragment, message)
}

/// Names an empty statement by the one before it, or by the stray `;` when
/// nothing precedes it.
fn preceding_statement(source: &str, tokens: &[TokenLocation], before: usize) -> String {
    let previous = tokens
        .iter()
        .filter(|(token, range)| *token == Token::Semicolon && range.end <= before)
        .last();
    match previous {
        Some((_, semicolon)) => match source[statement_range(source, tokens, semicolon.start)].trim() {
            "" => ";".to_string(),
            text => text.to_string(),
        },
        None => ";".to_string(),
    }
}

/// First word of a statement, skipping an ordinal label.
fn leading_word(tokens: &[TokenLocation], within: &Range<usize>) -> Option<String> {
    tokens
        .iter()
        .filter(|(_, range)| range.start >= within.start && range.end <= within.end)
        .find(|(token, _)| *token != Token::Ordinal)
        .and_then(|(token, _)| match token {
            Token::Word(word) => Some(word.clone()),
            _ => None,
        })
}

/// Resolve a statement against the command table.
fn interpret(source: &str, statement: &RawStatement) -> Result<Directive, SyntaxError> {
    let fail = |message: String| SyntaxError::new(source[statement.span.clone()].trim(), message);
    let keyword = statement.keyword.0.as_str();

    let expected = arity(keyword).ok_or_else(|| fail(format!("unknown command '{}'", keyword)))?;
    let found = statement.arguments.len();
    if expected != found {
        return Err(fail(format!(
            "{} expects {} argument{}, found {}",
            keyword,
            expected,
            if expected == 1 { "" } else { "s" },
            found
        )));
    }

    let mut arguments = Vec::with_capacity(found);
    for (quoted, _) in &statement.arguments {
        let arg = decode(quoted)
            .and_then(Arg::new)
            .map_err(|err| fail(err.to_string()))?;
        arguments.push(arg);
    }

    let directive = match (keyword, arguments.as_slice()) {
        ("REMOVE", []) => Directive::Remove,
        ("UP", []) => Directive::Up,
        ("PUSH", []) => Directive::Push,
        ("POP", []) => Directive::Pop,
        ("ADD", [name]) => Directive::Add(name.clone()),
        ("ADDIF", [name]) => Directive::AddIfAbsent(name.clone()),
        ("SET", [text]) => Directive::SetText(text.clone()),
        ("XSET", [query]) => Directive::SetComputedText(query.clone()),
        ("COMMENT", [text]) => Directive::AddComment(text.clone()),
        ("CDATA", [text]) => Directive::AddCData(text.clone()),
        ("NS", [uri]) => Directive::AddNamespace(uri.clone()),
        ("XPATH", [query]) => Directive::NavigateTo(query.clone()),
        ("STRICT", [count]) => {
            let count = count
                .raw()
                .parse::<usize>()
                .map_err(|_| fail(format!("'{}' is not a valid node count", count.raw())))?;
            Directive::AssertCount(count)
        }
        ("ATTR", [name, value]) => Directive::SetAttr {
            name: name.clone(),
            value: value.clone(),
        },
        ("XATTR", [name, query]) => Directive::SetComputedAttr {
            name: name.clone(),
            query: query.clone(),
        },
        ("PI", [target, data]) => Directive::AddProcessingInstruction {
            target: target.clone(),
            data: data.clone(),
        },
        _ => return Err(fail(format!("unknown command '{}'", keyword))),
    };
    Ok(directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse(" \n\t ").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_all_arities() {
        let directives = parse("ADD 'root'; ATTR 'id', \"1\"; UP;").unwrap();
        assert_eq!(
            directives,
            vec![
                Directive::add("root").unwrap(),
                Directive::attr("id", "1").unwrap(),
                Directive::Up,
            ]
        );
    }

    #[test]
    fn test_parse_ignores_ordinals() {
        assert_eq!(
            parse("0:ADD 'a';\n1:UP;").unwrap(),
            parse("ADD 'a'; UP;").unwrap()
        );
    }

    #[test]
    fn test_parse_decodes_entities() {
        assert_eq!(
            parse("SET '&lt;x&gt; &amp; &apos;y&apos;';").unwrap(),
            vec![Directive::set("<x> & 'y'").unwrap()]
        );
    }

    #[test]
    fn test_semicolon_inside_quotes() {
        assert_eq!(
            parse("SET 'a; b'; UP;").unwrap(),
            vec![Directive::set("a; b").unwrap(), Directive::Up]
        );
    }

    #[test]
    fn test_strict_count() {
        assert_eq!(parse("STRICT '3';").unwrap(), vec![Directive::strict(3)]);
        let error = parse("STRICT 'many';").unwrap_err();
        assert_eq!(error.fragment, "STRICT 'many'");
        assert_eq!(error.message, "'many' is not a valid node count");
    }

    #[test]
    fn test_unknown_command() {
        let error = parse("UP; FOO 'x'; UP;").unwrap_err();
        assert_eq!(error.fragment, "FOO 'x'");
        assert_eq!(error.message, "unknown command 'FOO'");
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let error = parse("add 'x';").unwrap_err();
        assert_eq!(error.message, "unknown command 'add'");
    }

    #[test]
    fn test_wrong_arity() {
        let error = parse("ATTR 'x';").unwrap_err();
        assert_eq!(error.fragment, "ATTR 'x'");
        assert_eq!(error.message, "ATTR expects 2 arguments, found 1");

        let error = parse("UP 'x';").unwrap_err();
        assert_eq!(error.message, "UP expects 0 arguments, found 1");
    }

    #[test]
    fn test_bad_entity_is_a_syntax_error() {
        let error = parse("ADD 'a'; SET 'x &bogus; y';").unwrap_err();
        assert_eq!(error.fragment, "SET 'x &bogus; y'");
        assert_eq!(error.message, "unknown entity `&bogus;`");
    }

    #[test]
    fn test_illegal_character_is_a_syntax_error() {
        let error = parse("SET 'a\u{1}';").unwrap_err();
        assert_eq!(error.message, "character #01 is illegal in XML");
    }

    #[test]
    fn test_unterminated_literal() {
        let error = parse("ADD 'a'; ADD 'b;").unwrap_err();
        assert_eq!(error.message, "unterminated literal");
        assert!(error.fragment.starts_with("ADD 'b"));
    }

    #[test]
    fn test_unexpected_character() {
        let error = parse("ADD 'a'; @;").unwrap_err();
        assert_eq!(error.fragment, "@");
        assert_eq!(error.message, "unexpected character `@`");
    }

    #[test]
    fn test_trailing_garbage() {
        let error = parse("ADD 'a' 'b'; UP;").unwrap_err();
        assert_eq!(error.fragment, "ADD 'a' 'b'");
    }

    #[test]
    fn test_free_text_is_rejected() {
        let error = parse("not a valid script at all").unwrap_err();
        assert_eq!(error.fragment, "not a valid script at all");
        assert_eq!(error.message, "unknown command 'not'");
    }

    #[test]
    fn test_missing_final_semicolon() {
        let error = parse("ADD 'a'; UP").unwrap_err();
        assert_eq!(error.fragment, "UP");
    }
}
