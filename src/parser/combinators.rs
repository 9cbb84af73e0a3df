//! Parser combinator functions for the statement grammar.

use chumsky::prelude::*;
use std::ops::Range;

use crate::lexer::Token;

/// Type alias for token with location
pub(crate) type TokenLocation = (Token, Range<usize>);

/// Type alias for parser error
pub(crate) type ParserError = Simple<TokenLocation>;

/// A piece of source text with its byte range.
pub(crate) type Spanned<T> = (T, Range<usize>);

/// One statement as written, before its keyword and literals are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawStatement {
    /// Byte range from the ordinal (or keyword) up to, not including, the `;`
    pub(crate) span: Range<usize>,
    pub(crate) keyword: Spanned<String>,
    /// Literals with their quotes still in place
    pub(crate) arguments: Vec<Spanned<String>>,
}

/// Helper: match a specific token type, keeping its location
pub(crate) fn token(t: Token) -> impl Parser<TokenLocation, Range<usize>, Error = ParserError> + Clone {
    filter(move |(tok, _): &TokenLocation| tok == &t).map(|(_, range)| range)
}

/// A command keyword candidate
pub(crate) fn word() -> impl Parser<TokenLocation, Spanned<String>, Error = ParserError> + Clone {
    select! { (Token::Word(name), range) => (name, range) }
}

/// A quoted literal, undecoded
pub(crate) fn literal() -> impl Parser<TokenLocation, Spanned<String>, Error = ParserError> + Clone
{
    select! { (Token::Literal(quoted), range) => (quoted, range) }
}

/// Zero, one, or two comma-separated literals
pub(crate) fn arguments(
) -> impl Parser<TokenLocation, Vec<Spanned<String>>, Error = ParserError> + Clone {
    literal()
        .then(token(Token::Comma).ignore_then(literal()).or_not())
        .map(|(first, second)| {
            let mut arguments = vec![first];
            arguments.extend(second);
            arguments
        })
        .or_not()
        .map(Option::unwrap_or_default)
}

/// Parse a single statement including its terminating `;`
pub(crate) fn statement() -> impl Parser<TokenLocation, RawStatement, Error = ParserError> + Clone
{
    token(Token::Ordinal)
        .or_not()
        .then(word())
        .then(arguments())
        .then(token(Token::Semicolon))
        .map(|(((ordinal, keyword), arguments), terminator)| {
            let start = ordinal.map_or(keyword.1.start, |range| range.start);
            RawStatement {
                span: start..terminator.start,
                keyword,
                arguments,
            }
        })
}

/// Parse a whole script
pub(crate) fn script() -> impl Parser<TokenLocation, Vec<RawStatement>, Error = ParserError> + Clone
{
    statement().repeated().then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize_with_spans;

    fn lex(source: &str) -> Vec<TokenLocation> {
        tokenize_with_spans(source)
            .into_iter()
            .map(|(result, range)| (result.unwrap(), range))
            .collect()
    }

    #[test]
    fn test_zero_argument_statement() {
        let statements = script().parse(lex("UP;")).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].keyword.0, "UP");
        assert!(statements[0].arguments.is_empty());
        assert_eq!(statements[0].span, 0..2);
    }

    #[test]
    fn test_two_argument_statement() {
        let statements = script().parse(lex("ATTR 'a' , \"b\";")).unwrap();
        let quoted: Vec<&str> = statements[0]
            .arguments
            .iter()
            .map(|(text, _)| text.as_str())
            .collect();
        assert_eq!(quoted, vec!["'a'", "\"b\""]);
    }

    #[test]
    fn test_ordinal_is_part_of_the_statement_span() {
        let source = "UP; 1:POP;";
        let statements = script().parse(lex(source)).unwrap();
        assert_eq!(&source[statements[1].span.clone()], "1:POP");
    }

    #[test]
    fn test_missing_terminator_fails() {
        assert!(script().parse(lex("UP")).is_err());
        assert!(script().parse(lex("UP; ADD 'x'")).is_err());
    }

    #[test]
    fn test_three_arguments_fail() {
        assert!(script().parse(lex("PI 'a', 'b', 'c';")).is_err());
    }

    #[test]
    fn test_stray_semicolon_fails_at_itself() {
        let errors = script().parse(lex("UP;;")).unwrap_err();
        let found = errors[0].found().map(|(token, range)| (token.clone(), range.clone()));
        assert_eq!(found, Some((Token::Semicolon, 3..4)));
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(script().parse(lex("")).unwrap(), vec![]);
    }
}
