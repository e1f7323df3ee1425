//! Path expression parser
//!
//! Recursive descent over the characters of the expression. The root marker
//! is configurable so templates that use another operand marker can still
//! write queries against it.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::JsonPathError;
use crate::Result;
use std::iter::Peekable;
use std::str::Chars;

/// Default root marker
pub const DEFAULT_ROOT: char = '$';

/// Path expression parser
pub struct Parser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    /// Byte offset of the current character
    position: usize,
    root: char,
}

impl<'a> Parser<'a> {
    /// Create a parser for an expression rooted at `$`
    pub fn new(input: &'a str) -> Result<Self> {
        Self::with_root(input, DEFAULT_ROOT)
    }

    /// Create a parser for an expression rooted at `root`
    pub fn with_root(input: &'a str, root: char) -> Result<Self> {
        if input.is_empty() {
            return Err(JsonPathError::parse("Empty path expression", 0, input).into());
        }

        Ok(Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
            root,
        })
    }

    /// Parse the expression into an AST
    pub fn parse(mut self) -> Result<Expression> {
        self.parse_root()?;
        let mut selectors = Vec::new();
        let mut after_descent = false;

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            let selector = self.parse_selector(after_descent)?;
            after_descent = matches!(selector, Selector::RecursiveDescent);
            selectors.push(selector);
        }

        if after_descent {
            return Err(JsonPathError::parse(
                "Recursive descent must be followed by a selector",
                self.position,
                self.input,
            )
            .into());
        }

        Ok(Expression::new(self.root, selectors))
    }

    fn parse_root(&mut self) -> Result<()> {
        self.skip_whitespace();

        if self.current_char() != Some(self.root) {
            return Err(JsonPathError::syntax(
                format!("Path must start with {}", self.root),
                self.position,
                self.input,
                vec![self.root.to_string()],
                self.describe_current(),
            )
            .into());
        }

        self.advance();
        Ok(())
    }

    fn parse_selector(&mut self, after_descent: bool) -> Result<Selector> {
        match self.current_char() {
            Some('.') if !after_descent => self.parse_dot_selector(),
            Some('[') => self.parse_bracket_selector(),
            Some('*') if after_descent => {
                self.advance();
                Ok(Selector::Wildcard)
            }
            Some(ch) if after_descent && is_identifier_start(ch) => {
                let property = self.parse_identifier()?;
                Ok(Selector::Child(ChildSelector::Property(property)))
            }
            Some(ch) => Err(JsonPathError::syntax(
                "Unexpected character in selector",
                self.position,
                self.input,
                vec![".".to_string(), "[".to_string()],
                ch.to_string(),
            )
            .into()),
            None => Err(JsonPathError::parse("Unexpected end of input", self.position, self.input).into()),
        }
    }

    /// `.name`, `.*` or `..`
    fn parse_dot_selector(&mut self) -> Result<Selector> {
        self.advance();

        match self.current_char() {
            Some('.') => {
                self.advance();
                Ok(Selector::RecursiveDescent)
            }
            Some('*') => {
                self.advance();
                Ok(Selector::Wildcard)
            }
            _ => {
                let property = self.parse_identifier()?;
                Ok(Selector::Child(ChildSelector::Property(property)))
            }
        }
    }

    fn parse_bracket_selector(&mut self) -> Result<Selector> {
        let start_pos = self.position;
        self.advance();
        self.skip_whitespace();

        match self.current_char() {
            Some('?') | Some('(') => {
                return Err(JsonPathError::unsupported(
                    format!("filter and script expressions (at position {})", self.position),
                    Some("a middleware function over the selected values".to_string()),
                )
                .into());
            }
            Some('*') => {
                self.advance();
                self.skip_whitespace();
                self.expect_char(']')?;
                return Ok(Selector::Wildcard);
            }
            Some('\'') | Some('"') => return self.parse_quoted_names(),
            _ => {}
        }

        let mut parts = Vec::new();
        let mut current_part = String::new();

        loop {
            match self.current_char() {
                Some(']') => break,
                Some(',') => {
                    parts.push(std::mem::take(&mut current_part));
                    self.advance();
                }
                Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == ':' => {
                    current_part.push(ch);
                    self.advance();
                }
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some(ch) => {
                    return Err(JsonPathError::syntax(
                        "Invalid character in bracket selector",
                        self.position,
                        self.input,
                        vec!["digit".to_string(), ":".to_string(), ",".to_string(), "]".to_string()],
                        ch.to_string(),
                    )
                    .into());
                }
                None => {
                    return Err(JsonPathError::parse("Unterminated bracket selector", start_pos, self.input).into());
                }
            }
        }
        parts.push(current_part);
        self.expect_char(']')?;

        let mut selectors = parts
            .iter()
            .map(|part| self.parse_index_or_slice(part))
            .collect::<Result<Vec<_>>>()?;

        if selectors.len() == 1 {
            Ok(selectors.remove(0))
        } else {
            Ok(Selector::Union(selectors))
        }
    }

    /// `['a']` or `['a', "b"]`
    fn parse_quoted_names(&mut self) -> Result<Selector> {
        let mut names = Vec::new();

        loop {
            self.skip_whitespace();
            names.push(self.parse_quoted_string()?);
            self.skip_whitespace();
            match self.current_char() {
                Some(',') => {
                    self.advance();
                }
                _ => break,
            }
        }
        self.expect_char(']')?;

        let mut selectors: Vec<Selector> = names
            .into_iter()
            .map(|name| Selector::Child(ChildSelector::QuotedProperty(name)))
            .collect();

        if selectors.len() == 1 {
            Ok(selectors.remove(0))
        } else {
            Ok(Selector::Union(selectors))
        }
    }

    fn parse_index_or_slice(&self, part: &str) -> Result<Selector> {
        if part.is_empty() {
            return Err(JsonPathError::parse("Empty bracket selector", self.position, self.input).into());
        }
        if part.contains(':') {
            self.parse_slice(part)
        } else {
            self.parse_index(part)
        }
    }

    fn parse_slice(&self, s: &str) -> Result<Selector> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() > 3 {
            return Err(JsonPathError::parse(format!("Invalid slice: {}", s), self.position, self.input).into());
        }

        let bound = |raw: &str, what: &str| -> Result<Option<i64>> {
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<i64>().map(Some).map_err(|_| {
                JsonPathError::parse(format!("Invalid slice {}: {}", what, raw), self.position, self.input).into()
            })
        };

        let start = bound(parts[0], "start")?;
        let end = bound(parts.get(1).copied().unwrap_or(""), "end")?;
        let step = bound(parts.get(2).copied().unwrap_or(""), "step")?.unwrap_or(1);

        if step == 0 {
            return Err(JsonPathError::parse("Slice step cannot be zero", self.position, self.input).into());
        }

        Ok(Selector::Slice(SliceSelector { start, end, step }))
    }

    fn parse_index(&self, s: &str) -> Result<Selector> {
        let index: i64 = s.parse().map_err(|_| {
            JsonPathError::parse(format!("Invalid array index: {}", s), self.position, self.input)
        })?;

        let index_selector = if index < 0 {
            IndexSelector::Negative(index.unsigned_abs() as usize)
        } else {
            IndexSelector::Positive(index as usize)
        };

        Ok(Selector::Index(index_selector))
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let mut identifier = String::new();

        if !self.current_char().map(is_identifier_start).unwrap_or(false) {
            return Err(JsonPathError::syntax(
                "Expected identifier",
                self.position,
                self.input,
                vec!["letter or _".to_string()],
                self.describe_current(),
            )
            .into());
        }

        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(identifier)
    }

    fn parse_quoted_string(&mut self) -> Result<String> {
        let start_pos = self.position;
        let quote_char = match self.current_char() {
            Some(ch @ ('\'' | '"')) => ch,
            _ => {
                return Err(JsonPathError::syntax(
                    "Expected quoted name",
                    self.position,
                    self.input,
                    vec!["'".to_string(), "\"".to_string()],
                    self.describe_current(),
                )
                .into());
            }
        };
        self.advance();

        let mut string = String::new();
        let mut escaped = false;

        while let Some(ch) = self.current_char() {
            if escaped {
                match ch {
                    'n' => string.push('\n'),
                    'r' => string.push('\r'),
                    't' => string.push('\t'),
                    '\\' | '\'' | '"' => string.push(ch),
                    _ => {
                        string.push('\\');
                        string.push(ch);
                    }
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                self.advance();
                return Ok(string);
            } else {
                string.push(ch);
            }
            self.advance();
        }

        Err(JsonPathError::parse("Unterminated string literal", start_pos, self.input).into())
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn describe_current(&mut self) -> String {
        self.current_char()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "EOF".to_string())
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn is_at_end(&mut self) -> bool {
        self.current_char().is_none()
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(JsonPathError::syntax(
                format!("Expected '{}'", expected),
                self.position,
                self.input,
                vec![expected.to_string()],
                ch.to_string(),
            )
            .into()),
            None => Err(JsonPathError::parse(
                format!("Expected '{}' but reached end of input", expected),
                self.position,
                self.input,
            )
            .into()),
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn parse(input: &str) -> Expression {
        Parser::new(input).unwrap().parse().unwrap()
    }

    #[test]
    fn test_parse_root() {
        let expr = parse("$");
        assert_eq!(expr.root, '$');
        assert!(expr.selectors.is_empty());
    }

    #[test]
    fn test_parse_nested_property() {
        let expr = parse("$.foo.names");
        assert_eq!(
            expr.selectors,
            vec![
                Selector::Child(ChildSelector::Property("foo".to_string())),
                Selector::Child(ChildSelector::Property("names".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_negative_index() {
        let expr = parse("$.books[-1]");
        assert_eq!(expr.selectors[1], Selector::Index(IndexSelector::Negative(1)));
    }

    #[test]
    fn test_parse_slice_then_property() {
        let expr = parse("$.foo.names[:1].givenName");
        assert_eq!(expr.selectors.len(), 4);
        assert_eq!(
            expr.selectors[2],
            Selector::Slice(SliceSelector { start: None, end: Some(1), step: 1 })
        );
    }

    #[test]
    fn test_parse_slice_with_step() {
        let expr = parse("$[::-2]");
        assert_eq!(
            expr.selectors[0],
            Selector::Slice(SliceSelector { start: None, end: None, step: -2 })
        );
    }

    #[test]
    fn test_parse_recursive_descent() {
        let expr = parse("$..name");
        assert_eq!(expr.selectors[0], Selector::RecursiveDescent);
        assert_eq!(expr.selectors[1], Selector::Child(ChildSelector::Property("name".to_string())));

        let expr = parse("$..*");
        assert_eq!(expr.selectors[1], Selector::Wildcard);

        let expr = parse("$..[0]");
        assert_eq!(expr.selectors[1], Selector::Index(IndexSelector::Positive(0)));
    }

    #[test]
    fn test_parse_bracket_names() {
        let expr = parse("$['first name'][\"last\"]");
        assert_eq!(expr.selectors[0], Selector::Child(ChildSelector::QuotedProperty("first name".to_string())));
        assert_eq!(expr.selectors[1], Selector::Child(ChildSelector::QuotedProperty("last".to_string())));
    }

    #[test]
    fn test_parse_unions() {
        let expr = parse("$.items[0, 2]");
        assert!(matches!(&expr.selectors[1], Selector::Union(parts) if parts.len() == 2));

        let expr = parse("$['a','b']");
        assert!(matches!(&expr.selectors[0], Selector::Union(parts) if parts.len() == 2));
    }

    #[test]
    fn test_parse_wildcards() {
        assert_eq!(parse("$.store.*").selectors[1], Selector::Wildcard);
        assert_eq!(parse("$.store[*]").selectors[1], Selector::Wildcard);
    }

    #[test]
    fn test_parse_hyphenated_identifier() {
        let expr = parse("$.content-type");
        assert_eq!(expr.simple_property_name(), Some("content-type"));
    }

    #[test]
    fn test_custom_root() {
        let expr = Parser::with_root("#.foo", '#').unwrap().parse().unwrap();
        assert_eq!(expr.root, '#');
        assert!(Parser::with_root("$.foo", '#').unwrap().parse().is_err());
    }

    #[test]
    fn test_parse_error_empty_input() {
        assert!(Parser::new("").is_err());
    }

    #[test]
    fn test_parse_error_invalid_start() {
        assert!(Parser::new("invalid").unwrap().parse().is_err());
    }

    #[test]
    fn test_parse_error_trailing_descent() {
        assert!(Parser::new("$.a..").unwrap().parse().is_err());
    }

    #[test]
    fn test_parse_error_unterminated_bracket() {
        assert!(Parser::new("$.test[").unwrap().parse().is_err());
        assert!(Parser::new("$['test").unwrap().parse().is_err());
    }

    #[test]
    fn test_parse_error_zero_step() {
        assert!(Parser::new("$[0:4:0]").unwrap().parse().is_err());
    }

    #[test]
    fn test_filter_is_unsupported() {
        let err = Parser::new("$.books[?(@.price < 10)]").unwrap().parse().unwrap_err();
        assert!(matches!(err, Error::Query(JsonPathError::Unsupported { .. })));
    }
}
