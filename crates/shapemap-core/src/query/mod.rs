//! JSONPath query engine
//!
//! Evaluates path expressions against `serde_json::Value` trees and returns
//! every match in document order. Supported syntax: root, `.name`,
//! `['name']`, `*`, `..`, `[index]`, `[start:end:step]` and unions.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod error;
pub mod executor;
pub mod parser;
pub mod selector;

pub use ast::{ChildSelector, Expression, IndexSelector, Selector, SliceSelector};
pub use error::JsonPathError;
pub use executor::{ExecutionContext, Executor};
pub use parser::{Parser, DEFAULT_ROOT};

use crate::Result;
use serde_json::Value;

/// A parsed path expression, ready to run against any number of sources
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    source: String,
    expression: Expression,
}

impl JsonPath {
    /// Parse an expression rooted at `$`
    pub fn parse(path: &str) -> Result<Self> {
        Self::parse_with_root(path, DEFAULT_ROOT)
    }

    /// Parse an expression rooted at a custom marker
    pub fn parse_with_root(path: &str, root: char) -> Result<Self> {
        let expression = Parser::with_root(path, root)?.parse()?;
        Ok(Self {
            source: path.to_string(),
            expression,
        })
    }

    /// Every match, in document order
    pub fn execute<'a>(&self, data: &'a Value) -> Result<Vec<&'a Value>> {
        Executor::new().execute(&self.expression, data)
    }

    /// The first match, if any
    pub fn execute_single<'a>(&self, data: &'a Value) -> Result<Option<&'a Value>> {
        Executor::new().execute_first(&self.expression, data)
    }

    /// Every match, cloned
    pub fn execute_owned(&self, data: &Value) -> Result<Vec<Value>> {
        Ok(self.execute(data)?.into_iter().cloned().collect())
    }

    pub fn exists(&self, data: &Value) -> Result<bool> {
        Ok(!self.execute(data)?.is_empty())
    }

    /// The text the expression was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse `path` and return every match in `data`
pub fn select<'a>(path: &str, data: &'a Value) -> Result<Vec<&'a Value>> {
    JsonPath::parse(path)?.execute(data)
}

/// Parse `path` and return its first match in `data`
pub fn select_single<'a>(path: &str, data: &'a Value) -> Result<Option<&'a Value>> {
    JsonPath::parse(path)?.execute_single(data)
}

pub fn exists(path: &str, data: &Value) -> Result<bool> {
    JsonPath::parse(path)?.exists(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names() -> Value {
        json!({
            "foo": {"name": {"givenName": "Fred", "surname": "Flintstone"}},
            "bar": {"name": {"givenName": "Wilma", "surname": "Flintstone"}},
            "aaa": {"name": {"givenName": "Barney", "surname": "Rubble"}}
        })
    }

    #[test]
    fn test_simple_dot_notation() {
        let data = json!({"store": {"book": [{"title": "A"}, {"title": "B"}]}});
        let results = select("$.store.book", &data).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_array());
    }

    #[test]
    fn test_recursive_descent_document_order() {
        let data = names();
        let results = select("$..givenName", &data).unwrap();
        assert_eq!(results, vec![&json!("Fred"), &json!("Wilma"), &json!("Barney")]);
    }

    #[test]
    fn test_recursive_descent_matches_root_member() {
        let data = json!({"author": "Root", "book": [{"author": "A"}, {"author": "B"}]});
        let results = select("$..author", &data).unwrap();
        assert_eq!(results, vec![&json!("Root"), &json!("A"), &json!("B")]);
    }

    #[test]
    fn test_slice_then_member() {
        let data = json!({"names": [{"given": "Fred"}, {"given": "Wilma"}, {"given": "Barney"}]});
        assert_eq!(select("$.names[:1].given", &data).unwrap(), vec![&json!("Fred")]);
        assert_eq!(select("$.names[-1].given", &data).unwrap(), vec![&json!("Barney")]);
        assert_eq!(select("$.names[*].given", &data).unwrap().len(), 3);
    }

    #[test]
    fn test_select_single_and_exists() {
        let data = json!({"title": "Test Book"});
        assert_eq!(select_single("$.title", &data).unwrap(), Some(&json!("Test Book")));
        assert_eq!(select_single("$.missing", &data).unwrap(), None);
        assert!(exists("$.title", &data).unwrap());
        assert!(!exists("$.missing", &data).unwrap());
    }

    #[test]
    fn test_parse_keeps_source_text() {
        let path = JsonPath::parse("$.foo['bar baz']").unwrap();
        assert_eq!(path.as_str(), "$.foo['bar baz']");
        assert_eq!(path.to_string(), "$.foo['bar baz']");
        assert_eq!(path.expression().selectors.len(), 2);
    }

    #[test]
    fn test_execute_owned() {
        let data = json!({"a": [1, 2]});
        let path = JsonPath::parse_with_root("#.a[*]", '#').unwrap();
        assert_eq!(path.execute_owned(&data).unwrap(), vec![json!(1), json!(2)]);
    }
}
