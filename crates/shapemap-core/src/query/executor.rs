//! Path expression executor
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use super::ast::Expression;
use super::selector::SelectorExecutor;
use crate::Result;
use serde_json::Value;

/// Limits applied while executing an expression
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Deepest nesting recursive descent may visit
    pub max_depth: usize,
    /// Maximum number of matches to return (0 = unlimited)
    pub max_results: usize,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_results: 0,
        }
    }
}

/// Evaluates parsed expressions against JSON values
#[derive(Debug, Clone, Default)]
pub struct Executor {
    context: ExecutionContext,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: ExecutionContext) -> Self {
        Self { context }
    }

    /// Execute an expression, returning matches in document order
    pub fn execute<'a>(&self, expression: &Expression, data: &'a Value) -> Result<Vec<&'a Value>> {
        if let Some(name) = expression.simple_property_name() {
            return Ok(data.as_object().and_then(|obj| obj.get(name)).into_iter().collect());
        }

        let mut current = vec![data];
        for selector in &expression.selectors {
            current = selector.execute(&current, self.context.max_depth)?;
            if current.is_empty() {
                break;
            }
        }

        if self.context.max_results > 0 && current.len() > self.context.max_results {
            log::warn!(
                "Path {} matched {} nodes, truncating to {}",
                expression,
                current.len(),
                self.context.max_results
            );
            current.truncate(self.context.max_results);
        }

        Ok(current)
    }

    /// Execute and return only the first match
    pub fn execute_first<'a>(&self, expression: &Expression, data: &'a Value) -> Result<Option<&'a Value>> {
        Ok(self.execute(expression, data)?.into_iter().next())
    }

    /// Count matches without cloning them
    pub fn count(&self, expression: &Expression, data: &Value) -> Result<usize> {
        Ok(self.execute(expression, data)?.len())
    }
}
