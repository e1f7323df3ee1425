//! Middleware: named value transforms applied by template directives
//!
//! A directive such as `{"$unique": "$.tags"}` resolves its operand (or takes
//! it verbatim when the literal flag is set) and hands it to the registered
//! function. Functions answer either with a value or with a future that the
//! mapper joins after every source has been walked.
//!
//! # Example
//!
//! ```
//! use shapemap_core::middleware::{MiddlewareError, MiddlewareRegistry};
//! use serde_json::{json, Value};
//!
//! let registry = MiddlewareRegistry::with_defaults()
//!     .register("$shout", |value: Value, _literal| match value {
//!         Value::String(s) => Ok(json!(s.to_uppercase())),
//!         other => Err(MiddlewareError::invalid_operand(format!("expected a string, got {}", other))),
//!     })
//!     .register_async("$later", |value: Value, _literal| async move { Ok::<_, MiddlewareError>(value) });
//!
//! assert!(registry.contains("$shout"));
//! assert!(registry.contains("$unique"));
//! ```
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

pub mod built_in;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by middleware functions
#[derive(Error, Debug)]
pub enum MiddlewareError {
    /// The operand does not have the shape the function expects
    #[error("Invalid operand: {message}")]
    InvalidOperand { message: String },

    /// Any other failure, carried as-is
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl MiddlewareError {
    pub fn invalid_operand(message: impl Into<String>) -> Self {
        Self::InvalidOperand {
            message: message.into(),
        }
    }
}

/// A result that will be available later
pub type MiddlewareFuture = BoxFuture<'static, Result<Value, MiddlewareError>>;

/// What a middleware function hands back
pub enum MiddlewareOutput {
    /// Value available now
    Ready(Value),
    /// Value produced by a future, joined before `map` completes
    Deferred(MiddlewareFuture),
}

impl MiddlewareOutput {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl From<Value> for MiddlewareOutput {
    fn from(value: Value) -> Self {
        Self::Ready(value)
    }
}

impl fmt::Debug for MiddlewareOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

pub type MiddlewareResult = Result<MiddlewareOutput, MiddlewareError>;

/// A transform callable from templates
///
/// `literal` is `true` when the directive's literal flag was set and the
/// operand is the raw template value, `false` when the operand was resolved
/// against the source first.
pub trait Middleware: Send + Sync {
    fn call(&self, operand: Value, literal: bool) -> MiddlewareResult;
}

impl<F> Middleware for F
where
    F: Fn(Value, bool) -> MiddlewareResult + Send + Sync,
{
    fn call(&self, operand: Value, literal: bool) -> MiddlewareResult {
        self(operand, literal)
    }
}

/// Named middleware functions available to a mapper
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    functions: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in functions
    pub fn with_defaults() -> Self {
        built_in::register_defaults(Self::new())
    }

    /// Register a synchronous function, replacing any function of the same name
    pub fn register<F>(self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Value, bool) -> Result<Value, MiddlewareError> + Send + Sync + 'static,
    {
        self.register_middleware(name, move |operand: Value, literal: bool| -> MiddlewareResult {
            function(operand, literal).map(MiddlewareOutput::Ready)
        })
    }

    /// Register a function whose result is produced asynchronously
    pub fn register_async<F, Fut>(self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Value, bool) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, MiddlewareError>> + Send + 'static,
    {
        self.register_middleware(name, move |operand: Value, literal: bool| -> MiddlewareResult {
            Ok(MiddlewareOutput::Deferred(function(operand, literal).boxed()))
        })
    }

    /// Register anything implementing [`Middleware`], e.g. a function that
    /// decides per call whether to defer
    pub fn register_middleware(mut self, name: impl Into<String>, middleware: impl Middleware + 'static) -> Self {
        self.functions.insert(name.into(), Arc::new(middleware));
        self
    }

    /// Add every function from `other`; on name clashes `other` wins
    pub fn merge(mut self, other: MiddlewareRegistry) -> Self {
        self.functions.extend(other.functions);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
