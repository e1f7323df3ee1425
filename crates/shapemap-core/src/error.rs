//! Error types for the Shapemap core library
//!
//! Template problems surface when a `Mapper` is built; everything else aborts
//! the `map` call that hit it. There is no partial result.

use crate::middleware::MiddlewareError;
use crate::query::JsonPathError;
use thiserror::Error;

/// Main error type for Shapemap operations
#[derive(Error, Debug)]
pub enum Error {
    /// A template node has no mapping rule (e.g. `null`)
    #[error("Unsupported template node at {location}: {found}")]
    UnsupportedNode { location: String, found: String },

    /// A path string or dynamic key could not be parsed
    #[error("Invalid path '{path}' at {location}: {source}")]
    InvalidPath {
        path: String,
        location: String,
        #[source]
        source: JsonPathError,
    },

    /// A directive names a function the registry does not contain
    #[error("Unknown middleware '{function}' at {location}")]
    UnknownMiddleware { function: String, location: String },

    /// A directive was reached but the mapper has no middleware registry
    #[error("No middleware supplied to the mapper (directive at {location})")]
    MissingMiddleware { location: String },

    /// A middleware function failed, synchronously or after deferring
    #[error("Middleware execution failed for key: {key}\nFor the function: {function}\nInner Error: {source}")]
    MiddlewareExecution {
        key: String,
        function: String,
        #[source]
        source: MiddlewareError,
    },

    /// `map` was called without any source documents
    #[error("At least one source is required")]
    NoSources,

    /// A query failed while it was being parsed or executed
    #[error("Query error: {0}")]
    Query(#[from] JsonPathError),

    /// Invalid mapper configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for errors raised while compiling a template rather than mapping
    pub fn is_template_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedNode { .. } | Self::InvalidPath { .. } | Self::UnknownMiddleware { .. }
        )
    }
}
