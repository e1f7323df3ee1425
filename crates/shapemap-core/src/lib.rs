//! Shapemap Core - Declarative JSON shaping
//!
//! This crate reshapes one or more JSON documents into a new document
//! described by a template. Template strings carrying the operand marker are
//! JSONPath queries, arrays expand matched lists, and directive objects hand
//! values to named middleware functions that may answer now or later.
//!
//! # Main Components
//!
//! - **Template**: one-time classification of the template into a node tree
//! - **Engine**: the [`Mapper`], which walks the tree per source and settles
//!   deferred middleware results
//! - **Merge**: combines per-source results (arrays concatenate, later
//!   sources win elsewhere)
//! - **Query**: the JSONPath evaluator used for every path and dynamic key
//! - **Middleware**: the function registry and the built-in functions
//!
//! # Example
//!
//! ```
//! use shapemap_core::{Mapper, MiddlewareRegistry};
//! use serde_json::json;
//!
//! # async fn example() -> shapemap_core::Result<()> {
//! let template = json!({
//!     "name": "$.person.name",
//!     "tags": {"$unique": "$.tags"},
//!     "kind": "person"
//! });
//! let mapper = Mapper::with_middleware(template, MiddlewareRegistry::with_defaults())?;
//!
//! let result = mapper
//!     .map_async(&[json!({"person": {"name": "Fred"}, "tags": ["a", "a", "b"]})])
//!     .await?;
//! assert_eq!(result, json!({"name": "Fred", "tags": ["a", "b"], "kind": "person"}));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod middleware;
pub mod query;
pub mod template;

// Re-export main types for convenience
pub use config::MapperConfig;
pub use engine::{DeferredMapping, Mapper, MapperBuilder, Mapping};
pub use error::{Error, Result};
pub use merge::{merge, merge_all};
pub use middleware::{Middleware, MiddlewareError, MiddlewareOutput, MiddlewareRegistry, MiddlewareResult};
pub use query::{JsonPath, JsonPathError};
pub use template::{Template, TemplateStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
