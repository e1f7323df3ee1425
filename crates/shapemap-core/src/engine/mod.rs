//! Mapping engine
//!
//! A [`Mapper`] owns a compiled template and an optional middleware registry.
//! Each [`Mapper::map`] call walks the template against every source on its
//! own, settles any deferred middleware results, then merges the per-source
//! results left to right.
//!
//! # Example
//!
//! ```
//! use shapemap_core::{Mapper, Mapping};
//! use serde_json::json;
//!
//! # fn example() -> shapemap_core::Result<()> {
//! let mapper = Mapper::new(json!({"name": "$.name", "tags": "$.tags"}))?;
//! let mapping = mapper.map(&[
//!     json!({"name": "ANAME", "tags": ["a"]}),
//!     json!({"name": "BNAME", "tags": ["b"]}),
//! ])?;
//!
//! match mapping {
//!     Mapping::Ready(value) => assert_eq!(value, json!({"name": "BNAME", "tags": ["a", "b"]})),
//!     Mapping::Deferred(_) => unreachable!("no middleware configured"),
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

mod invoker;
mod pending;
mod walker;

use crate::config::MapperConfig;
use crate::merge::merge_all;
use crate::middleware::MiddlewareRegistry;
use crate::template::Template;
use crate::{Error, Result};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use pending::{reconcile, PendingEntry};
use serde_json::Value;
use std::fmt;
use std::future::IntoFuture;
use walker::{WalkContext, Walker};

/// Reusable transformation from source documents to one output shape
#[derive(Debug, Clone)]
pub struct Mapper {
    template: Template,
    middleware: Option<MiddlewareRegistry>,
    config: MapperConfig,
}

impl Mapper {
    /// Mapper without middleware and with the default `$` marker
    pub fn new(template: Value) -> Result<Self> {
        Self::builder(template).build()
    }

    /// Mapper whose directives may call functions from `middleware`
    pub fn with_middleware(template: Value, middleware: MiddlewareRegistry) -> Result<Self> {
        Self::builder(template).middleware(middleware).build()
    }

    pub fn from_config(template: Value, middleware: Option<MiddlewareRegistry>, config: &MapperConfig) -> Result<Self> {
        let mut builder = Self::builder(template).config(config.clone());
        if let Some(middleware) = middleware {
            builder = builder.middleware(middleware);
        }
        builder.build()
    }

    /// Mapper over a template parsed from JSON text
    pub fn from_json_str(template: &str, middleware: Option<MiddlewareRegistry>) -> Result<Self> {
        let template: Value = serde_json::from_str(template)?;
        Self::from_config(template, middleware, &MapperConfig::default())
    }

    /// Mapper over an already compiled template
    ///
    /// The template is used as-is, so directives it contains are looked up in
    /// `middleware` at mapping time.
    pub fn from_template(template: Template, middleware: Option<MiddlewareRegistry>) -> Self {
        Self {
            template,
            middleware,
            config: MapperConfig::default(),
        }
    }

    pub fn builder(template: Value) -> MapperBuilder {
        MapperBuilder::new(template)
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn middleware(&self) -> Option<&MiddlewareRegistry> {
        self.middleware.as_ref()
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Map `sources` into one result
    ///
    /// Later sources override earlier ones; arrays from every source are
    /// concatenated. When middleware deferred any value the result is a
    /// [`Mapping::Deferred`] that must be awaited.
    pub fn map(&self, sources: &[Value]) -> Result<Mapping> {
        if sources.is_empty() {
            return Err(Error::NoSources);
        }
        tracing::debug!(sources = sources.len(), "mapping sources");

        let walker = Walker::new(self.middleware.as_ref());
        let mut results = Vec::with_capacity(sources.len());
        let mut pending = Vec::new();
        for (index, source) in sources.iter().enumerate() {
            let mut cx = WalkContext::new(index);
            results.push(walker.walk(source, self.template.root(), &mut cx)?);
            pending.extend(cx.into_pending());
        }

        if pending.is_empty() {
            Ok(Mapping::Ready(merge_all(results)))
        } else {
            tracing::debug!(pending = pending.len(), "mapping has deferred middleware results");
            Ok(Mapping::Deferred(DeferredMapping { results, pending }))
        }
    }

    /// Map `sources` and wait for any deferred middleware results
    pub async fn map_async(&self, sources: &[Value]) -> Result<Value> {
        self.map(sources)?.await
    }
}

/// Outcome of [`Mapper::map`]
#[derive(Debug)]
pub enum Mapping {
    Ready(Value),
    Deferred(DeferredMapping),
}

impl Mapping {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// The value, if nothing was deferred
    pub fn ready(self) -> Option<Value> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }
}

impl IntoFuture for Mapping {
    type Output = Result<Value>;
    type IntoFuture = BoxFuture<'static, Result<Value>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(value) => future::ready(Ok(value)).boxed(),
            Self::Deferred(deferred) => deferred.into_future(),
        }
    }
}

/// Per-source results still waiting on middleware futures
pub struct DeferredMapping {
    results: Vec<Value>,
    pending: Vec<PendingEntry>,
}

impl DeferredMapping {
    /// Number of deferred values still to settle
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Settle every deferred value, then merge
    pub async fn resolve(self) -> Result<Value> {
        let Self { mut results, pending } = self;
        reconcile(&mut results, pending).await?;
        Ok(merge_all(results))
    }
}

impl IntoFuture for DeferredMapping {
    type Output = Result<Value>;
    type IntoFuture = BoxFuture<'static, Result<Value>>;

    fn into_future(self) -> Self::IntoFuture {
        self.resolve().boxed()
    }
}

impl fmt::Debug for DeferredMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredMapping")
            .field("results", &self.results)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Builder for [`Mapper`]
#[derive(Debug)]
pub struct MapperBuilder {
    template: Value,
    middleware: Option<MiddlewareRegistry>,
    config: MapperConfig,
}

impl MapperBuilder {
    pub fn new(template: Value) -> Self {
        Self {
            template,
            middleware: None,
            config: MapperConfig::default(),
        }
    }

    pub fn middleware(mut self, middleware: MiddlewareRegistry) -> Self {
        self.middleware = Some(middleware);
        self
    }

    pub fn operand_marker(mut self, marker: char) -> Self {
        self.config.operand_marker = marker;
        self
    }

    pub fn literal_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.literal_flag = flag.into();
        self
    }

    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and compile the template
    pub fn build(self) -> Result<Mapper> {
        let template = Template::compile(&self.template, self.middleware.as_ref(), &self.config)?;
        tracing::debug!(
            marker = %self.config.operand_marker,
            middleware = self.middleware.as_ref().map_or(0, MiddlewareRegistry::len),
            "compiled mapping template"
        );
        Ok(Mapper {
            template,
            middleware: self.middleware,
            config: self.config,
        })
    }
}
