//! Template walker
//!
//! Walks a compiled template against one source and builds that source's
//! result. Middleware directives are handed to the invoker; anything they
//! defer is recorded in the [`WalkContext`] with the slot it belongs to.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use super::pending::{describe, Location, PendingEntry, Segment, Task};
use crate::middleware::MiddlewareRegistry;
use crate::template::{Field, FieldKey, SubMapping, TemplateNode};
use crate::Result;
use serde_json::{Map, Value};

/// State of one walk: where we are and what is still pending
#[derive(Debug)]
pub(crate) struct WalkContext {
    source_index: usize,
    location: Location,
    pending: Vec<PendingEntry>,
}

impl WalkContext {
    pub fn new(source_index: usize) -> Self {
        Self {
            source_index,
            location: Location::new(),
            pending: Vec::new(),
        }
    }

    /// Context for resolving a middleware operand into a standalone value
    pub fn for_operand() -> Self {
        Self::new(0)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn into_pending(self) -> Vec<PendingEntry> {
        self.pending
    }

    /// Record a deferred value for the current slot
    pub fn defer(&mut self, task: Task) {
        tracing::trace!(location = %self.describe(), "deferring middleware result");
        self.pending.push(PendingEntry {
            source_index: self.source_index,
            location: self.location.clone(),
            task,
        });
    }

    /// Name of the field being written, empty at the root
    pub fn field_name(&self) -> String {
        self.location.last().map(ToString::to_string).unwrap_or_default()
    }

    pub fn describe(&self) -> String {
        describe(&self.location)
    }

    fn enter<T>(&mut self, segment: Segment, step: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.location.push(segment);
        let outcome = step(self);
        self.location.pop();
        outcome
    }
}

/// Recursive interpreter over [`TemplateNode`]s
pub(crate) struct Walker<'m> {
    pub(super) registry: Option<&'m MiddlewareRegistry>,
}

impl<'m> Walker<'m> {
    pub fn new(registry: Option<&'m MiddlewareRegistry>) -> Self {
        Self { registry }
    }

    pub fn walk(&self, source: &Value, node: &TemplateNode, cx: &mut WalkContext) -> Result<Value> {
        match node {
            TemplateNode::Literal(value) => Ok(value.clone()),
            TemplateNode::Path(path) => match path.execute_single(source)? {
                Some(found) => Ok(found.clone()),
                None => {
                    tracing::trace!(path = %path, location = %cx.describe(), "no match, writing null");
                    Ok(Value::Null)
                }
            },
            TemplateNode::Positional(items) => {
                let mut array = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    array.push(cx.enter(Segment::Index(index), |cx| self.walk(source, item, cx))?);
                }
                Ok(Value::Array(array))
            }
            TemplateNode::Iterative(pairs) => self.iterate(source, pairs, cx),
            TemplateNode::Object(fields) => self.object(source, fields, cx),
            TemplateNode::Directive(directive) => self.invoke(source, directive, cx),
        }
    }

    /// Append every pair's expansion to one array; offsets only grow
    fn iterate(&self, source: &Value, pairs: &[SubMapping], cx: &mut WalkContext) -> Result<Value> {
        let mut array = Vec::new();
        for pair in pairs {
            let matches = pair.path.execute(source)?;
            if matches.is_empty() {
                continue;
            }

            let Some(template) = &pair.template else {
                array.extend(matches.into_iter().cloned());
                continue;
            };

            let items: Vec<&Value> = match matches.first().copied() {
                Some(Value::Array(elements)) if matches.len() == 1 => elements.iter().collect(),
                _ => matches,
            };
            tracing::trace!(path = %pair.path, count = items.len(), offset = array.len(), "expanding sub-template");
            for item in items {
                let index = array.len();
                array.push(cx.enter(Segment::Index(index), |cx| self.walk(item, template, cx))?);
            }
        }
        Ok(Value::Array(array))
    }

    /// Dynamic keys take the first match; a key with no match omits its field
    fn object(&self, source: &Value, fields: &[Field], cx: &mut WalkContext) -> Result<Value> {
        let mut object = Map::new();
        for field in fields {
            let key = match &field.key {
                FieldKey::Static(name) => name.clone(),
                FieldKey::Dynamic(path) => match path.execute_single(source)? {
                    Some(Value::String(name)) => name.clone(),
                    Some(other) => other.to_string(),
                    None => {
                        tracing::debug!(key = %path, location = %cx.describe(), "dynamic key has no match, omitting field");
                        continue;
                    }
                },
            };
            let value = cx.enter(Segment::Key(key.clone()), |cx| self.walk(source, &field.node, cx))?;
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}
