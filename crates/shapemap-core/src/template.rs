//! Template compilation
//!
//! A template arrives as a JSON value and is classified once into a closed
//! tree of [`TemplateNode`]s. Path strings and dynamic keys are parsed here,
//! so a compiled template never fails on syntax while mapping.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use crate::config::MapperConfig;
use crate::middleware::MiddlewareRegistry;
use crate::query::JsonPath;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// A classified template node
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    /// Boolean, number or marker-free string, copied verbatim
    Literal(Value),
    /// Query whose first match becomes the value
    Path(JsonPath),
    /// Each element walked against the same source node
    Positional(Vec<TemplateNode>),
    /// (path, sub-template) pairs appended into one array
    Iterative(Vec<SubMapping>),
    /// Output object
    Object(Vec<Field>),
    /// Middleware call
    Directive(Directive),
}

/// One (path, sub-template) pair of an iterative list
#[derive(Debug, Clone, PartialEq)]
pub struct SubMapping {
    pub path: JsonPath,
    /// `None` appends the raw matches
    pub template: Option<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: FieldKey,
    pub node: TemplateNode,
}

/// Output key of an object field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKey {
    Static(String),
    /// Key name read from the source, e.g. `$.givenName`
    Dynamic(JsonPath),
}

/// Middleware directive: one or more calls sharing the literal flag
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub calls: Vec<Call>,
    pub literal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: String,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Raw template value handed over untouched
    Literal(Value),
    /// Sub-template resolved against the source before the call
    Query(Box<TemplateNode>),
}

/// Node counts of a compiled template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateStats {
    pub literals: usize,
    pub paths: usize,
    pub positional_lists: usize,
    pub iterative_lists: usize,
    pub objects: usize,
    pub dynamic_keys: usize,
    pub directives: usize,
    pub middleware_calls: usize,
}

/// A compiled template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    root: TemplateNode,
}

impl Template {
    /// Classify `template` and parse every path it contains
    ///
    /// Objects become directives only when `registry` is given and one of
    /// their keys is a registered function name.
    pub fn compile(template: &Value, registry: Option<&MiddlewareRegistry>, config: &MapperConfig) -> Result<Self> {
        config.validate()?;
        let compiler = Compiler { registry, config };
        let root = compiler.node(template, &config.operand_marker.to_string())?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &TemplateNode {
        &self.root
    }

    pub fn stats(&self) -> TemplateStats {
        let mut stats = TemplateStats::default();
        count(&self.root, &mut stats);
        stats
    }

    /// True when mapping may call middleware
    pub fn has_directives(&self) -> bool {
        self.stats().directives > 0
    }
}

struct Compiler<'a> {
    registry: Option<&'a MiddlewareRegistry>,
    config: &'a MapperConfig,
}

impl Compiler<'_> {
    fn node(&self, value: &Value, location: &str) -> Result<TemplateNode> {
        match value {
            Value::Bool(_) | Value::Number(_) => Ok(TemplateNode::Literal(value.clone())),
            Value::String(text) if self.config.is_query(text) => Ok(TemplateNode::Path(self.path(text, location)?)),
            Value::String(_) => Ok(TemplateNode::Literal(value.clone())),
            Value::Array(items) => self.list(items, location),
            Value::Object(fields) if self.is_directive(fields) => self.directive(fields, location),
            Value::Object(fields) => self.object(fields, location),
            Value::Null => Err(Error::UnsupportedNode {
                location: location.to_string(),
                found: "null".to_string(),
            }),
        }
    }

    fn list(&self, items: &[Value], location: &str) -> Result<TemplateNode> {
        if !matches!(items.first(), Some(Value::String(_))) {
            let elements = items
                .iter()
                .enumerate()
                .map(|(i, item)| self.node(item, &format!("{}[{}]", location, i)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(TemplateNode::Positional(elements));
        }

        let mut pairs = Vec::with_capacity(items.len().div_ceil(2));
        for (i, pair) in items.chunks(2).enumerate() {
            let path_location = format!("{}[{}]", location, i * 2);
            let path = match &pair[0] {
                Value::String(text) => self.path(text, &path_location)?,
                other => {
                    return Err(Error::UnsupportedNode {
                        location: path_location,
                        found: format!("{} where a path string was expected", kind(other)),
                    })
                }
            };
            let template = match pair.get(1) {
                None | Some(Value::Null) => None,
                Some(sub) => Some(self.node(sub, &format!("{}[{}]", location, i * 2 + 1))?),
            };
            pairs.push(SubMapping { path, template });
        }
        Ok(TemplateNode::Iterative(pairs))
    }

    fn object(&self, fields: &Map<String, Value>, location: &str) -> Result<TemplateNode> {
        let mut compiled = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            let child = format!("{}.{}", location, name);
            let key = if self.config.is_dynamic_key(name) {
                FieldKey::Dynamic(self.path(name, &child)?)
            } else {
                FieldKey::Static(name.clone())
            };
            compiled.push(Field {
                key,
                node: self.node(value, &child)?,
            });
        }
        Ok(TemplateNode::Object(compiled))
    }

    fn is_directive(&self, fields: &Map<String, Value>) -> bool {
        let Some(registry) = self.registry else {
            return false;
        };
        let marker = self.config.operand_marker;
        fields
            .keys()
            .any(|key| key.starts_with(marker) && registry.contains(key))
    }

    fn directive(&self, fields: &Map<String, Value>, location: &str) -> Result<TemplateNode> {
        let literal = fields
            .get(&self.config.literal_flag)
            .map(truthy)
            .unwrap_or(false);

        let mut calls = Vec::new();
        for (name, operand) in fields {
            if *name == self.config.literal_flag {
                continue;
            }
            if !self.registry.is_some_and(|registry| registry.contains(name)) {
                return Err(Error::UnknownMiddleware {
                    function: name.clone(),
                    location: location.to_string(),
                });
            }
            let operand = if literal {
                Operand::Literal(operand.clone())
            } else {
                Operand::Query(Box::new(self.node(operand, &format!("{}.{}", location, name))?))
            };
            calls.push(Call {
                function: name.clone(),
                operand,
            });
        }
        Ok(TemplateNode::Directive(Directive { calls, literal }))
    }

    fn path(&self, text: &str, location: &str) -> Result<JsonPath> {
        JsonPath::parse_with_root(text, self.config.operand_marker).map_err(|err| match err {
            Error::Query(source) => Error::InvalidPath {
                path: text.to_string(),
                location: location.to_string(),
                source,
            },
            other => other,
        })
    }
}

/// Truthiness of a literal flag value
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn count(node: &TemplateNode, stats: &mut TemplateStats) {
    match node {
        TemplateNode::Literal(_) => stats.literals += 1,
        TemplateNode::Path(_) => stats.paths += 1,
        TemplateNode::Positional(items) => {
            stats.positional_lists += 1;
            items.iter().for_each(|item| count(item, stats));
        }
        TemplateNode::Iterative(pairs) => {
            stats.iterative_lists += 1;
            for pair in pairs {
                stats.paths += 1;
                if let Some(template) = &pair.template {
                    count(template, stats);
                }
            }
        }
        TemplateNode::Object(fields) => {
            stats.objects += 1;
            for field in fields {
                if matches!(field.key, FieldKey::Dynamic(_)) {
                    stats.dynamic_keys += 1;
                }
                count(&field.node, stats);
            }
        }
        TemplateNode::Directive(directive) => {
            stats.directives += 1;
            for call in &directive.calls {
                stats.middleware_calls += 1;
                if let Operand::Query(operand) = &call.operand {
                    count(operand, stats);
                }
            }
        }
    }
}
