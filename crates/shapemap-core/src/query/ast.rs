//! Abstract syntax tree for path expressions
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A parsed path expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// Character that introduced the expression (`$` unless reconfigured)
    pub root: char,
    /// Chain of selectors applied after the root
    pub selectors: Vec<Selector>,
}

/// Individual selector in a path expression
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Member access (`.name` or `['name']`)
    Child(ChildSelector),
    /// Array element (`[2]`, `[-1]`)
    Index(IndexSelector),
    /// Array slice (`[start:end:step]`)
    Slice(SliceSelector),
    /// Every child of an object or array (`*`)
    Wildcard,
    /// The current node and all of its descendants (`..`)
    RecursiveDescent,
    /// Several selectors applied to the same input (`[0,2]`, `['a','b']`)
    Union(Vec<Selector>),
}

/// Member selector variants
#[derive(Debug, Clone, PartialEq)]
pub enum ChildSelector {
    /// Bare identifier (`.name`)
    Property(String),
    /// Quoted name (`['first name']`)
    QuotedProperty(String),
}

/// Array index, counted from either end
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexSelector {
    /// Offset from the start
    Positive(usize),
    /// Offset from the end, `1` being the last element
    Negative(usize),
}

/// Python-style array slice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceSelector {
    /// Start index (inclusive); `None` starts at the first element
    pub start: Option<i64>,
    /// End index (exclusive); `None` runs to the last element
    pub end: Option<i64>,
    /// Step size, never zero
    pub step: i64,
}

impl Expression {
    pub fn new(root: char, selectors: Vec<Selector>) -> Self {
        Self { root, selectors }
    }

    /// True when the expression is a single member access, e.g. `$.name`
    pub fn is_simple_property(&self) -> bool {
        self.selectors.len() == 1 && matches!(self.selectors[0], Selector::Child(_))
    }

    /// Name of the member for a simple property access
    pub fn simple_property_name(&self) -> Option<&str> {
        match self.selectors.as_slice() {
            [Selector::Child(child)] => Some(child.name()),
            _ => None,
        }
    }

    /// True when the expression can select more than one node
    pub fn is_multi_valued(&self) -> bool {
        self.selectors.iter().any(|s| {
            matches!(
                s,
                Selector::Wildcard | Selector::RecursiveDescent | Selector::Slice(_) | Selector::Union(_)
            )
        })
    }
}

impl ChildSelector {
    /// The member name regardless of how it was written
    pub fn name(&self) -> &str {
        match self {
            ChildSelector::Property(name) | ChildSelector::QuotedProperty(name) => name,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        let mut after_descent = false;
        for selector in &self.selectors {
            match selector {
                // `..name` and `..*` are written without a second dot
                Selector::Child(ChildSelector::Property(name)) if after_descent => write!(f, "{}", name)?,
                Selector::Wildcard if after_descent => write!(f, "*")?,
                other => write!(f, "{}", other)?,
            }
            after_descent = matches!(selector, Selector::RecursiveDescent);
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Child(child) => write!(f, "{}", child),
            Selector::Index(index) => write!(f, "[{}]", index),
            Selector::Slice(slice) => write!(f, "[{}]", slice),
            Selector::Wildcard => write!(f, ".*"),
            Selector::RecursiveDescent => write!(f, ".."),
            Selector::Union(selectors) => {
                write!(f, "[")?;
                for (i, selector) in selectors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    match selector {
                        Selector::Child(child) => write!(f, "'{}'", child.name())?,
                        Selector::Index(index) => write!(f, "{}", index)?,
                        Selector::Slice(slice) => write!(f, "{}", slice)?,
                        other => write!(f, "{}", other)?,
                    }
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for ChildSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildSelector::Property(name) => write!(f, ".{}", name),
            ChildSelector::QuotedProperty(name) => write!(f, "['{}']", name.replace('\'', "\\'")),
        }
    }
}

impl fmt::Display for IndexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSelector::Positive(idx) => write!(f, "{}", idx),
            IndexSelector::Negative(idx) => write!(f, "-{}", idx),
        }
    }
}

impl fmt::Display for SliceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        write!(f, ":")?;
        if let Some(end) = self.end {
            write!(f, "{}", end)?;
        }
        if self.step != 1 {
            write!(f, ":{}", self.step)?;
        }
        Ok(())
    }
}
