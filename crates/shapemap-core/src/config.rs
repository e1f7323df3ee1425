//! Mapper configuration
//!
//! The operand marker drives three conventions at once: it roots path
//! queries, prefixes middleware names, and introduces dynamic keys (marker
//! followed by `.`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default operand marker
pub const DEFAULT_OPERAND_MARKER: char = '$';

/// Default name of the directive flag selecting literal operands
pub const DEFAULT_LITERAL_FLAG: &str = "literal";

/// Settings fixed for the lifetime of a `Mapper`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Prefix identifying queries, middleware names and dynamic keys
    pub operand_marker: char,
    /// Directive key that switches the operand between literal and query mode
    pub literal_flag: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            operand_marker: DEFAULT_OPERAND_MARKER,
            literal_flag: DEFAULT_LITERAL_FLAG.to_string(),
        }
    }
}

impl MapperConfig {
    pub fn with_operand_marker(mut self, marker: char) -> Self {
        self.operand_marker = marker;
        self
    }

    pub fn with_literal_flag(mut self, flag: impl Into<String>) -> Self {
        self.literal_flag = flag.into();
        self
    }

    /// Reject markers that could never start a query
    pub fn validate(&self) -> Result<()> {
        let marker = self.operand_marker;
        if marker.is_whitespace() || marker.is_alphanumeric() || matches!(marker, '.' | '[' | ']' | '\'' | '"') {
            return Err(Error::configuration(format!(
                "operand marker '{}' must be a punctuation character other than . [ ] or quotes",
                marker.escape_default()
            )));
        }
        if self.literal_flag.is_empty() {
            return Err(Error::configuration("literal flag name cannot be empty"));
        }
        if self.literal_flag.starts_with(marker) {
            return Err(Error::configuration(format!(
                "literal flag '{}' cannot start with the operand marker",
                self.literal_flag
            )));
        }
        Ok(())
    }

    /// True when `key` is a dynamic key such as `$.givenName`
    pub fn is_dynamic_key(&self, key: &str) -> bool {
        let mut chars = key.chars();
        chars.next() == Some(self.operand_marker) && chars.next() == Some('.')
    }

    /// True when a template string is a query rather than literal text
    pub fn is_query(&self, text: &str) -> bool {
        text.contains(self.operand_marker)
    }
}
