//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//! - Environment variables (see `logging`)
//! - Command-line arguments

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use shapemap_core::MapperConfig;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template conventions passed to the mapper
    pub mapper: MapperConfig,

    /// Middleware settings
    pub middleware: MiddlewareConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Register the built-in functions (`$getFirstElement`, `$union`, ...)
    pub builtins: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, yaml, json-pretty)
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Pretty-print JSON results by default
    pub pretty: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self { builtins: true }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            color: true,
            pretty: false,
        }
    }
}

impl Config {
    /// Load configuration from a file, choosing the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config: Config = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!("Loaded configuration from {}", path.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".shapemap.toml"),
            PathBuf::from(".shapemap.yaml"),
            PathBuf::from(".shapemap.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let shapemap_dir = config_dir.join("shapemap");
            paths.push(shapemap_dir.join("config.toml"));
            paths.push(shapemap_dir.join("config.yaml"));
            paths.push(shapemap_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".shapemap.toml"));
        }

        paths
    }

    /// Reject settings the mapper or the output writer cannot use
    pub fn validate(&self) -> Result<()> {
        self.mapper.validate()?;
        self.output_format()?;
        Ok(())
    }

    /// The configured output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_config(&self.output.format)
            .ok_or_else(|| Error::config(format!("Unknown output format '{}'", self.output.format)))
    }

    /// Mapper settings with a command-line marker override applied
    pub fn mapper_config(&self, marker: Option<char>) -> MapperConfig {
        match marker {
            Some(marker) => self.mapper.clone().with_operand_marker(marker),
            None => self.mapper.clone(),
        }
    }
}
