//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use serde_json::Value;
use shapemap_core::MiddlewareRegistry;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Path argument that reads standard input
pub const STDIN_PATH: &str = "-";

/// Document syntax, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// YAML for `.yaml`/`.yml`, JSON for everything else
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Yaml => "YAML",
        }
    }
}

/// Load a JSON or YAML document, or read JSON from stdin for `-`
pub fn load_document(path: &Path) -> Result<Value> {
    let (content, format) = if path.as_os_str() == STDIN_PATH {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        (content, DocumentFormat::Json)
    } else {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        (fs::read_to_string(path)?, DocumentFormat::from_path(path))
    };

    tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded document");
    parse_document(&content, format).map_err(|reason| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: format.name().to_string(),
        reason,
    })
}

/// Parse document text in the given syntax
pub fn parse_document(content: &str, format: DocumentFormat) -> std::result::Result<Value, String> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Write a document to a file in the syntax its extension names
pub fn save_document(path: &Path, value: &Value, pretty: bool) -> Result<()> {
    let content = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => serde_yaml::to_string(value)?,
        DocumentFormat::Json if pretty => serde_json::to_string_pretty(value)? + "\n",
        DocumentFormat::Json => serde_json::to_string(value)? + "\n",
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Writing {}", path.display()))
}

/// The middleware registry for a command, if built-ins are enabled
pub fn middleware_registry(config: &Config, no_defaults: bool) -> Option<MiddlewareRegistry> {
    if no_defaults || !config.middleware.builtins {
        tracing::debug!("Built-in middleware disabled");
        return None;
    }
    Some(MiddlewareRegistry::with_defaults())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("data")), DocumentFormat::Json);
    }

    #[test]
    fn test_load_yaml_keeps_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.yaml");
        fs::write(&path, "zeta: $.z\nalpha: $.a\n").unwrap();

        let value = load_document(&path).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_document(&missing), Err(Error::FileNotFound { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{\"a\": ").unwrap();
        match load_document(&broken) {
            Err(Error::InvalidFormat { expected, .. }) => assert_eq!(expected, "JSON"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_save_document_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let value = json!({"name": "Tony", "tags": ["a"]});

        let json_path = dir.path().join("out").join("result.json");
        save_document(&json_path, &value, false).unwrap();
        assert_eq!(fs::read_to_string(&json_path).unwrap(), "{\"name\":\"Tony\",\"tags\":[\"a\"]}\n");

        let yaml_path = dir.path().join("result.yaml");
        save_document(&yaml_path, &value, false).unwrap();
        assert_eq!(load_document(&yaml_path).unwrap(), value);
    }

    #[test]
    fn test_middleware_registry_switches() {
        let mut config = Config::default();
        assert!(middleware_registry(&config, false).is_some());
        assert!(middleware_registry(&config, true).is_none());

        config.middleware.builtins = false;
        assert!(middleware_registry(&config, false).is_none());
    }
}
