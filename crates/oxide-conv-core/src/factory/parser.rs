//! Spec file parsers.
//!
//! A parser turns one file into a raw document: a JSON object whose keys
//! are checked against the spec vocabulary before anything is built.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};

/// Raw spec document, keys in file order.
pub type SpecDocument = Map<String, Value>;

/// Parses spec files into raw documents.
pub trait SpecParser {
    /// Returns whether this parser handles `path`.
    fn accepts(&self, path: &Path) -> bool;

    /// Parses file contents.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] when the contents are malformed or
    /// not a mapping.
    fn parse_str(&self, path: &Path, content: &str) -> Result<SpecDocument>;

    /// Reads and parses a file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] when the file cannot be read, or any
    /// error of [`SpecParser::parse_str`].
    fn parse_file(&self, path: &Path) -> Result<SpecDocument> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(path, &content)
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn into_document(path: &Path, value: Value) -> Result<SpecDocument> {
    match value {
        Value::Object(document) => Ok(document),
        other => Err(SchemaError::Parse {
            path: path.to_path_buf(),
            message: format!("expected a mapping at the top level, found {}", kind_of(&other)),
        }),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// `.yml` / `.yaml` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSpecParser;

impl SpecParser for YamlSpecParser {
    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &["yml", "yaml"])
    }

    fn parse_str(&self, path: &Path, content: &str) -> Result<SpecDocument> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| SchemaError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        into_document(path, value)
    }
}

/// `.json` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSpecParser;

impl SpecParser for JsonSpecParser {
    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &["json"])
    }

    fn parse_str(&self, path: &Path, content: &str) -> Result<SpecDocument> {
        let value: Value = serde_json::from_str(content).map_err(|e| SchemaError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        into_document(path, value)
    }
}

/// Picks YAML or JSON by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnySpecParser;

impl SpecParser for AnySpecParser {
    fn accepts(&self, path: &Path) -> bool {
        YamlSpecParser.accepts(path) || JsonSpecParser.accepts(path)
    }

    fn parse_str(&self, path: &Path, content: &str) -> Result<SpecDocument> {
        if JsonSpecParser.accepts(path) {
            JsonSpecParser.parse_str(path, content)
        } else {
            YamlSpecParser.parse_str(path, content)
        }
    }
}
