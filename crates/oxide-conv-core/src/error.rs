//! Error types for structure building and dependency ordering.
//!
//! Diffing never fails, so none of these are produced by the migration
//! generators.

use std::path::PathBuf;

/// Errors raised while building structures or ordering DDL statements.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A spec document carries a key outside the fixed vocabulary.
    #[error("Unknown key '{key}' in specification of table '{table}'")]
    Validation {
        /// Table whose document failed validation.
        table: String,
        /// Offending key, as a dotted path (`column.id.foo`).
        key: String,
    },

    /// A statement references a table that is not part of the input set.
    #[error("Table '{table}' references '{reference}' which is not defined")]
    MissingReference {
        /// The referencing table.
        table: String,
        /// The referenced table that could not be found.
        reference: String,
    },

    /// Foreign-key references form a cycle.
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// Table names along the cycle; the first name is repeated at the end.
        cycle: Vec<String>,
    },

    /// A spec document has a recognized key with an unusable value.
    #[error("Invalid specification of table '{table}': {message}")]
    InvalidSpec {
        /// Table whose document is invalid.
        table: String,
        /// What is wrong with it.
        message: String,
    },

    /// A spec document declares a table type other than `TABLE` or `VIEW`.
    #[error("Unknown table type '{kind}' for table '{table}'")]
    UnknownTableType {
        /// Table whose document declares the type.
        table: String,
        /// Declared type.
        kind: String,
    },

    /// Catalog metadata describes something the model cannot represent.
    #[error("Table '{table}' uses an unsupported feature: {message}")]
    Unsupported {
        /// The introspected table.
        table: String,
        /// What could not be represented.
        message: String,
    },

    /// A spec file could not be parsed.
    #[error("Failed to parse specification file '{path}': {message}")]
    Parse {
        /// Path to the file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// IO error while reading spec or SQL files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Returns the table implicated by this error, if any.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Validation { table, .. }
            | Self::MissingReference { table, .. }
            | Self::InvalidSpec { table, .. }
            | Self::UnknownTableType { table, .. }
            | Self::Unsupported { table, .. } => Some(table),
            Self::CyclicDependency { cycle } => cycle.first().map(String::as_str),
            Self::Parse { .. } | Self::Io(_) => None,
        }
    }
}

/// Result type for structure operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = SchemaError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
        assert_eq!(err.table(), Some("a"));
    }

    #[test]
    fn test_validation_names_table_and_key() {
        let err = SchemaError::Validation {
            table: "users".into(),
            key: "colour".into(),
        };
        assert!(err.to_string().contains("users"));
        assert!(err.to_string().contains("colour"));
    }
}
