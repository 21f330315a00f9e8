//! Error types for the conversion tool.

use oxide_conv_core::error::SchemaError;

/// Errors raised while loading, diffing or writing schemas.
#[derive(Debug, thiserror::Error)]
pub enum ConvError {
    /// Schema model, spec or ordering error.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Database error, propagated as reported by the driver.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading SQL files, writing spec files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid `--ignore` pattern.
    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The catalog has no such table or view.
    #[error("Table '{table}' not found in database '{database}'")]
    TableNotFound {
        /// Database searched.
        database: String,
        /// Missing table.
        table: String,
    },

    /// Malformed or unusable schema source.
    #[error("Invalid schema source '{0}'")]
    InvalidSource(String),
}

impl ConvError {
    /// Returns the table this error is about, if any.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Schema(err) => err.table(),
            Self::TableNotFound { table, .. } => Some(table),
            _ => None,
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvError>;
