//! In-memory structural model of a MySQL schema.
//!
//! Every type here is a plain value: built once by a factory, then only
//! compared and rendered. A [`DatabaseStructure`] owns all of its tables.

mod column;
mod database;
mod foreign_key;
mod index;
mod partition;
mod table;

pub use column::{Attribute, ColumnStructure, split_unsigned};
pub use database::DatabaseStructure;
pub use foreign_key::{ForeignKeyStructure, ReferenceAction};
pub use index::{IndexColumn, IndexStructure, PRIMARY_INDEX};
pub use partition::{
    BoundaryOperator, PartitionLongStructure, PartitionMethod, PartitionPartStructure,
    PartitionShortStructure, PartitionStructure, PartitionType,
};
pub use table::{TableKind, TableStructure, ViewDefinition};

/// Opaque key-value bag carried by columns and tables.
///
/// Holds spec-only metadata the engine never interprets.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Quotes an identifier with backticks.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quotes a string literal with single quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Quotes each name and joins them with commas.
pub(crate) fn quote_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| quote_identifier(name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_backticks() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal(r"C:\tmp"), r"'C:\\tmp'");
    }

    #[test]
    fn test_quote_list() {
        assert_eq!(quote_list(&["a", "b"]), "`a`, `b`");
    }
}
