//! Column structure.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Properties, quote_identifier, quote_literal};

/// Column flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Unsigned numeric column.
    #[serde(alias = "UNSIGNED")]
    Unsigned,
    /// Column accepts NULL.
    #[serde(alias = "NULLABLE")]
    Nullable,
    /// Column is an `AUTO_INCREMENT` counter.
    #[serde(alias = "AUTO_INCREMENT")]
    AutoIncrement,
    /// Generated column is `STORED` rather than `VIRTUAL`.
    #[serde(alias = "STORED")]
    Stored,
}

impl Attribute {
    /// Returns the spec-file spelling of this attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::Nullable => "nullable",
            Self::AutoIncrement => "auto_increment",
            Self::Stored => "stored",
        }
    }
}

/// Splits an `unsigned` marker off a raw column type.
///
/// Returns the bare type and whether the marker was present, so that
/// `int(10) unsigned` becomes `("int(10)", true)`.
#[must_use]
pub fn split_unsigned(raw: &str) -> (String, bool) {
    let lower = raw.to_ascii_lowercase();
    lower.find(" unsigned").map_or_else(
        || (raw.trim().to_string(), false),
        |pos| {
            let mut bare = raw[..pos].to_string();
            bare.push_str(&raw[pos + " unsigned".len()..]);
            (bare.trim().to_string(), true)
        },
    )
}

/// Lowercases a column type outside its quoted literals.
///
/// Keywords compare case-insensitively, `ENUM` and `SET` members do not.
fn normalize_type(column_type: &str) -> String {
    let mut quoted = false;
    column_type
        .chars()
        .map(|c| {
            if c == '\'' {
                quoted = !quoted;
            }
            if quoted { c } else { c.to_ascii_lowercase() }
        })
        .collect()
}

/// One table column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStructure {
    /// Column name.
    pub field: String,
    /// Base SQL type, never containing `unsigned`.
    pub column_type: String,
    /// Default value; `None` means no default.
    pub default: Option<String>,
    /// Column comment.
    pub comment: String,
    /// Column flags.
    pub attributes: BTreeSet<Attribute>,
    /// Explicit collation.
    pub collation_name: Option<String>,
    /// Expression of a generated column.
    pub generation_expression: Option<String>,
    /// Spec-only metadata.
    pub properties: Properties,
}

impl ColumnStructure {
    /// Creates a NOT NULL column without default.
    ///
    /// An `unsigned` suffix on `column_type` is moved into the
    /// [`Attribute::Unsigned`] flag.
    #[must_use]
    pub fn new(field: impl Into<String>, column_type: impl AsRef<str>) -> Self {
        let (column_type, unsigned) = split_unsigned(column_type.as_ref());
        let mut attributes = BTreeSet::new();
        if unsigned {
            attributes.insert(Attribute::Unsigned);
        }
        Self {
            field: field.into(),
            column_type,
            default: None,
            comment: String::new(),
            attributes,
            collation_name: None,
            generation_expression: None,
            properties: Properties::new(),
        }
    }

    /// Adds a flag.
    #[must_use]
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute);
        self
    }

    /// Marks the column nullable.
    #[must_use]
    pub fn nullable(self) -> Self {
        self.attribute(Attribute::Nullable)
    }

    /// Marks the column unsigned.
    #[must_use]
    pub fn unsigned(self) -> Self {
        self.attribute(Attribute::Unsigned)
    }

    /// Marks the column auto-increment.
    #[must_use]
    pub fn auto_increment(self) -> Self {
        self.attribute(Attribute::AutoIncrement)
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation_name = Some(collation.into());
        self
    }

    /// Makes this a generated column.
    #[must_use]
    pub fn generated(mut self, expression: impl Into<String>, stored: bool) -> Self {
        self.generation_expression = Some(expression.into());
        if stored {
            self.attributes.insert(Attribute::Stored);
        }
        self
    }

    /// Replaces the opaque properties.
    #[must_use]
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Returns whether the column is unsigned.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.attributes.contains(&Attribute::Unsigned)
    }

    /// Returns whether the column accepts NULL.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.attributes.contains(&Attribute::Nullable)
    }

    /// Returns whether the column auto-increments.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.attributes.contains(&Attribute::AutoIncrement)
    }

    /// Returns whether the column is a stored generated column.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        self.attributes.contains(&Attribute::Stored)
    }

    /// Returns whether the column is generated.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.generation_expression.is_some()
    }

    /// Renders the full column definition, name included.
    #[must_use]
    pub fn create_query(&self) -> String {
        format!("{} {}", quote_identifier(&self.field), self.base_query())
    }

    /// Renders the type and modifiers, shared by `CREATE TABLE`,
    /// `ADD COLUMN` and `MODIFY COLUMN`.
    ///
    /// Generated columns never carry `AUTO_INCREMENT` or a `DEFAULT`.
    #[must_use]
    pub fn base_query(&self) -> String {
        let mut parts = vec![self.column_type.clone()];
        if self.is_unsigned() {
            parts.push("UNSIGNED".to_string());
        }
        if let Some(collation) = &self.collation_name {
            parts.push(format!("COLLATE {collation}"));
        }
        match &self.generation_expression {
            Some(expression) => {
                parts.push(format!("AS ({expression})"));
                if self.is_stored() {
                    parts.push("STORED".to_string());
                }
                if !self.is_nullable() {
                    parts.push("NOT NULL".to_string());
                }
            }
            None => {
                if !self.is_nullable() {
                    parts.push("NOT NULL".to_string());
                }
                if self.is_auto_increment() {
                    parts.push("AUTO_INCREMENT".to_string());
                } else if let Some(default) = self.default_sql() {
                    parts.push(format!("DEFAULT {default}"));
                } else if self.is_nullable() {
                    parts.push("DEFAULT NULL".to_string());
                }
            }
        }
        parts.push(format!("COMMENT {}", quote_literal(&self.comment)));
        parts.join(" ")
    }

    /// Renders the `DROP COLUMN` fragment.
    #[must_use]
    pub fn drop_query(&self) -> String {
        format!("DROP COLUMN {}", quote_identifier(&self.field))
    }

    /// Renders the default as SQL.
    ///
    /// Numbers and `CURRENT_TIMESTAMP` on temporal columns are emitted
    /// verbatim, anything else as a quoted literal.
    #[must_use]
    pub fn default_sql(&self) -> Option<String> {
        let value = self.default.as_deref()?;
        if is_numeric(value) || (self.is_temporal() && is_current_timestamp(value)) {
            Some(value.to_string())
        } else {
            Some(quote_literal(value))
        }
    }

    /// Returns true when `target` differs in any migratable attribute.
    ///
    /// Name and properties are not compared.
    #[must_use]
    pub fn is_changed(&self, target: &Self) -> bool {
        !(normalize_type(&self.column_type) == normalize_type(&target.column_type)
            && self.comment == target.comment
            && self.is_nullable() == target.is_nullable()
            && self.is_unsigned() == target.is_unsigned()
            && self.default == target.default
            && self.is_auto_increment() == target.is_auto_increment()
            && self.collation_name == target.collation_name
            && self.generation_expression == target.generation_expression
            && self.is_stored() == target.is_stored())
    }

    fn is_temporal(&self) -> bool {
        let lower = self.column_type.to_ascii_lowercase();
        lower.starts_with("timestamp") || lower.starts_with("datetime")
    }
}

fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && trimmed.parse::<f64>().is_ok()
}

fn is_current_timestamp(value: &str) -> bool {
    value.to_ascii_uppercase().starts_with("CURRENT_TIMESTAMP")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_unsigned() {
        assert_eq!(split_unsigned("int(10) unsigned"), ("int(10)".into(), true));
        assert_eq!(
            split_unsigned("bigint(20) UNSIGNED zerofill"),
            ("bigint(20) zerofill".into(), true)
        );
        assert_eq!(split_unsigned("varchar(255)"), ("varchar(255)".into(), false));
    }

    #[test]
    fn test_new_moves_unsigned_into_attribute() {
        let column = ColumnStructure::new("id", "int(10) unsigned");
        assert_eq!(column.column_type, "int(10)");
        assert!(column.is_unsigned());
    }

    #[test]
    fn test_base_query_auto_increment() {
        let column = ColumnStructure::new("id", "int(10)")
            .unsigned()
            .auto_increment()
            .comment("ID");
        assert_eq!(
            column.create_query(),
            "`id` int(10) UNSIGNED NOT NULL AUTO_INCREMENT COMMENT 'ID'"
        );
    }

    #[test]
    fn test_base_query_defaults() {
        let numeric = ColumnStructure::new("age", "int(11)").default_value("0");
        assert_eq!(numeric.base_query(), "int(11) NOT NULL DEFAULT 0 COMMENT ''");

        let text = ColumnStructure::new("name", "varchar(255)")
            .default_value("none")
            .collation("utf8mb4_bin");
        assert_eq!(
            text.base_query(),
            "varchar(255) COLLATE utf8mb4_bin NOT NULL DEFAULT 'none' COMMENT ''"
        );

        let nullable = ColumnStructure::new("note", "text").nullable();
        assert_eq!(nullable.base_query(), "text DEFAULT NULL COMMENT ''");

        let created = ColumnStructure::new("created", "timestamp").default_value("CURRENT_TIMESTAMP");
        assert_eq!(
            created.base_query(),
            "timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP COMMENT ''"
        );
    }

    #[test]
    fn test_current_timestamp_is_quoted_on_text_columns() {
        let column = ColumnStructure::new("label", "varchar(32)").default_value("CURRENT_TIMESTAMP");
        assert_eq!(column.default_sql().as_deref(), Some("'CURRENT_TIMESTAMP'"));
    }

    #[test]
    fn test_generated_column_never_renders_auto_increment_or_default() {
        let column = ColumnStructure::new("total", "int(11)")
            .auto_increment()
            .default_value("5")
            .generated("`a` + `b`", true);
        let sql = column.base_query();
        assert_eq!(sql, "int(11) AS (`a` + `b`) STORED NOT NULL COMMENT ''");
        assert!(!sql.contains("AUTO_INCREMENT"));
        assert!(!sql.contains("DEFAULT"));

        let nullable = ColumnStructure::new("v", "int(11)")
            .nullable()
            .generated("`a` * 2", false);
        assert_eq!(nullable.base_query(), "int(11) AS (`a` * 2) COMMENT ''");
    }

    #[test]
    fn test_is_changed_identical_columns() {
        let column = ColumnStructure::new("name", "varchar(10)")
            .collation("utf8mb4_bin")
            .generated("upper(`a`)", true);
        assert!(!column.is_changed(&column.clone()));
    }

    #[test]
    fn test_is_changed_compares_against_target() {
        let base = ColumnStructure::new("name", "varchar(10)");

        let collated = base.clone().collation("utf8mb4_bin");
        assert!(base.is_changed(&collated));
        assert!(collated.is_changed(&base));

        let generated = base.clone().generated("upper(`a`)", false);
        assert!(base.is_changed(&generated));

        let stored = base.clone().generated("upper(`a`)", true);
        assert!(generated.is_changed(&stored));
    }

    #[test]
    fn test_is_changed_ignores_properties_and_type_case() {
        let mut properties = Properties::new();
        properties.insert("label".into(), serde_json::json!("Name"));
        let a = ColumnStructure::new("name", "VARCHAR(10)");
        let b = ColumnStructure::new("name", "varchar(10)").properties(properties);
        assert!(!a.is_changed(&b));
    }

    #[test]
    fn test_is_changed_detects_enum_member_case() {
        let lower = ColumnStructure::new("state", "enum('a','b')");
        let upper = ColumnStructure::new("state", "enum('A','B')");
        assert!(lower.is_changed(&upper));
        assert!(!lower.is_changed(&ColumnStructure::new("state", "ENUM('a','b')")));
    }

    #[test]
    fn test_normalize_type_keeps_escaped_quotes() {
        assert_eq!(normalize_type("SET('It''s','OK')"), "set('It''s','OK')");
    }

    #[test]
    fn test_drop_query() {
        assert_eq!(
            ColumnStructure::new("age", "int").drop_query(),
            "DROP COLUMN `age`"
        );
    }
}
