//! Index structure.

use std::fmt;

use super::quote_identifier;

/// Name MySQL gives the primary key index.
pub const PRIMARY_INDEX: &str = "PRIMARY";

/// A column reference inside an index, with optional prefix length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexColumn {
    /// Column name.
    pub name: String,
    /// Prefix length (`name(10)`).
    pub sub_part: Option<u32>,
}

impl IndexColumn {
    /// Creates a full-column reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_part: None,
        }
    }

    /// Creates a prefix reference.
    #[must_use]
    pub fn prefix(name: impl Into<String>, length: u32) -> Self {
        Self {
            name: name.into(),
            sub_part: Some(length),
        }
    }

    /// Parses `name` or `name(length)`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(open) = raw.rfind('(') {
            if let Some(inner) = raw[open + 1..].strip_suffix(')') {
                if let Ok(length) = inner.trim().parse::<u32>() {
                    return Self::prefix(raw[..open].trim(), length);
                }
            }
        }
        Self::new(raw)
    }

    /// Renders the quoted reference used in index definitions.
    #[must_use]
    pub fn sql(&self) -> String {
        match self.sub_part {
            Some(length) => format!("{}({length})", quote_identifier(&self.name)),
            None => quote_identifier(&self.name),
        }
    }
}

impl fmt::Display for IndexColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_part {
            Some(length) => write!(f, "{}({length})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for IndexColumn {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for IndexColumn {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

/// One named index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexStructure {
    /// Index name (`PRIMARY` for the primary key).
    pub name: String,
    /// Whether the index enforces uniqueness.
    pub is_unique: bool,
    /// `BTREE`, `HASH`, `FULLTEXT` or `SPATIAL`.
    pub index_type: String,
    /// Key columns in key order.
    pub columns: Vec<IndexColumn>,
}

impl IndexStructure {
    /// Creates an index.
    #[must_use]
    pub fn new<I, C>(name: impl Into<String>, is_unique: bool, index_type: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<IndexColumn>,
    {
        Self {
            name: name.into(),
            is_unique,
            index_type: index_type.into().to_ascii_uppercase(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates the primary key index.
    #[must_use]
    pub fn primary<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<IndexColumn>,
    {
        Self::new(PRIMARY_INDEX, true, "BTREE", columns)
    }

    /// Returns whether this is the primary key.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.name == PRIMARY_INDEX
    }

    /// Renders the definition used inside `CREATE TABLE`.
    #[must_use]
    pub fn create_query(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(IndexColumn::sql)
            .collect::<Vec<_>>()
            .join(", ");
        let name = quote_identifier(&self.name);
        let body = match self.index_type.as_str() {
            _ if self.is_primary() => format!("PRIMARY KEY ({columns})"),
            "FULLTEXT" => format!("FULLTEXT KEY {name} ({columns})"),
            "SPATIAL" => format!("SPATIAL KEY {name} ({columns})"),
            _ if self.is_unique => format!("UNIQUE KEY {name} ({columns})"),
            _ => format!("KEY {name} ({columns})"),
        };
        match self.index_type.as_str() {
            "BTREE" | "HASH" => format!("{body} USING {}", self.index_type),
            _ => body,
        }
    }

    /// Renders the `ADD` fragment for `ALTER TABLE`.
    #[must_use]
    pub fn add_query(&self) -> String {
        format!("ADD {}", self.create_query())
    }

    /// Renders the `DROP` fragment for `ALTER TABLE`.
    #[must_use]
    pub fn drop_query(&self) -> String {
        if self.is_primary() {
            "DROP PRIMARY KEY".to_string()
        } else {
            format!("DROP INDEX {}", quote_identifier(&self.name))
        }
    }
}
