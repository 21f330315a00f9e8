//! Foreign key constraints.

use std::fmt;
use std::str::FromStr;

use super::{quote_identifier, quote_list};

/// Referential action (`ON DELETE`, `ON UPDATE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceAction {
    /// Reject the change (MySQL default).
    #[default]
    Restrict,
    /// Cascade the change to referencing rows.
    Cascade,
    /// Set the referencing columns to NULL.
    SetNull,
    /// No action (same as restrict in InnoDB).
    NoAction,
    /// Set the referencing columns to their default.
    SetDefault,
}

impl ReferenceAction {
    /// Returns the SQL keywords.
    #[must_use]
    pub const fn to_sql(self) -> &'static str {
        match self {
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::NoAction => "NO ACTION",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

impl fmt::Display for ReferenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

impl FromStr for ReferenceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "RESTRICT" => Ok(Self::Restrict),
            "CASCADE" => Ok(Self::Cascade),
            "SET NULL" => Ok(Self::SetNull),
            "NO ACTION" => Ok(Self::NoAction),
            "SET DEFAULT" => Ok(Self::SetDefault),
            _ => Err(format!("unknown referential action '{s}'")),
        }
    }
}

/// One foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignKeyStructure {
    /// Constraint name.
    pub name: String,
    /// Referencing columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub referenced_table: String,
    /// Referenced columns.
    pub referenced_columns: Vec<String>,
    /// `ON UPDATE` action.
    pub on_update: ReferenceAction,
    /// `ON DELETE` action.
    pub on_delete: ReferenceAction,
}

impl ForeignKeyStructure {
    /// Creates a constraint with `RESTRICT` actions.
    #[must_use]
    pub fn new<C, R>(
        name: impl Into<String>,
        columns: C,
        referenced_table: impl Into<String>,
        referenced_columns: R,
    ) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
            on_update: ReferenceAction::default(),
            on_delete: ReferenceAction::default(),
        }
    }

    /// Sets the `ON DELETE` action.
    #[must_use]
    pub fn on_delete(mut self, action: ReferenceAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Sets the `ON UPDATE` action.
    #[must_use]
    pub fn on_update(mut self, action: ReferenceAction) -> Self {
        self.on_update = action;
        self
    }

    /// Renders the constraint definition used inside `CREATE TABLE`.
    #[must_use]
    pub fn create_query(&self) -> String {
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
            quote_identifier(&self.name),
            quote_list(&self.columns),
            quote_identifier(&self.referenced_table),
            quote_list(&self.referenced_columns),
            self.on_delete,
            self.on_update
        )
    }

    /// Renders the `ADD` fragment for `ALTER TABLE`.
    #[must_use]
    pub fn add_query(&self) -> String {
        format!("ADD {}", self.create_query())
    }

    /// Renders the `DROP` fragment for `ALTER TABLE`.
    #[must_use]
    pub fn drop_query(&self) -> String {
        format!("DROP FOREIGN KEY {}", quote_identifier(&self.name))
    }
}
