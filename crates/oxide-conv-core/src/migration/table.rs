//! Table-level diffing.

use tracing::debug;

use super::column::diff_columns;
use super::index::{diff_foreign_keys, diff_indexes};
use super::line::{
    ColumnMigrationLine, ForeignKeyMigrationLine, IndexMigrationLine, PartitionMigrationLine,
};
use super::partition::diff_partitions;
use crate::structure::{TableStructure, quote_identifier, quote_literal};

/// Every change to one table that exists on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAlteration {
    /// Table name.
    pub table: String,
    /// Column changes.
    pub columns: ColumnMigrationLine,
    /// Index changes.
    pub indexes: IndexMigrationLine,
    /// Foreign key changes.
    pub foreign_keys: ForeignKeyMigrationLine,
    /// Changed table options (`ENGINE=…`, `COMMENT=…`).
    pub options: Vec<String>,
    /// Partition change.
    pub partition: PartitionMigrationLine,
}

impl TableAlteration {
    /// Returns true when no sub-diff produced anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.columns.is_noop()
            && self.indexes.is_noop()
            && self.foreign_keys.is_noop()
            && self.options.is_empty()
            && self.partition.is_noop()
    }

    /// Returns the comma-separated alter options in execution order.
    ///
    /// Foreign keys are dropped before the indexes backing them and added
    /// after the indexes they need. The partition clause is not included.
    #[must_use]
    pub fn fragments(&self) -> Vec<String> {
        let mut fragments = self.foreign_keys.drop_fragments();
        fragments.extend(self.indexes.drop_fragments());
        fragments.extend(self.columns.drop_fragments());
        fragments.extend(self.columns.add_fragments());
        fragments.extend(self.indexes.add_fragments());
        fragments.extend(self.foreign_keys.add_fragments());
        fragments.extend(self.options.iter().cloned());
        fragments
    }

    /// Renders the `ALTER TABLE` statement.
    #[must_use]
    pub fn query(&self) -> String {
        let mut sql = format!("ALTER TABLE {}", quote_identifier(&self.table));
        let fragments = self.fragments();
        if !fragments.is_empty() {
            sql.push_str("\n  ");
            sql.push_str(&fragments.join(",\n  "));
        }
        for clause in self.partition.render() {
            sql.push('\n');
            sql.push_str(&clause);
        }
        sql
    }
}

/// One statement of a migration.
#[derive(Debug, Clone, PartialEq)]
pub enum TableMigration {
    /// Create a table or view from scratch.
    Create(TableStructure),
    /// Drop a table or view.
    Drop(TableStructure),
    /// Alter an existing table.
    Alter(TableAlteration),
    /// Redefine an existing view.
    ReplaceView(TableStructure),
}

impl TableMigration {
    /// Returns the affected table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::Create(table) | Self::Drop(table) | Self::ReplaceView(table) => &table.name,
            Self::Alter(alteration) => &alteration.table,
        }
    }

    /// Renders the statement.
    #[must_use]
    pub fn query(&self) -> String {
        match self {
            Self::Create(table) => table.create_query(),
            Self::Drop(table) => table.drop_query(),
            Self::Alter(alteration) => alteration.query(),
            Self::ReplaceView(view) => view.replace_query().unwrap_or_else(|| view.create_query()),
        }
    }
}

/// Compares table options.
///
/// Engine, charset and collation are compared only when the new schema
/// states them; the comment is always compared.
#[must_use]
pub fn diff_table_options(before: &TableStructure, after: &TableStructure) -> Vec<String> {
    fn changed(old: Option<&String>, new: Option<&String>) -> Option<String> {
        let new = new?;
        match old {
            Some(old) if old.eq_ignore_ascii_case(new) => None,
            _ => Some(new.clone()),
        }
    }

    let mut options = Vec::new();
    if let Some(engine) = changed(before.engine.as_ref(), after.engine.as_ref()) {
        options.push(format!("ENGINE={engine}"));
    }
    if let Some(charset) = changed(before.default_charset.as_ref(), after.default_charset.as_ref()) {
        options.push(format!("DEFAULT CHARSET={charset}"));
    }
    if let Some(collation) = changed(before.collation.as_ref(), after.collation.as_ref()) {
        options.push(format!("COLLATE={collation}"));
    }
    if before.comment != after.comment {
        options.push(format!("COMMENT={}", quote_literal(&after.comment)));
    }
    options
}

/// Compares two versions of one table or view.
///
/// Returns `None` when nothing changed. Both sides must be of the same
/// kind; a table turning into a view is handled by the caller as a drop
/// followed by a create.
#[must_use]
pub fn diff_table(before: &TableStructure, after: &TableStructure) -> Option<TableMigration> {
    if let (Some(old), Some(new)) = (before.view_definition(), after.view_definition()) {
        if old.is_equivalent(new) {
            return None;
        }
        debug!(view = %after.name, "view definition changed");
        return Some(TableMigration::ReplaceView(after.clone()));
    }

    let alteration = TableAlteration {
        table: after.name.clone(),
        columns: diff_columns(&before.columns, &after.columns),
        indexes: diff_indexes(&before.indexes, &after.indexes),
        foreign_keys: diff_foreign_keys(&before.foreign_keys, &after.foreign_keys),
        options: diff_table_options(before, after),
        partition: diff_partitions(before.partition.as_ref(), after.partition.as_ref()),
    };
    if alteration.is_noop() {
        return None;
    }
    debug!(table = %after.name, "table altered");
    Some(TableMigration::Alter(alteration))
}
