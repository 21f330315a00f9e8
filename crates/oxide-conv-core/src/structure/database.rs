//! Database snapshot.

use std::collections::BTreeMap;

use super::TableStructure;

/// One schema snapshot: every table and view, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseStructure {
    /// Tables keyed by name, sorted for deterministic iteration.
    pub tables: BTreeMap<String, TableStructure>,
}

impl DatabaseStructure {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any table with the same name.
    pub fn add_table(&mut self, table: TableStructure) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Adds a table (builder style).
    #[must_use]
    pub fn table(mut self, table: TableStructure) -> Self {
        self.add_table(table);
        self
    }

    /// Gets a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&TableStructure> {
        self.tables.get(name)
    }

    /// Returns table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Returns the number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns whether the snapshot has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<TableStructure> for DatabaseStructure {
    fn from_iter<I: IntoIterator<Item = TableStructure>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_sorted_by_name() {
        let db: DatabaseStructure = [TableStructure::new("users"), TableStructure::new("accounts")]
            .into_iter()
            .collect();
        assert_eq!(db.table_names().collect::<Vec<_>>(), vec!["accounts", "users"]);
        assert_eq!(db.len(), 2);
        assert!(db.get_table("users").is_some());
        assert!(DatabaseStructure::new().is_empty());
    }
}
