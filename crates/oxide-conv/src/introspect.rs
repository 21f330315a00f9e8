//! Structures from a live database.

use tracing::{debug, info};

use oxide_conv_core::factory::{TableStructureFactory, ViewStructureFactory};
use oxide_conv_core::structure::{DatabaseStructure, TableStructure};

use crate::catalog::Catalog;
use crate::error::Result;

/// Reads table, view and database structures through a [`Catalog`].
///
/// Only read queries are issued.
pub struct Introspector<'a, C> {
    catalog: &'a mut C,
}

impl<'a, C: Catalog> Introspector<'a, C> {
    /// Creates an introspector over `catalog`.
    pub fn new(catalog: &'a mut C) -> Self {
        Self { catalog }
    }

    /// Builds one base table.
    pub async fn table_structure(&mut self, database: &str, table: &str) -> Result<TableStructure> {
        let rows = self.catalog.table_rows(database, table).await?;
        Ok(TableStructureFactory::from_catalog(&rows)?)
    }

    /// Builds one view.
    pub async fn view_structure(&mut self, database: &str, view: &str) -> Result<TableStructure> {
        let rows = self.catalog.view_rows(database, view).await?;
        Ok(ViewStructureFactory::from_catalog(&rows))
    }

    /// Builds every table and view of `database`.
    ///
    /// `filter` sees each built structure and returns false to leave it
    /// out of the snapshot.
    pub async fn database_structure<F>(&mut self, database: &str, filter: F) -> Result<DatabaseStructure>
    where
        F: Fn(&TableStructure) -> bool,
    {
        let mut snapshot = DatabaseStructure::new();
        for entry in self.catalog.list_tables(database).await? {
            let structure = if entry.is_view {
                self.view_structure(database, &entry.name).await?
            } else {
                self.table_structure(database, &entry.name).await?
            };
            if filter(&structure) {
                snapshot.add_table(structure);
            } else {
                debug!(table = %entry.name, "table filtered out");
            }
        }
        info!(database = %database, tables = snapshot.len(), "database introspected");
        Ok(snapshot)
    }
}
