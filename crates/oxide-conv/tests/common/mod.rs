#![allow(dead_code)]

use oxide_conv::catalog::{Catalog, CatalogTable, SqlExecutor};
use oxide_conv::error::{ConvError, Result};
use oxide_conv_core::factory::{ColumnRow, IndexRow, TableRows, TableStatusRow, ViewRows};

/// In-memory catalog that records every executed statement.
///
/// `CREATE TABLE` and `CREATE ... VIEW` statements register the object so
/// that later introspection sees it, with a single `id` primary key column
/// for tables.
#[derive(Debug, Default)]
pub struct RecordingCatalog {
    pub executed: Vec<String>,
    pub objects: Vec<CatalogTable>,
    pub fail_on: Option<String>,
}

impl RecordingCatalog {
    pub fn failing_on(table: &str) -> Self {
        Self {
            fail_on: Some(table.to_string()),
            ..Self::default()
        }
    }

    /// Names of created objects, in execution order.
    pub fn created(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.name.as_str()).collect()
    }
}

fn created_name(sql: &str) -> Option<&str> {
    if !sql.trim_start().to_ascii_uppercase().starts_with("CREATE") {
        return None;
    }
    let start = sql.find('`')? + 1;
    let end = start + sql[start..].find('`')?;
    Some(&sql[start..end])
}

impl SqlExecutor for RecordingCatalog {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.executed.push(sql.to_string());
        if sql.starts_with("CREATE DATABASE") {
            return Ok(());
        }
        if let Some(name) = created_name(sql) {
            if self.fail_on.as_deref() == Some(name) {
                return Err(ConvError::Database(sqlx::Error::Protocol(format!(
                    "cannot create {name}"
                ))));
            }
            let is_view = sql.contains(" VIEW ");
            self.objects.push(CatalogTable {
                name: name.to_string(),
                is_view,
            });
        }
        Ok(())
    }
}

impl Catalog for RecordingCatalog {
    async fn list_tables(&mut self, _database: &str) -> Result<Vec<CatalogTable>> {
        let mut objects = self.objects.clone();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    async fn table_rows(&mut self, _database: &str, table: &str) -> Result<TableRows> {
        Ok(TableRows {
            status: TableStatusRow {
                name: table.to_string(),
                engine: Some("InnoDB".into()),
                ..TableStatusRow::default()
            },
            columns: vec![ColumnRow {
                column_name: "id".into(),
                column_type: "int(11)".into(),
                is_nullable: "NO".into(),
                ..ColumnRow::default()
            }],
            indexes: vec![IndexRow {
                key_name: "PRIMARY".into(),
                non_unique: false,
                index_type: "BTREE".into(),
                column_name: "id".into(),
                sub_part: None,
                seq_in_index: 1,
            }],
            ..TableRows::default()
        })
    }

    async fn view_rows(&mut self, database: &str, view: &str) -> Result<ViewRows> {
        Ok(ViewRows {
            database: database.to_string(),
            name: view.to_string(),
            definition: "select 1".into(),
            security_type: "DEFINER".into(),
            create_statement: String::new(),
        })
    }
}
