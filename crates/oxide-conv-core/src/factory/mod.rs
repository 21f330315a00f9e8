//! Structure factories.
//!
//! Tables and views are built either from catalog rows ([`catalog`]) or
//! from spec documents ([`spec`]). [`DatabaseStructureFactory`] builds a
//! whole snapshot from a directory of spec files.

pub mod catalog;
pub mod parser;
pub mod spec;

use std::collections::btree_map::Entry;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

pub use catalog::{
    ColumnRow, ForeignKeyRow, IndexRow, PartitionRow, TableRows, TableStatusRow, ViewRows,
    extract_default_charset,
};
pub use parser::{AnySpecParser, JsonSpecParser, SpecDocument, SpecParser, YamlSpecParser};
pub use spec::{
    ColumnSpec, ForeignKeySpec, IndexSpec, PartSpec, PartitionSpec, TableSpec,
    TableStructureFactory, ViewStructureFactory, structure_from_document, validate,
};

use crate::error::{Result, SchemaError};
use crate::structure::{DatabaseStructure, TableStructure};

/// Builds whole snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseStructureFactory;

impl DatabaseStructureFactory {
    /// Builds a snapshot from every spec file under `dir`.
    ///
    /// Files are found recursively and read in path order; each file
    /// describes the table named after its stem. Files the parser does not
    /// accept are skipped. `filter` sees every built table and returns
    /// false to leave it out.
    ///
    /// # Errors
    ///
    /// Fails on unreadable directories or files, parse and validation
    /// errors, and when two files describe the same table.
    pub fn from_spec_dir<P, F>(dir: &Path, parser: &P, filter: F) -> Result<DatabaseStructure>
    where
        P: SpecParser + ?Sized,
        F: Fn(&TableStructure) -> bool,
    {
        let mut database = DatabaseStructure::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                SchemaError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other(format!("failed to walk {}", dir.display()))
                }))
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !parser.accepts(path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let document = parser.parse_file(path)?;
            let table = structure_from_document(name, document)?;
            if !filter(&table) {
                debug!(table = %name, "table filtered out");
                continue;
            }
            match database.tables.entry(name.to_string()) {
                Entry::Occupied(_) => {
                    return Err(SchemaError::InvalidSpec {
                        table: name.to_string(),
                        message: format!("defined twice, again in {}", path.display()),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(table);
                }
            }
        }
        info!(dir = %dir.display(), tables = database.len(), "spec directory loaded");
        Ok(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_spec_dir_reads_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.yml"), "column:\n  id: {type: int}\n").unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        std::fs::write(
            dir.path().join("blog/posts.yaml"),
            "column:\n  id: {type: int}\nprimary_key: [id]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let db = DatabaseStructureFactory::from_spec_dir(dir.path(), &YamlSpecParser, |_| true)
            .unwrap();
        assert_eq!(db.table_names().collect::<Vec<_>>(), vec!["posts", "users"]);
    }

    #[test]
    fn test_from_spec_dir_applies_filter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.yml"), "comment: u\n").unwrap();
        std::fs::write(dir.path().join("tmp_cache.yml"), "comment: t\n").unwrap();
        let db = DatabaseStructureFactory::from_spec_dir(dir.path(), &YamlSpecParser, |t| {
            !t.name.starts_with("tmp_")
        })
        .unwrap();
        assert_eq!(db.table_names().collect::<Vec<_>>(), vec!["users"]);
    }

    #[test]
    fn test_duplicate_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.yml"), "comment: a\n").unwrap();
        std::fs::write(dir.path().join("users.json"), r#"{"comment": "b"}"#).unwrap();
        let err = DatabaseStructureFactory::from_spec_dir(dir.path(), &AnySpecParser, |_| true)
            .unwrap_err();
        assert_eq!(err.table(), Some("users"));
    }

    #[test]
    fn test_validation_error_aborts_whole_build() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yml"), "comment: fine\n").unwrap();
        std::fs::write(dir.path().join("b.yml"), "engine: InnoDB\nshape: round\n").unwrap();
        let err = DatabaseStructureFactory::from_spec_dir(dir.path(), &YamlSpecParser, |_| true)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Validation { ref table, ref key } if table == "b" && key == "shape"));
    }
}
