//! Spec file writer.
//!
//! Writes a snapshot back out as one spec file per table, in a form the
//! spec directory loader reads back to an equal snapshot.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use oxide_conv_core::factory::TableSpec;
use oxide_conv_core::structure::{DatabaseStructure, TableStructure};

use crate::error::Result;

/// Output format of spec files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SpecFormat {
    /// `.yml` files.
    #[default]
    Yaml,
    /// `.json` files.
    Json,
}

impl SpecFormat {
    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Json => "json",
        }
    }

    /// Serializes one spec document.
    ///
    /// # Errors
    ///
    /// Returns a YAML or JSON serialization error.
    pub fn render(self, spec: &TableSpec) -> Result<String> {
        Ok(match self {
            Self::Yaml => serde_yaml::to_string(spec)?,
            Self::Json => {
                let mut json = serde_json::to_string_pretty(spec)?;
                json.push('\n');
                json
            }
        })
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        })
    }
}

/// Writes spec files into one directory.
#[derive(Debug, Clone)]
pub struct SpecWriter {
    dir: PathBuf,
    format: SpecFormat,
}

impl SpecWriter {
    /// Creates a writer targeting `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: SpecFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Returns the target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path a table is written to.
    #[must_use]
    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.{}", self.format.extension()))
    }

    /// Writes one table, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns serialization and IO errors.
    pub fn write_table(&self, table: &TableStructure) -> Result<PathBuf> {
        let path = self.path_for(&table.name);
        let content = self.format.render(&table.to_spec())?;
        std::fs::write(&path, content)?;
        debug!(table = %table.name, path = %path.display(), "spec written");
        Ok(path)
    }

    /// Writes every table of `snapshot`, creating the directory first.
    ///
    /// # Errors
    ///
    /// Returns serialization and IO errors; files written before the
    /// failure are left in place.
    pub fn write_database(&self, snapshot: &DatabaseStructure) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir)?;
        let paths = snapshot
            .tables
            .values()
            .map(|table| self.write_table(table))
            .collect::<Result<Vec<_>>>()?;
        info!(dir = %self.dir.display(), files = paths.len(), format = %self.format, "specs written");
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_conv_core::factory::{AnySpecParser, DatabaseStructureFactory};
    use oxide_conv_core::structure::{
        ColumnStructure, ForeignKeyStructure, IndexStructure, PartitionMethod, PartitionStructure,
        ReferenceAction, ViewDefinition,
    };

    fn snapshot() -> DatabaseStructure {
        [
            TableStructure::new("teams")
                .engine("InnoDB")
                .comment("Teams")
                .column(ColumnStructure::new("id", "int(10) unsigned").auto_increment())
                .column(ColumnStructure::new("label", "varchar(32)").default_value("none"))
                .index(IndexStructure::primary(["id"]))
                .partition(PartitionStructure::short(PartitionMethod::Key, "`id`", 2)),
            TableStructure::new("users")
                .column(ColumnStructure::new("id", "bigint(20)"))
                .column(ColumnStructure::new("team_id", "int(10) unsigned").nullable())
                .index(IndexStructure::primary(["id"]))
                .index(IndexStructure::new("idx_team", false, "BTREE", ["team_id"]))
                .foreign_key(
                    ForeignKeyStructure::new("fk_team", ["team_id"], "teams", ["id"])
                        .on_delete(ReferenceAction::Cascade),
                ),
            TableStructure::view("team_names", ViewDefinition::new("select `label` from `teams`")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let original = snapshot();
        let writer = SpecWriter::new(dir.path(), SpecFormat::Yaml);
        let paths = writer.write_database(&original).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.extension().unwrap() == "yml"));

        let reloaded =
            DatabaseStructureFactory::from_spec_dir(dir.path(), &AnySpecParser, |_| true).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let original = snapshot();
        SpecWriter::new(dir.path().join("nested"), SpecFormat::Json)
            .write_database(&original)
            .unwrap();

        let reloaded =
            DatabaseStructureFactory::from_spec_dir(dir.path(), &AnySpecParser, |_| true).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_path_for() {
        let writer = SpecWriter::new("/specs", SpecFormat::Json);
        assert_eq!(writer.path_for("users"), PathBuf::from("/specs/users.json"));
        assert_eq!(writer.dir(), Path::new("/specs"));
    }
}
