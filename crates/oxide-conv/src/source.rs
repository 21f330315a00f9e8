//! Schema sources.
//!
//! A source names where a snapshot comes from:
//!
//! - `mysql:<database>` - a live database, introspected
//! - `spec:<dir>` - a directory of YAML/JSON spec files
//! - `sql:<dir>` - a directory of `CREATE` statements, materialized in
//!   the scratch database and introspected

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use oxide_conv_core::factory::{AnySpecParser, DatabaseStructureFactory};
use oxide_conv_core::progress::ProgressSink;
use oxide_conv_core::structure::{DatabaseStructure, TableStructure};

use crate::bootstrap::SqlDirectoryBootstrap;
use crate::catalog::{Catalog, SqlExecutor};
use crate::error::{ConvError, Result};
use crate::introspect::Introspector;
use crate::options::ConvOptions;

/// Where a snapshot is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Live database, by name.
    MySql(String),
    /// Spec file directory.
    Spec(PathBuf),
    /// Raw SQL directory.
    Sql(PathBuf),
}

impl SchemaSource {
    /// Returns whether loading needs a database connection.
    #[must_use]
    pub const fn requires_database(&self) -> bool {
        matches!(self, Self::MySql(_) | Self::Sql(_))
    }

    /// Loads the snapshot.
    ///
    /// `catalog` is only used by `mysql:` and `sql:` sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConvError::InvalidSource`] when a database is needed and
    /// `catalog` is `None`, otherwise the errors of the loader involved.
    pub async fn load<C, P>(
        &self,
        catalog: Option<&mut C>,
        options: &ConvOptions,
        progress: &mut P,
    ) -> Result<DatabaseStructure>
    where
        C: Catalog + SqlExecutor,
        P: ProgressSink + ?Sized,
    {
        let filter = |table: &TableStructure| options.accepts(table);
        match self {
            Self::Spec(dir) => Ok(DatabaseStructureFactory::from_spec_dir(
                dir,
                &AnySpecParser,
                filter,
            )?),
            Self::MySql(database) => {
                let catalog = catalog.ok_or_else(|| self.needs_connection())?;
                Introspector::new(catalog)
                    .database_structure(database, filter)
                    .await
            }
            Self::Sql(dir) => {
                let catalog = catalog.ok_or_else(|| self.needs_connection())?;
                SqlDirectoryBootstrap::new(catalog, options.scratch_database.clone())
                    .build(dir, progress, filter)
                    .await
            }
        }
    }

    fn needs_connection(&self) -> ConvError {
        ConvError::InvalidSource(format!("{self} needs a database connection (--database-url)"))
    }
}

impl FromStr for SchemaSource {
    type Err = ConvError;

    fn from_str(s: &str) -> Result<Self> {
        let Some((scheme, rest)) = s.split_once(':') else {
            return Err(ConvError::InvalidSource(format!(
                "{s} (expected mysql:<database>, spec:<dir> or sql:<dir>)"
            )));
        };
        if rest.is_empty() {
            return Err(ConvError::InvalidSource(s.to_string()));
        }
        match scheme.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySql(rest.to_string())),
            "spec" => Ok(Self::Spec(PathBuf::from(rest))),
            "sql" => Ok(Self::Sql(PathBuf::from(rest))),
            _ => Err(ConvError::InvalidSource(format!("{s} (unknown scheme '{scheme}')"))),
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql(database) => write!(f, "mysql:{database}"),
            Self::Spec(dir) => write!(f, "spec:{}", dir.display()),
            Self::Sql(dir) => write!(f, "sql:{}", dir.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            "mysql:shop".parse::<SchemaSource>().unwrap(),
            SchemaSource::MySql("shop".into())
        );
        assert_eq!(
            "spec:schema/specs".parse::<SchemaSource>().unwrap(),
            SchemaSource::Spec(PathBuf::from("schema/specs"))
        );
        assert_eq!(
            "SQL:/tmp/dump".parse::<SchemaSource>().unwrap(),
            SchemaSource::Sql(PathBuf::from("/tmp/dump"))
        );
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["shop", "mysql:", "postgres:shop"] {
            let err = bad.parse::<SchemaSource>().unwrap_err();
            assert!(matches!(err, ConvError::InvalidSource(_)), "{bad}");
        }
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["mysql:shop", "spec:specs", "sql:dump"] {
            let source: SchemaSource = raw.parse().unwrap();
            assert_eq!(source.to_string(), raw);
        }
        assert!(SchemaSource::Sql("d".into()).requires_database());
        assert!(!SchemaSource::Spec("d".into()).requires_database());
    }
}
