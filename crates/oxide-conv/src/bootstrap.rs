//! Structures from a directory of raw `CREATE` statements.
//!
//! Each `<name>.sql` file holds the single statement that creates table or
//! view `<name>`. The statements are run against a scratch database in
//! foreign-key dependency order (views last), the scratch database is
//! introspected, then dropped.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use oxide_conv_core::ordering::{PendingStatement, creation_order};
use oxide_conv_core::progress::ProgressSink;
use oxide_conv_core::structure::{DatabaseStructure, TableStructure, quote_identifier};

use crate::catalog::{Catalog, SqlExecutor};
use crate::error::{ConvError, Result};
use crate::introspect::Introspector;

/// Reads every `.sql` file directly under `dir`, keyed by file stem.
///
/// # Errors
///
/// Returns [`ConvError::Io`] when the directory or a file cannot be read.
pub fn read_statements(dir: &Path) -> Result<BTreeMap<String, PendingStatement>> {
    let mut pending = BTreeMap::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            ConvError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!("failed to read {}", dir.display()))
            }))
        })?;
        let path = entry.path();
        let is_sql = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if !entry.file_type().is_file() || !is_sql {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let text = std::fs::read_to_string(path)?;
        let text = text.trim().trim_end_matches(';').trim_end();
        if text.is_empty() {
            warn!(file = %path.display(), "empty statement file skipped");
            continue;
        }
        pending.insert(name.to_string(), PendingStatement::new(name, text));
    }
    Ok(pending)
}

/// Materializes a SQL directory in a scratch database and introspects it.
pub struct SqlDirectoryBootstrap<'a, C> {
    catalog: &'a mut C,
    scratch_database: String,
}

impl<'a, C: Catalog + SqlExecutor> SqlDirectoryBootstrap<'a, C> {
    /// Creates a bootstrap that owns `scratch_database` for its run.
    pub fn new(catalog: &'a mut C, scratch_database: impl Into<String>) -> Self {
        Self {
            catalog,
            scratch_database: scratch_database.into(),
        }
    }

    /// Builds the snapshot described by the `.sql` files in `dir`.
    ///
    /// The execution order is computed before the scratch database is
    /// touched, so a reference to a table with no file, or tables that
    /// reference each other in a cycle, fail without side effects. The
    /// scratch database is dropped even when a statement fails.
    ///
    /// # Errors
    ///
    /// Returns [`oxide_conv_core::error::SchemaError::MissingReference`]
    /// or [`oxide_conv_core::error::SchemaError::CyclicDependency`] for
    /// bad ordering, and any IO or database error unchanged.
    pub async fn build<P, F>(&mut self, dir: &Path, progress: &mut P, filter: F) -> Result<DatabaseStructure>
    where
        P: ProgressSink + ?Sized,
        F: Fn(&TableStructure) -> bool,
    {
        let mut pending = read_statements(dir)?;
        let order = creation_order(&pending)?;

        let scratch = quote_identifier(&self.scratch_database);
        self.catalog
            .execute(&format!("DROP DATABASE IF EXISTS {scratch}"))
            .await?;
        self.catalog.execute(&format!("CREATE DATABASE {scratch}")).await?;
        info!(database = %self.scratch_database, statements = order.len(), "scratch database created");

        let result = match self.materialize(&mut pending, &order, progress).await {
            Ok(()) => {
                Introspector::new(&mut *self.catalog)
                    .database_structure(&self.scratch_database, filter)
                    .await
            }
            Err(err) => Err(err),
        };
        let dropped = self.catalog.execute(&format!("DROP DATABASE {scratch}")).await;

        let snapshot = result?;
        dropped?;
        progress.finish(&format!("{} tables loaded from {}", snapshot.len(), dir.display()));
        Ok(snapshot)
    }

    async fn materialize<P>(
        &mut self,
        pending: &mut BTreeMap<String, PendingStatement>,
        order: &[String],
        progress: &mut P,
    ) -> Result<()>
    where
        P: ProgressSink + ?Sized,
    {
        let scratch = quote_identifier(&self.scratch_database);
        self.catalog.execute(&format!("USE {scratch}")).await?;
        // raw dumps may carry zero dates and similar legacy values
        self.catalog.execute("SET sql_mode = ''").await?;

        progress.start_progress(order.len());
        for name in order {
            let Some(statement) = pending.get_mut(name) else {
                continue;
            };
            if statement.created {
                continue;
            }
            debug!(table = %name, view = statement.is_view, "creating");
            self.catalog.execute(&statement.text).await?;
            statement.created = true;
            progress.advance();
        }
        Ok(())
    }
}
