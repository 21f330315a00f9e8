//! Whole-database migration.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::table::{TableMigration, diff_table};
use crate::ordering::{dependency_order, extract_view_sources};
use crate::structure::{DatabaseStructure, TableStructure};

/// Ordered statements turning one snapshot into another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Migration {
    /// Statements in execution order.
    pub tables: Vec<TableMigration>,
    /// Wraps the statements in `SET FOREIGN_KEY_CHECKS = 0` / `= 1`.
    ///
    /// Set when created or dropped tables reference each other in a cycle,
    /// or when a dropped table is still referenced by a table that stays.
    pub disable_foreign_key_checks: bool,
}

impl Migration {
    /// Returns true when the snapshots are equivalent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns the number of table statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Renders every statement, without trailing semicolons.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        let mut statements: Vec<String> = self.tables.iter().map(TableMigration::query).collect();
        if self.disable_foreign_key_checks && !statements.is_empty() {
            statements.insert(0, "SET FOREIGN_KEY_CHECKS = 0".to_string());
            statements.push("SET FOREIGN_KEY_CHECKS = 1".to_string());
        }
        statements
    }

    /// Renders a script: statements terminated by `;` and separated by a
    /// blank line.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.statements()
            .iter()
            .map(|statement| format!("{statement};\n"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Orders structures so that the ones they depend on come first.
///
/// `depends_on` lists the names a structure needs; only names inside
/// `tables` count. Returns the structures and `true` when they depend on
/// each other in a cycle, in which case name order is used.
fn dependency_sorted<'a, F>(
    tables: &[&'a TableStructure],
    depends_on: F,
) -> (Vec<&'a TableStructure>, bool)
where
    F: Fn(&TableStructure) -> BTreeSet<String>,
{
    let by_name: BTreeMap<&str, &'a TableStructure> =
        tables.iter().map(|t| (t.name.as_str(), *t)).collect();
    let graph: BTreeMap<String, BTreeSet<String>> = tables
        .iter()
        .map(|t| {
            let references = depends_on(t)
                .into_iter()
                .filter(|r| by_name.contains_key(r.as_str()))
                .collect();
            (t.name.clone(), references)
        })
        .collect();

    match dependency_order(&graph) {
        Ok(order) => (
            order
                .iter()
                .filter_map(|name| by_name.get(name.as_str()).copied())
                .collect(),
            false,
        ),
        Err(err) => {
            debug!(error = %err, "falling back to name order");
            (by_name.into_values().collect(), true)
        }
    }
}

fn view_sources(view: &TableStructure) -> BTreeSet<String> {
    view.view_definition()
        .map(|definition| extract_view_sources(&definition.definition))
        .unwrap_or_default()
}

/// Computes the migration from `before` to `after`.
///
/// Statement order: views dropped, tables dropped (dependents first),
/// tables created (dependencies first), tables altered, views created or
/// replaced. Views that read other views are created after them and
/// dropped before them. An object that switches between table and view
/// is dropped and created again.
#[must_use]
pub fn generate_migration(before: &DatabaseStructure, after: &DatabaseStructure) -> Migration {
    let before_names: BTreeSet<&str> = before.table_names().collect();
    let after_names: BTreeSet<&str> = after.table_names().collect();

    let mut dropped: Vec<&TableStructure> = Vec::new();
    let mut created: Vec<&TableStructure> = Vec::new();
    let mut altered: Vec<TableMigration> = Vec::new();
    let mut replaced: Vec<TableMigration> = Vec::new();

    for name in before_names.difference(&after_names) {
        dropped.extend(before.get_table(name));
    }
    for name in after_names.difference(&before_names) {
        created.extend(after.get_table(name));
    }
    for name in before_names.intersection(&after_names) {
        let (Some(old), Some(new)) = (before.get_table(name), after.get_table(name)) else {
            continue;
        };
        if old.is_view() != new.is_view() {
            dropped.push(old);
            created.push(new);
            continue;
        }
        match diff_table(old, new) {
            Some(migration @ TableMigration::ReplaceView(_)) => replaced.push(migration),
            Some(migration) => altered.push(migration),
            None => {}
        }
    }

    let (dropped_views, dropped_tables): (Vec<_>, Vec<_>) =
        dropped.into_iter().partition(|t| t.is_view());
    let (created_views, created_tables): (Vec<_>, Vec<_>) =
        created.into_iter().partition(|t| t.is_view());

    let (mut drop_order, drop_cycle) =
        dependency_sorted(&dropped_tables, TableStructure::references);
    drop_order.reverse();
    let (create_order, create_cycle) =
        dependency_sorted(&created_tables, TableStructure::references);
    // FOREIGN_KEY_CHECKS has no bearing on views.
    let (mut dropped_views, _) = dependency_sorted(&dropped_views, view_sources);
    dropped_views.reverse();
    let (created_views, _) = dependency_sorted(&created_views, view_sources);

    let dropped_names: BTreeSet<&str> = dropped_tables.iter().map(|t| t.name.as_str()).collect();
    let still_referenced = before
        .tables
        .values()
        .filter(|t| !t.is_view() && !dropped_names.contains(t.name.as_str()))
        .any(|t| t.references().iter().any(|r| dropped_names.contains(r.as_str())));

    let mut tables = Vec::new();
    tables.extend(dropped_views.into_iter().cloned().map(TableMigration::Drop));
    tables.extend(drop_order.into_iter().cloned().map(TableMigration::Drop));
    tables.extend(create_order.into_iter().cloned().map(TableMigration::Create));
    tables.extend(altered);
    tables.extend(created_views.into_iter().cloned().map(TableMigration::Create));
    tables.extend(replaced);

    let migration = Migration {
        tables,
        disable_foreign_key_checks: drop_cycle || create_cycle || still_referenced,
    };
    info!(
        statements = migration.len(),
        disable_foreign_key_checks = migration.disable_foreign_key_checks,
        "migration generated"
    );
    migration
}
