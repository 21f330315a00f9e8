//! Column diffing.

use std::collections::BTreeSet;

use super::line::{ColumnChange, ColumnMigrationLine, ColumnPosition, ColumnSet, MigrationLine};
use crate::structure::ColumnStructure;

/// Compares two column sequences by field name.
///
/// Added columns keep the new schema's order and carry a `FIRST` or
/// `AFTER` placement. Columns present on both sides are modified only
/// when [`ColumnStructure::is_changed`] says so; a pure reordering of
/// unchanged columns produces nothing.
#[must_use]
pub fn diff_columns(before: &[ColumnStructure], after: &[ColumnStructure]) -> ColumnMigrationLine {
    let after_names: BTreeSet<&str> = after.iter().map(|c| c.field.as_str()).collect();

    let dropped: Vec<ColumnChange> = before
        .iter()
        .filter(|c| !after_names.contains(c.field.as_str()))
        .cloned()
        .map(ColumnChange::Dropped)
        .collect();

    let mut changed = Vec::new();
    let mut previous: Option<&str> = None;
    for column in after {
        match before.iter().find(|c| c.field == column.field) {
            None => changed.push(ColumnChange::Added {
                column: column.clone(),
                position: previous
                    .map_or(ColumnPosition::First, |p| ColumnPosition::After(p.to_string())),
            }),
            Some(old) if old.is_changed(column) => {
                changed.push(ColumnChange::Modified(column.clone()));
            }
            Some(_) => {}
        }
        previous = Some(&column.field);
    }

    match (dropped.is_empty(), changed.is_empty()) {
        (true, true) => MigrationLine::Noop,
        (false, true) => MigrationLine::Drop(ColumnSet(dropped)),
        (true, false) => MigrationLine::Add(ColumnSet(changed)),
        (false, false) => MigrationLine::all(Some(ColumnSet(dropped)), Some(ColumnSet(changed))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnStructure> {
        vec![
            ColumnStructure::new("id", "int(10) unsigned").auto_increment(),
            ColumnStructure::new("name", "varchar(64)"),
            ColumnStructure::new("age", "int(11)").nullable(),
        ]
    }

    #[test]
    fn test_identical_columns_are_noop() {
        assert!(diff_columns(&columns(), &columns()).is_noop());
    }

    #[test]
    fn test_reordering_alone_is_noop() {
        let mut reordered = columns();
        reordered.swap(1, 2);
        assert!(diff_columns(&columns(), &reordered).is_noop());
    }

    #[test]
    fn test_added_column_is_placed_after_predecessor() {
        let mut after = columns();
        after.insert(2, ColumnStructure::new("email", "varchar(255)"));
        let line = diff_columns(&columns(), &after);
        assert_eq!(
            line.render(),
            vec!["ADD COLUMN `email` varchar(255) NOT NULL COMMENT '' AFTER `name`".to_string()]
        );
        assert!(line.drop_component().is_none());
    }

    #[test]
    fn test_added_first_column() {
        let mut after = columns();
        after.insert(0, ColumnStructure::new("tenant", "int(11)"));
        let line = diff_columns(&columns(), &after);
        assert_eq!(
            line.render(),
            vec!["ADD COLUMN `tenant` int(11) NOT NULL COMMENT '' FIRST".to_string()]
        );
    }

    #[test]
    fn test_dropped_column() {
        let line = diff_columns(&columns(), &columns()[..2]);
        assert_eq!(line.render(), vec!["DROP COLUMN `age`".to_string()]);
        assert!(line.add_component().is_none());
    }

    #[test]
    fn test_modified_column_reuses_base_query() {
        let mut after = columns();
        after[1] = ColumnStructure::new("name", "varchar(128)").collation("utf8mb4_bin");
        let line = diff_columns(&columns(), &after);
        assert_eq!(
            line.render(),
            vec![
                "MODIFY COLUMN `name` varchar(128) COLLATE utf8mb4_bin NOT NULL COMMENT ''"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_drop_and_add_render_drop_first() {
        let after = vec![
            ColumnStructure::new("id", "int(10) unsigned").auto_increment(),
            ColumnStructure::new("title", "varchar(64)"),
        ];
        let line = diff_columns(&columns(), &after);
        let rendered = line.render();
        assert_eq!(rendered.len(), 3);
        assert!(rendered[0].starts_with("DROP COLUMN"));
        assert!(rendered[1].starts_with("DROP COLUMN"));
        assert_eq!(
            rendered[2],
            "ADD COLUMN `title` varchar(64) NOT NULL COMMENT '' AFTER `id`"
        );
    }

    #[test]
    fn test_generated_column_never_gets_default_when_added() {
        let mut after = columns();
        after.push(
            ColumnStructure::new("next_age", "int(11)")
                .default_value("1")
                .auto_increment()
                .generated("`age` + 1", false),
        );
        let rendered = diff_columns(&columns(), &after).render();
        assert_eq!(rendered.len(), 1);
        assert!(!rendered[0].contains("DEFAULT"));
        assert!(!rendered[0].contains("AUTO_INCREMENT"));
    }
}
