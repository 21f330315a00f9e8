//! Index and foreign key diffing.
//!
//! Both are keyed by name and neither is ever altered in place: a changed
//! definition is dropped under its old shape and added under its new one.

use std::collections::BTreeMap;

use super::line::{ForeignKeyMigrationLine, ForeignKeySet, IndexMigrationLine, IndexSet, MigrationLine};
use crate::structure::{ForeignKeyStructure, IndexStructure};

/// Splits two keyed maps into the entries to drop and the entries to add.
///
/// An entry whose value differs lands on both sides.
fn diff_keyed<T: Clone + PartialEq>(
    before: &BTreeMap<String, T>,
    after: &BTreeMap<String, T>,
) -> (BTreeMap<String, T>, BTreeMap<String, T>) {
    let dropped = before
        .iter()
        .filter(|(name, value)| after.get(*name) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let added = after
        .iter()
        .filter(|(name, value)| before.get(*name) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    (dropped, added)
}

/// Compares two index maps.
///
/// Always yields a composite line; each component is present only when it
/// has at least one index, so equal maps give a composite with neither.
#[must_use]
pub fn diff_indexes(
    before: &BTreeMap<String, IndexStructure>,
    after: &BTreeMap<String, IndexStructure>,
) -> IndexMigrationLine {
    let (dropped, added) = diff_keyed(before, after);
    MigrationLine::all(
        (!dropped.is_empty()).then_some(IndexSet(dropped)),
        (!added.is_empty()).then_some(IndexSet(added)),
    )
}

/// Compares two foreign key maps, with the same shape as [`diff_indexes`].
#[must_use]
pub fn diff_foreign_keys(
    before: &BTreeMap<String, ForeignKeyStructure>,
    after: &BTreeMap<String, ForeignKeyStructure>,
) -> ForeignKeyMigrationLine {
    let (dropped, added) = diff_keyed(before, after);
    MigrationLine::all(
        (!dropped.is_empty()).then_some(ForeignKeySet(dropped)),
        (!added.is_empty()).then_some(ForeignKeySet(added)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::ReferenceAction;

    fn keyed<T, F: Fn(&T) -> String>(items: Vec<T>, key: F) -> BTreeMap<String, T> {
        items.into_iter().map(|item| (key(&item), item)).collect()
    }

    #[test]
    fn test_changed_index_is_dropped_and_readded() {
        let before = keyed(
            vec![
                IndexStructure::new("idx_name", false, "BTREE", ["name"]),
                IndexStructure::primary(["id"]),
            ],
            |i| i.name.clone(),
        );
        let after = keyed(
            vec![
                IndexStructure::new("idx_name", false, "BTREE", ["name", "age"]),
                IndexStructure::primary(["id"]),
            ],
            |i| i.name.clone(),
        );
        assert_eq!(
            diff_indexes(&before, &after).render(),
            vec![
                "DROP INDEX `idx_name`".to_string(),
                "ADD KEY `idx_name` (`name`, `age`) USING BTREE".to_string(),
            ]
        );
    }

    #[test]
    fn test_primary_key_change() {
        let before = keyed(vec![IndexStructure::primary(["id"])], |i| i.name.clone());
        let after = keyed(vec![IndexStructure::primary(["id", "tenant"])], |i| i.name.clone());
        assert_eq!(
            diff_indexes(&before, &after).render(),
            vec![
                "DROP PRIMARY KEY".to_string(),
                "ADD PRIMARY KEY (`id`, `tenant`) USING BTREE".to_string(),
            ]
        );
    }

    #[test]
    fn test_foreign_key_action_change() {
        let fk = ForeignKeyStructure::new("fk_user", ["user_id"], "users", ["id"]);
        let before = keyed(vec![fk.clone()], |f| f.name.clone());
        let after = keyed(
            vec![fk.on_delete(ReferenceAction::Cascade)],
            |f| f.name.clone(),
        );
        let line = diff_foreign_keys(&before, &after);
        let rendered = line.render();
        assert_eq!(rendered[0], "DROP FOREIGN KEY `fk_user`");
        assert!(rendered[1].ends_with("ON DELETE CASCADE ON UPDATE RESTRICT"));
        assert!(diff_foreign_keys(&after, &after).is_noop());
    }

    #[test]
    fn test_foreign_key_removed_only() {
        let before = keyed(
            vec![ForeignKeyStructure::new("fk_user", ["user_id"], "users", ["id"])],
            |f| f.name.clone(),
        );
        let line = diff_foreign_keys(&before, &BTreeMap::new());
        assert!(line.add_component().is_none());
        assert_eq!(line.render(), vec!["DROP FOREIGN KEY `fk_user`".to_string()]);
    }
}
