//! Partition diffing.

use super::line::{MigrationLine, PartitionMigrationLine};
use crate::structure::PartitionStructure;

/// Compares two optional partitionings.
///
/// Partitioning is replaced wholesale: a new or changed scheme yields an
/// add line with the complete `PARTITION BY` clause, a removed one yields
/// `REMOVE PARTITIONING`.
#[must_use]
pub fn diff_partitions(
    before: Option<&PartitionStructure>,
    after: Option<&PartitionStructure>,
) -> PartitionMigrationLine {
    match (before, after) {
        (None, None) => MigrationLine::Noop,
        (Some(old), Some(new)) if old == new => MigrationLine::Noop,
        (_, Some(new)) => MigrationLine::Add(new.clone()),
        (Some(old), None) => MigrationLine::Drop(old.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{BoundaryOperator, PartitionMethod, PartitionPartStructure};

    fn by_year(bound: &str) -> PartitionStructure {
        PartitionStructure::long(
            PartitionMethod::Range,
            "year(`created`)",
            vec![
                PartitionPartStructure::new("p0", BoundaryOperator::LessThan, bound, ""),
                PartitionPartStructure::new("pmax", BoundaryOperator::LessThan, "MAXVALUE", ""),
            ],
        )
    }

    #[test]
    fn test_unpartitioned_and_unchanged_are_noop() {
        assert!(diff_partitions(None, None).is_noop());
        let partition = by_year("2020");
        assert!(diff_partitions(Some(&partition), Some(&partition)).is_noop());
    }

    #[test]
    fn test_changed_parts_replace_whole_scheme() {
        let old = by_year("2020");
        let new = by_year("2021");
        let line = diff_partitions(Some(&old), Some(&new));
        assert_eq!(line, MigrationLine::Add(new.clone()));
        assert_eq!(line.render(), vec![new.query()]);
    }

    #[test]
    fn test_method_change() {
        let old = PartitionStructure::short(PartitionMethod::Hash, "`id`", 4);
        let new = PartitionStructure::short(PartitionMethod::Key, "`id`", 4);
        assert_eq!(
            diff_partitions(Some(&old), Some(&new)).render(),
            vec!["PARTITION BY KEY (`id`) PARTITIONS 4".to_string()]
        );
    }

    #[test]
    fn test_removed_partitioning() {
        let old = PartitionStructure::short(PartitionMethod::Hash, "`id`", 4);
        assert_eq!(
            diff_partitions(Some(&old), None).render(),
            vec!["REMOVE PARTITIONING".to_string()]
        );
    }
}
