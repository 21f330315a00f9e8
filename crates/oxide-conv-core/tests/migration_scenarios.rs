//! End-to-end migration scenarios.
//!
//! Snapshots are built from YAML spec documents the same way a spec
//! directory is loaded, then diffed into ordered statements.

use std::path::Path;

use oxide_conv_core::factory::{SpecParser, YamlSpecParser, structure_from_document};
use oxide_conv_core::migration::{TableMigration, diff_columns, diff_partitions};
use oxide_conv_core::prelude::*;

fn snapshot(files: &[(&str, &str)]) -> DatabaseStructure {
    files
        .iter()
        .map(|(name, yaml)| {
            let document = YamlSpecParser
                .parse_str(Path::new(&format!("{name}.yml")), yaml)
                .unwrap_or_else(|e| panic!("bad fixture {name}: {e}"));
            structure_from_document(name, document)
                .unwrap_or_else(|e| panic!("bad fixture {name}: {e}"))
        })
        .collect()
}

// =============================================================================
// Fixtures
// =============================================================================

const TEAMS_V1: &str = "
comment: Teams
engine: InnoDB
column:
  id:
    type: int(10)
    attribute: [unsigned, auto_increment]
primary_key: [id]
";

const TEAMS_V2: &str = "
comment: Teams v2
engine: InnoDB
column:
  id:
    type: int(10)
    attribute: [unsigned, auto_increment]
primary_key: [id]
";

const USERS_V1: &str = "
engine: InnoDB
column:
  id:
    type: int(10) unsigned
    attribute: [auto_increment]
  name:
    type: varchar(64)
  team_id:
    type: int(10) unsigned
    attribute: [nullable]
primary_key: [id]
foreign_key:
  fk_users_team:
    column: [team_id]
    reference_table: teams
    reference_column: [id]
";

const USERS_V2: &str = "
engine: InnoDB
column:
  id:
    type: int(10) unsigned
    attribute: [auto_increment]
  name:
    type: varchar(64)
  email:
    type: varchar(255)
primary_key: [id]
index:
  uq_email:
    column: [email]
    unique: true
";

const PROJECTS: &str = "
column:
  id:
    type: int(10) unsigned
    attribute: [auto_increment]
  owner_id:
    type: int(10) unsigned
primary_key: [id]
index:
  idx_owner:
    column: [owner_id]
foreign_key:
  fk_projects_owner:
    column: [owner_id]
    reference_table: users
    reference_column: [id]
    on_delete: CASCADE
";

const ACTIVE_USERS_V1: &str = "
table_type: VIEW
definition: select `id` from `users`
";

const ACTIVE_USERS_V2: &str = "
table_type: VIEW
definition: select `id`, `email` from `users`
";

fn v1() -> DatabaseStructure {
    snapshot(&[
        ("teams", TEAMS_V1),
        ("users", USERS_V1),
        ("active_users", ACTIVE_USERS_V1),
    ])
}

fn v2() -> DatabaseStructure {
    snapshot(&[
        ("teams", TEAMS_V2),
        ("users", USERS_V2),
        ("projects", PROJECTS),
        ("active_users", ACTIVE_USERS_V2),
    ])
}

// =============================================================================
// Forward migration
// =============================================================================

#[test]
fn test_forward_statement_order() {
    let migration = generate_migration(&v1(), &v2());
    assert!(!migration.disable_foreign_key_checks);

    let kinds: Vec<(&str, &str)> = migration
        .tables
        .iter()
        .map(|m| {
            let kind = match m {
                TableMigration::Create(_) => "create",
                TableMigration::Drop(_) => "drop",
                TableMigration::Alter(_) => "alter",
                TableMigration::ReplaceView(_) => "replace",
            };
            (kind, m.table_name())
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("create", "projects"),
            ("alter", "teams"),
            ("alter", "users"),
            ("replace", "active_users"),
        ]
    );
}

#[test]
fn test_forward_statements() {
    let statements = generate_migration(&v1(), &v2()).statements();
    assert_eq!(statements.len(), 4);

    assert!(statements[0].starts_with("CREATE TABLE `projects` (\n  `id` int(10) UNSIGNED NOT NULL AUTO_INCREMENT COMMENT ''"));
    assert!(statements[0].contains("PRIMARY KEY (`id`) USING BTREE"));
    assert!(statements[0].contains(
        "CONSTRAINT `fk_projects_owner` FOREIGN KEY (`owner_id`) REFERENCES `users` (`id`) ON DELETE CASCADE ON UPDATE RESTRICT"
    ));

    assert_eq!(statements[1], "ALTER TABLE `teams`\n  COMMENT='Teams v2'");
    assert_eq!(
        statements[2],
        "ALTER TABLE `users`\n  \
         DROP FOREIGN KEY `fk_users_team`,\n  \
         DROP COLUMN `team_id`,\n  \
         ADD COLUMN `email` varchar(255) NOT NULL COMMENT '' AFTER `name`,\n  \
         ADD UNIQUE KEY `uq_email` (`email`) USING BTREE"
    );
    assert_eq!(
        statements[3],
        "CREATE OR REPLACE ALGORITHM=UNDEFINED SQL SECURITY DEFINER VIEW `active_users` AS select `id`, `email` from `users`"
    );
}

// =============================================================================
// Reverse migration
// =============================================================================

#[test]
fn test_reverse_drops_new_table_first() {
    let statements = generate_migration(&v2(), &v1()).statements();
    assert_eq!(statements[0], "DROP TABLE `projects`");

    let users = statements
        .iter()
        .find(|s| s.starts_with("ALTER TABLE `users`"))
        .unwrap();
    let drop_index = users.find("DROP INDEX `uq_email`").unwrap();
    let drop_column = users.find("DROP COLUMN `email`").unwrap();
    let add_column = users
        .find("ADD COLUMN `team_id` int(10) UNSIGNED DEFAULT NULL COMMENT '' AFTER `name`")
        .unwrap();
    let add_fk = users.find("ADD CONSTRAINT `fk_users_team`").unwrap();
    assert!(drop_index < drop_column);
    assert!(drop_column < add_column);
    assert!(add_column < add_fk);
}

#[test]
fn test_dropping_referenced_table_disables_checks() {
    let before = snapshot(&[("teams", TEAMS_V1), ("users", USERS_V1)]);
    let after = snapshot(&[("users", USERS_V2)]);

    let statements = generate_migration(&before, &after).statements();
    assert_eq!(statements.first().unwrap(), "SET FOREIGN_KEY_CHECKS = 0");
    assert_eq!(statements[1], "DROP TABLE `teams`");
    assert_eq!(statements.last().unwrap(), "SET FOREIGN_KEY_CHECKS = 1");
}

// =============================================================================
// Idempotence and emptiness
// =============================================================================

#[test]
fn test_same_snapshot_produces_nothing() {
    for db in [v1(), v2()] {
        let migration = generate_migration(&db, &db);
        assert!(migration.is_empty());
        assert_eq!(migration.to_sql(), "");
        for table in db.tables.values() {
            assert!(diff_table(table, table).is_none());
            assert!(diff_columns(&table.columns, &table.columns).is_noop());
            assert!(diff_indexes(&table.indexes, &table.indexes).is_noop());
            assert!(diff_partitions(table.partition.as_ref(), table.partition.as_ref()).is_noop());
        }
    }
}

#[test]
fn test_empty_sides() {
    let db = v2();
    let empty = DatabaseStructure::new();

    let create = generate_migration(&empty, &db);
    assert!(create.tables.iter().all(|m| matches!(m, TableMigration::Create(_))));
    assert_eq!(create.len(), db.len());
    // dependencies of a root come right before it, the view last
    let order: Vec<&str> = create.tables.iter().map(TableMigration::table_name).collect();
    assert_eq!(order, vec!["users", "projects", "teams", "active_users"]);

    let drop = generate_migration(&db, &empty);
    let order: Vec<&str> = drop.tables.iter().map(TableMigration::table_name).collect();
    assert_eq!(order, vec!["active_users", "teams", "projects", "users"]);

    let users = db.get_table("users").unwrap();
    let line = diff_indexes(&std::collections::BTreeMap::new(), &users.indexes);
    assert!(line.drop_component().is_none());
    let line = diff_indexes(&users.indexes, &std::collections::BTreeMap::new());
    assert!(line.add_component().is_none());
}

// =============================================================================
// Generated columns
// =============================================================================

#[test]
fn test_generated_column_never_renders_default_or_auto_increment() {
    let db = snapshot(&[(
        "orders",
        "
column:
  price:
    type: decimal(10,2)
  total:
    type: decimal(10,2)
    default: '0'
    attribute: [auto_increment, stored]
    generated: price * 2
",
    )]);
    let create = db.get_table("orders").unwrap().create_query();
    let total = create.lines().find(|l| l.contains("`total`")).unwrap();
    assert!(total.contains("AS (price * 2) STORED"));
    assert!(!total.contains("DEFAULT"));
    assert!(!total.contains("AUTO_INCREMENT"));
}

// =============================================================================
// Partitions
// =============================================================================

#[test]
fn test_partition_change_is_wholesale() {
    let before = snapshot(&[(
        "events",
        "
column:
  id: {type: int(11)}
partition:
  method: HASH
  expression: id
  count: 4
",
    )]);
    let after = snapshot(&[(
        "events",
        "
column:
  id: {type: int(11)}
partition:
  method: RANGE
  expression: id
  part:
    - {name: p0, value: 100}
    - {name: pmax, value: MAXVALUE}
",
    )]);

    let statements = generate_migration(&before, &after).statements();
    assert_eq!(
        statements,
        vec![
            "ALTER TABLE `events`\nPARTITION BY RANGE (id)\n(PARTITION `p0` VALUES LESS THAN (100),\n PARTITION `pmax` VALUES LESS THAN MAXVALUE)"
                .to_string()
        ]
    );

    let unpartition = generate_migration(&before, &snapshot(&[("events", "column:\n  id: {type: int(11)}\n")]));
    assert_eq!(
        unpartition.statements(),
        vec!["ALTER TABLE `events`\nREMOVE PARTITIONING".to_string()]
    );
}
