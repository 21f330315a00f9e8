//! Migration generation.
//!
//! Each entity kind has a pure diff function producing a
//! [`MigrationLine`]. [`diff_table`] composes them into one `ALTER TABLE`
//! and [`generate_migration`] orders the per-table results for a whole
//! database:
//!
//! ```text
//! DROP VIEW …            (views first, tables may back them)
//! DROP TABLE …           (dependents before dependencies)
//! CREATE TABLE …         (dependencies before dependents)
//! ALTER TABLE …
//! CREATE VIEW … / CREATE OR REPLACE VIEW …
//! ```
//!
//! Diffing never fails and never mutates its inputs.

mod column;
mod index;
mod line;
mod partition;
mod plan;
mod table;

pub use column::diff_columns;
pub use index::{diff_foreign_keys, diff_indexes};
pub use line::{
    ColumnChange, ColumnMigrationLine, ColumnPosition, ColumnSet, ForeignKeyMigrationLine,
    ForeignKeySet, IndexMigrationLine, IndexSet, LinePayload, MigrationLine,
    PartitionMigrationLine,
};
pub use partition::diff_partitions;
pub use plan::{Migration, generate_migration};
pub use table::{TableAlteration, TableMigration, diff_table, diff_table_options};
