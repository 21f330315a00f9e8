//! MySQL schema model and migration generator.
//!
//! `oxide-conv-core` captures a MySQL schema as plain values and computes
//! the DDL that turns one snapshot into another. It performs no I/O
//! against a database: catalog rows are fetched elsewhere and handed to
//! the factories here.
//!
//! # Architecture
//!
//! - **Structure** - `ColumnStructure`, `IndexStructure`,
//!   `PartitionStructure`, `ForeignKeyStructure`, `TableStructure` and
//!   `DatabaseStructure`
//! - **Factory** - builds structures from catalog rows or spec files
//! - **Ordering** - foreign-key dependency order for `CREATE`/`DROP`
//! - **Migration** - per-entity diff functions, migration lines and the
//!   top-level [`generate_migration`](migration::generate_migration)
//!
//! # Example
//!
//! ```rust
//! use oxide_conv_core::prelude::*;
//!
//! let before: DatabaseStructure = [TableStructure::new("users")
//!     .column(ColumnStructure::new("id", "int(10) unsigned").auto_increment())
//!     .index(IndexStructure::primary(["id"]))]
//! .into_iter()
//! .collect();
//!
//! let after: DatabaseStructure = [TableStructure::new("users")
//!     .column(ColumnStructure::new("id", "int(10) unsigned").auto_increment())
//!     .column(ColumnStructure::new("email", "varchar(255)"))
//!     .index(IndexStructure::primary(["id"]))]
//! .into_iter()
//! .collect();
//!
//! let migration = generate_migration(&before, &after);
//! assert_eq!(
//!     migration.statements(),
//!     vec!["ALTER TABLE `users`\n  ADD COLUMN `email` varchar(255) NOT NULL COMMENT '' AFTER `id`"]
//! );
//! ```

pub mod error;
pub mod factory;
pub mod migration;
pub mod ordering;
pub mod progress;
pub mod structure;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, SchemaError};
    pub use crate::factory::{
        AnySpecParser, DatabaseStructureFactory, JsonSpecParser, SpecParser, TableSpec,
        TableStructureFactory, ViewStructureFactory, YamlSpecParser,
    };
    pub use crate::migration::{
        Migration, MigrationLine, TableMigration, diff_columns, diff_indexes, diff_partitions,
        diff_table, generate_migration,
    };
    pub use crate::ordering::{PendingStatement, creation_order, dependency_order};
    pub use crate::progress::{ProgressSink, SilentProgress};
    pub use crate::structure::{
        ColumnStructure, DatabaseStructure, ForeignKeyStructure, IndexStructure,
        PartitionStructure, TableStructure, ViewDefinition,
    };
}
