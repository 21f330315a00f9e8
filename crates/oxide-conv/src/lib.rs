//! Schema-to-schema migrations for MySQL.
//!
//! `oxide-conv` loads two schema snapshots, diffs them with
//! [`oxide_conv_core`] and renders the DDL that turns the first into the
//! second.
//!
//! # Architecture
//!
//! - **Catalog** - async access to `information_schema` and `SHOW CREATE`
//!   output ([`catalog::MySqlCatalog`] on `sqlx`)
//! - **Introspect** - builds structures from a live database
//! - **Bootstrap** - materializes a directory of raw `CREATE` statements
//!   in a scratch database, in foreign-key order, and introspects it
//! - **Source** - `mysql:`, `spec:` and `sql:` snapshot sources
//! - **Writer** - writes a snapshot back out as spec files
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_conv::prelude::*;
//!
//! let mut catalog = MySqlCatalog::connect("mysql://root@localhost/shop").await?;
//! let options = ConvOptions::new().ignore_patterns(["^tmp_"])?;
//! let mut progress = LogProgress::new("load");
//!
//! let before = "mysql:shop".parse::<SchemaSource>()?;
//! let after = "spec:schema".parse::<SchemaSource>()?;
//! let before = before.load(Some(&mut catalog), &options, &mut progress).await?;
//! let after = after.load(Some(&mut catalog), &options, &mut progress).await?;
//!
//! print!("{}", generate_migration(&before, &after).to_sql());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Migration from a live database to a spec directory
//! oxide-conv --database-url mysql://root@localhost diff --from mysql:shop --to spec:schema
//!
//! # Dump a live database as spec files
//! oxide-conv reflect --from mysql:shop --output schema
//!
//! # Validate a spec directory
//! oxide-conv check schema
//! ```

pub mod bootstrap;
pub mod catalog;
pub mod error;
pub mod introspect;
pub mod options;
pub mod progress;
pub mod source;
pub mod writer;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::{SqlDirectoryBootstrap, read_statements};
    pub use crate::catalog::{Catalog, CatalogTable, MySqlCatalog, SqlExecutor};
    pub use crate::error::{ConvError, Result};
    pub use crate::introspect::Introspector;
    pub use crate::options::{ConvOptions, DEFAULT_SCRATCH_DATABASE};
    pub use crate::progress::LogProgress;
    pub use crate::source::SchemaSource;
    pub use crate::writer::{SpecFormat, SpecWriter};
    pub use oxide_conv_core::migration::{Migration, generate_migration};
    pub use oxide_conv_core::structure::DatabaseStructure;
}

/// Renders the header written above a generated migration.
#[must_use]
pub fn migration_header(
    from: &source::SchemaSource,
    to: &source::SchemaSource,
    generated_at: chrono::DateTime<chrono::Utc>,
) -> String {
    format!(
        "-- Generated by oxide-conv {} at {}\n-- from: {from}\n-- to:   {to}\n",
        env!("CARGO_PKG_VERSION"),
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
