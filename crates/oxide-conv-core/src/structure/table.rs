//! Table and view structures.

use std::collections::{BTreeMap, BTreeSet};

use super::{
    ColumnStructure, ForeignKeyStructure, IndexStructure, PartitionStructure, Properties,
    quote_identifier, quote_literal,
};

/// The `SELECT` behind a view plus its creation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    /// `UNDEFINED`, `MERGE` or `TEMPTABLE`.
    pub algorithm: String,
    /// `DEFINER` or `INVOKER`.
    pub security: String,
    /// The view query.
    pub definition: String,
}

impl ViewDefinition {
    /// Creates a definition with `UNDEFINED` algorithm and `DEFINER` security.
    #[must_use]
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            algorithm: "UNDEFINED".to_string(),
            security: "DEFINER".to_string(),
            definition: definition.into(),
        }
    }

    /// Compares two definitions, ignoring keyword case and whitespace layout.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.algorithm.eq_ignore_ascii_case(&other.algorithm)
            && self.security.eq_ignore_ascii_case(&other.security)
            && normalize_whitespace(&self.definition) == normalize_whitespace(&other.definition)
    }
}

fn normalize_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a structure describes a base table or a view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableKind {
    /// Base table.
    #[default]
    Table,
    /// View.
    View(ViewDefinition),
}

/// One table or view.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStructure {
    /// Table name.
    pub name: String,
    /// Table comment.
    pub comment: String,
    /// Storage engine; `None` for views.
    pub engine: Option<String>,
    /// Default character set.
    pub default_charset: Option<String>,
    /// Default collation.
    pub collation: Option<String>,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnStructure>,
    /// Indexes keyed by name.
    pub indexes: BTreeMap<String, IndexStructure>,
    /// Foreign keys keyed by constraint name.
    pub foreign_keys: BTreeMap<String, ForeignKeyStructure>,
    /// Partitioning, if any.
    pub partition: Option<PartitionStructure>,
    /// Base table or view.
    pub kind: TableKind,
    /// Spec-only metadata.
    pub properties: Properties,
}

impl TableStructure {
    /// Creates an empty base table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            engine: None,
            default_charset: None,
            collation: None,
            columns: Vec::new(),
            indexes: BTreeMap::new(),
            foreign_keys: BTreeMap::new(),
            partition: None,
            kind: TableKind::Table,
            properties: Properties::new(),
        }
    }

    /// Creates a view.
    #[must_use]
    pub fn view(name: impl Into<String>, definition: ViewDefinition) -> Self {
        Self {
            kind: TableKind::View(definition),
            ..Self::new(name)
        }
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets the engine.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the default character set.
    #[must_use]
    pub fn default_charset(mut self, charset: impl Into<String>) -> Self {
        self.default_charset = Some(charset.into());
        self
    }

    /// Sets the default collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnStructure) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds an index, replacing any index with the same name.
    #[must_use]
    pub fn index(mut self, index: IndexStructure) -> Self {
        self.indexes.insert(index.name.clone(), index);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKeyStructure) -> Self {
        self.foreign_keys.insert(foreign_key.name.clone(), foreign_key);
        self
    }

    /// Sets the partitioning.
    #[must_use]
    pub fn partition(mut self, partition: PartitionStructure) -> Self {
        self.partition = Some(partition);
        self
    }

    /// Replaces the opaque properties.
    #[must_use]
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Returns whether this is a view.
    #[must_use]
    pub const fn is_view(&self) -> bool {
        matches!(self.kind, TableKind::View(_))
    }

    /// Returns the view definition, if this is a view.
    #[must_use]
    pub const fn view_definition(&self) -> Option<&ViewDefinition> {
        match &self.kind {
            TableKind::View(definition) => Some(definition),
            TableKind::Table => None,
        }
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, field: &str) -> Option<&ColumnStructure> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Returns indexes with the primary key first, then by name.
    pub fn ordered_indexes(&self) -> impl Iterator<Item = &IndexStructure> {
        let primary = self.indexes.values().filter(|i| i.is_primary());
        primary.chain(self.indexes.values().filter(|i| !i.is_primary()))
    }

    /// Names of other tables this table references through foreign keys.
    #[must_use]
    pub fn references(&self) -> BTreeSet<String> {
        self.foreign_keys
            .values()
            .map(|fk| fk.referenced_table.clone())
            .filter(|table| *table != self.name)
            .collect()
    }

    /// Renders the table options (`ENGINE=… DEFAULT CHARSET=… COMMENT=…`).
    #[must_use]
    pub fn options_query(&self) -> String {
        let mut options = Vec::new();
        if let Some(engine) = &self.engine {
            options.push(format!("ENGINE={engine}"));
        }
        if let Some(charset) = &self.default_charset {
            options.push(format!("DEFAULT CHARSET={charset}"));
        }
        if let Some(collation) = &self.collation {
            options.push(format!("COLLATE={collation}"));
        }
        if !self.comment.is_empty() {
            options.push(format!("COMMENT={}", quote_literal(&self.comment)));
        }
        options.join(" ")
    }

    /// Renders the complete `CREATE TABLE` (or `CREATE VIEW`) statement.
    #[must_use]
    pub fn create_query(&self) -> String {
        if let TableKind::View(view) = &self.kind {
            return format!("CREATE {}", self.view_body(view));
        }

        let mut definitions: Vec<String> =
            self.columns.iter().map(ColumnStructure::create_query).collect();
        definitions.extend(self.ordered_indexes().map(IndexStructure::create_query));
        definitions.extend(self.foreign_keys.values().map(ForeignKeyStructure::create_query));

        let mut sql = format!(
            "CREATE TABLE {} (\n  {}\n)",
            quote_identifier(&self.name),
            definitions.join(",\n  ")
        );
        let options = self.options_query();
        if !options.is_empty() {
            sql.push(' ');
            sql.push_str(&options);
        }
        if let Some(partition) = &self.partition {
            sql.push('\n');
            sql.push_str(&partition.query());
        }
        sql
    }

    /// Renders `CREATE OR REPLACE VIEW`; `None` for base tables.
    #[must_use]
    pub fn replace_query(&self) -> Option<String> {
        self.view_definition()
            .map(|view| format!("CREATE OR REPLACE {}", self.view_body(view)))
    }

    /// Renders `DROP TABLE` or `DROP VIEW`.
    #[must_use]
    pub fn drop_query(&self) -> String {
        let object = if self.is_view() { "VIEW" } else { "TABLE" };
        format!("DROP {object} {}", quote_identifier(&self.name))
    }

    fn view_body(&self, view: &ViewDefinition) -> String {
        format!(
            "ALGORITHM={} SQL SECURITY {} VIEW {} AS {}",
            view.algorithm,
            view.security,
            quote_identifier(&self.name),
            view.definition
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{PartitionMethod, ReferenceAction};

    fn posts() -> TableStructure {
        TableStructure::new("posts")
            .engine("InnoDB")
            .default_charset("utf8mb4")
            .comment("Posts")
            .column(ColumnStructure::new("id", "int(10) unsigned").auto_increment())
            .column(ColumnStructure::new("user_id", "int(10) unsigned"))
            .index(IndexStructure::new("idx_user", false, "BTREE", ["user_id"]))
            .index(IndexStructure::primary(["id"]))
            .foreign_key(
                ForeignKeyStructure::new("fk_user", ["user_id"], "users", ["id"])
                    .on_delete(ReferenceAction::Cascade),
            )
    }

    #[test]
    fn test_create_query() {
        assert_eq!(
            posts().create_query(),
            "CREATE TABLE `posts` (\n  \
             `id` int(10) UNSIGNED NOT NULL AUTO_INCREMENT COMMENT '',\n  \
             `user_id` int(10) UNSIGNED NOT NULL COMMENT '',\n  \
             PRIMARY KEY (`id`) USING BTREE,\n  \
             KEY `idx_user` (`user_id`) USING BTREE,\n  \
             CONSTRAINT `fk_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE ON UPDATE RESTRICT\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='Posts'"
        );
    }

    #[test]
    fn test_create_query_with_partition() {
        let table = posts().partition(PartitionStructure::short(PartitionMethod::Hash, "`id`", 2));
        assert!(
            table
                .create_query()
                .ends_with("COMMENT='Posts'\nPARTITION BY HASH (`id`) PARTITIONS 2")
        );
    }

    #[test]
    fn test_references_skip_self() {
        let table = posts().foreign_key(ForeignKeyStructure::new(
            "fk_parent",
            ["parent_id"],
            "posts",
            ["id"],
        ));
        let references: Vec<String> = table.references().into_iter().collect();
        assert_eq!(references, vec!["users".to_string()]);
    }

    #[test]
    fn test_view_queries() {
        let view = TableStructure::view("active_users", ViewDefinition::new("SELECT * FROM `users`"));
        assert!(view.is_view());
        assert_eq!(
            view.create_query(),
            "CREATE ALGORITHM=UNDEFINED SQL SECURITY DEFINER VIEW `active_users` AS SELECT * FROM `users`"
        );
        assert_eq!(
            view.replace_query().as_deref(),
            Some(
                "CREATE OR REPLACE ALGORITHM=UNDEFINED SQL SECURITY DEFINER VIEW `active_users` AS SELECT * FROM `users`"
            )
        );
        assert_eq!(view.drop_query(), "DROP VIEW `active_users`");
        assert_eq!(posts().drop_query(), "DROP TABLE `posts`");
        assert_eq!(posts().replace_query(), None);
    }

    #[test]
    fn test_view_equivalence_ignores_layout() {
        let a = ViewDefinition::new("SELECT id\n  FROM users");
        let mut b = ViewDefinition::new("SELECT id FROM users");
        assert!(a.is_equivalent(&b));
        b.algorithm = "merge".into();
        assert!(!a.is_equivalent(&b));
    }
}
