//! Structures from catalog metadata.
//!
//! The row types mirror what MySQL's `information_schema` and `SHOW`
//! statements return for one table. Fetching them is the caller's job;
//! this module only interprets them.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SchemaError};
use crate::structure::{
    Attribute, ColumnStructure, ForeignKeyStructure, IndexColumn, IndexStructure,
    PartitionMethod, PartitionPartStructure, PartitionStructure, PartitionType, ReferenceAction,
    TableStructure, ViewDefinition, quote_identifier,
};

static VIEW_ALGORITHM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bALGORITHM\s*=\s*(\w+)").expect("valid regex"));

/// `SHOW TABLE STATUS` / `information_schema.TABLES` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStatusRow {
    /// Table name.
    pub name: String,
    /// `ENGINE`.
    pub engine: Option<String>,
    /// `TABLE_COLLATION`.
    pub collation: Option<String>,
    /// `TABLE_COMMENT`.
    pub comment: String,
}

/// `information_schema.COLUMNS` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRow {
    /// `COLUMN_NAME`.
    pub column_name: String,
    /// `COLUMN_TYPE`, e.g. `int(10) unsigned`.
    pub column_type: String,
    /// `IS_NULLABLE`, `YES` or `NO`.
    pub is_nullable: String,
    /// `COLUMN_DEFAULT`.
    pub column_default: Option<String>,
    /// `COLUMN_COMMENT`.
    pub column_comment: String,
    /// `EXTRA`, e.g. `auto_increment` or `STORED GENERATED`.
    pub extra: String,
    /// `COLLATION_NAME`.
    pub collation_name: Option<String>,
    /// `GENERATION_EXPRESSION`; empty for ordinary columns.
    pub generation_expression: Option<String>,
}

/// `SHOW INDEX` / `information_schema.STATISTICS` row; one per key column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRow {
    /// `Key_name`.
    pub key_name: String,
    /// `Non_unique`.
    pub non_unique: bool,
    /// `Index_type`.
    pub index_type: String,
    /// `Column_name`.
    pub column_name: String,
    /// `Sub_part`.
    pub sub_part: Option<u32>,
    /// `Seq_in_index`, starting at 1.
    pub seq_in_index: u32,
}

/// `information_schema.PARTITIONS` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionRow {
    /// `PARTITION_NAME`; `None` for unpartitioned tables.
    pub partition_name: Option<String>,
    /// `PARTITION_METHOD`.
    pub partition_method: Option<String>,
    /// `PARTITION_EXPRESSION`.
    pub partition_expression: Option<String>,
    /// `PARTITION_DESCRIPTION`.
    pub partition_description: Option<String>,
    /// `PARTITION_COMMENT`.
    pub partition_comment: String,
    /// `PARTITION_ORDINAL_POSITION`.
    pub ordinal_position: Option<u32>,
}

/// `KEY_COLUMN_USAGE` joined with `REFERENTIAL_CONSTRAINTS`; one per key column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKeyRow {
    /// `CONSTRAINT_NAME`.
    pub constraint_name: String,
    /// `COLUMN_NAME`.
    pub column_name: String,
    /// `REFERENCED_TABLE_NAME`.
    pub referenced_table_name: String,
    /// `REFERENCED_COLUMN_NAME`.
    pub referenced_column_name: String,
    /// `UPDATE_RULE`.
    pub update_rule: String,
    /// `DELETE_RULE`.
    pub delete_rule: String,
    /// `ORDINAL_POSITION`.
    pub ordinal_position: u32,
}

/// Everything the catalog reports about one base table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRows {
    /// Status row.
    pub status: TableStatusRow,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnRow>,
    /// Index rows.
    pub indexes: Vec<IndexRow>,
    /// Partition rows.
    pub partitions: Vec<PartitionRow>,
    /// Foreign key rows.
    pub foreign_keys: Vec<ForeignKeyRow>,
    /// `SHOW CREATE TABLE` output.
    pub create_statement: String,
}

/// Everything the catalog reports about one view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRows {
    /// Schema the view lives in.
    pub database: String,
    /// View name.
    pub name: String,
    /// `VIEW_DEFINITION`.
    pub definition: String,
    /// `SECURITY_TYPE`.
    pub security_type: String,
    /// `SHOW CREATE VIEW` output.
    pub create_statement: String,
}

/// Reads the default charset out of a `SHOW CREATE TABLE` statement.
///
/// The catalog has no column for it, so the value after the
/// `DEFAULT CHARSET=` marker is taken up to the next whitespace.
#[must_use]
pub fn extract_default_charset(create_statement: &str) -> Option<String> {
    const MARKER: &str = "DEFAULT CHARSET=";
    let start = create_statement.find(MARKER)? + MARKER.len();
    let charset: String = create_statement[start..]
        .chars()
        .take_while(|c| !c.is_whitespace())
        .collect();
    (!charset.is_empty()).then_some(charset)
}

/// Removes `` `database`. `` qualifiers from a view definition.
#[must_use]
pub fn strip_schema_qualifier(definition: &str, database: &str) -> String {
    if database.is_empty() {
        return definition.to_string();
    }
    definition.replace(&format!("{}.", quote_identifier(database)), "")
}

fn column_from_row(row: &ColumnRow) -> ColumnStructure {
    let mut column = ColumnStructure::new(row.column_name.clone(), &row.column_type)
        .comment(row.column_comment.clone());
    let extra = row.extra.to_ascii_lowercase();
    if extra.contains("auto_increment") {
        column = column.attribute(Attribute::AutoIncrement);
    }
    if row.is_nullable.eq_ignore_ascii_case("YES") {
        column = column.attribute(Attribute::Nullable);
    }
    column.default.clone_from(&row.column_default);
    column.collation_name.clone_from(&row.collation_name);
    if let Some(expression) = row
        .generation_expression
        .as_deref()
        .filter(|e| !e.trim().is_empty())
    {
        column = column.generated(expression, extra.contains("stored"));
    }
    column
}

fn indexes_from_rows(rows: &[IndexRow]) -> Vec<IndexStructure> {
    let mut grouped: BTreeMap<&str, Vec<&IndexRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.key_name.as_str()).or_default().push(row);
    }
    grouped
        .into_iter()
        .map(|(name, mut rows)| {
            rows.sort_by_key(|r| r.seq_in_index);
            let columns = rows.iter().map(|r| IndexColumn {
                name: r.column_name.clone(),
                sub_part: r.sub_part,
            });
            IndexStructure::new(name, !rows[0].non_unique, rows[0].index_type.clone(), columns)
        })
        .collect()
}

fn foreign_keys_from_rows(table: &str, rows: &[ForeignKeyRow]) -> Result<Vec<ForeignKeyStructure>> {
    let mut grouped: BTreeMap<&str, Vec<&ForeignKeyRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.constraint_name.as_str()).or_default().push(row);
    }
    let action = |raw: &str| -> Result<ReferenceAction> {
        raw.parse().map_err(|message| SchemaError::Unsupported {
            table: table.to_string(),
            message,
        })
    };
    grouped
        .into_iter()
        .map(|(name, mut rows)| {
            rows.sort_by_key(|r| r.ordinal_position);
            let first = rows[0];
            Ok(ForeignKeyStructure::new(
                name,
                rows.iter().map(|r| r.column_name.clone()),
                first.referenced_table_name.clone(),
                rows.iter().map(|r| r.referenced_column_name.clone()),
            )
            .on_update(action(&first.update_rule)?)
            .on_delete(action(&first.delete_rule)?))
        })
        .collect()
}

/// Groups partition rows by method, then by expression, and converts the
/// last group. Sub-partitions repeat their parent's row, so parts are
/// deduplicated by name.
fn partition_from_rows(table: &str, rows: &[PartitionRow]) -> Result<Option<PartitionStructure>> {
    let mut groups: Vec<(&str, &str, Vec<&PartitionRow>)> = Vec::new();
    for row in rows {
        let Some(method) = row.partition_method.as_deref() else {
            continue;
        };
        let expression = row.partition_expression.as_deref().unwrap_or_default();
        match groups
            .iter_mut()
            .find(|(m, e, _)| *m == method && *e == expression)
        {
            Some((_, _, members)) => members.push(row),
            None => groups.push((method, expression, vec![row])),
        }
    }

    let Some((method, expression, mut members)) = groups.pop() else {
        return Ok(None);
    };
    let method: PartitionMethod = method.parse().map_err(|message| SchemaError::Unsupported {
        table: table.to_string(),
        message,
    })?;
    members.sort_by_key(|r| r.ordinal_position);
    members.dedup_by(|a, b| a.partition_name == b.partition_name);

    let partition = match (method.partition_type(), method.boundary_operator()) {
        (PartitionType::Long, Some(operator)) => PartitionStructure::long(
            method,
            expression,
            members
                .iter()
                .map(|row| {
                    PartitionPartStructure::new(
                        row.partition_name.clone().unwrap_or_default(),
                        operator,
                        row.partition_description.clone().unwrap_or_default(),
                        row.partition_comment.clone(),
                    )
                })
                .collect(),
        ),
        _ => PartitionStructure::short(
            method,
            expression,
            u32::try_from(members.len()).unwrap_or(u32::MAX),
        ),
    };
    Ok(Some(partition))
}

impl super::spec::TableStructureFactory {
    /// Builds a table from its catalog rows.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unsupported`] for partition methods or
    /// referential actions the model does not know.
    pub fn from_catalog(rows: &TableRows) -> Result<TableStructure> {
        let name = rows.status.name.as_str();
        let mut table = TableStructure::new(name).comment(rows.status.comment.clone());
        table.engine.clone_from(&rows.status.engine);
        table.collation.clone_from(&rows.status.collation);
        table.default_charset = extract_default_charset(&rows.create_statement);
        table.columns = rows.columns.iter().map(column_from_row).collect();
        for index in indexes_from_rows(&rows.indexes) {
            table = table.index(index);
        }
        for foreign_key in foreign_keys_from_rows(name, &rows.foreign_keys)? {
            table = table.foreign_key(foreign_key);
        }
        table.partition = partition_from_rows(name, &rows.partitions)?;
        Ok(table)
    }
}

impl super::spec::ViewStructureFactory {
    /// Builds a view from its catalog rows.
    ///
    /// The algorithm only appears in `SHOW CREATE VIEW`; it defaults to
    /// `UNDEFINED` when absent. MySQL qualifies every table in the stored
    /// definition with the view's own schema; that qualifier is removed so
    /// the same view compares equal across databases.
    #[must_use]
    pub fn from_catalog(rows: &ViewRows) -> TableStructure {
        let definition = strip_schema_qualifier(&rows.definition, &rows.database);
        let mut view = ViewDefinition::new(definition);
        if let Some(algorithm) = VIEW_ALGORITHM.captures(&rows.create_statement) {
            view.algorithm = algorithm[1].to_ascii_uppercase();
        }
        if !rows.security_type.is_empty() {
            view.security = rows.security_type.to_ascii_uppercase();
        }
        TableStructure::view(rows.name.clone(), view)
    }
}
