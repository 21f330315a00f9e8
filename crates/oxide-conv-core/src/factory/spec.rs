//! Spec documents.
//!
//! A spec file describes one table or view. YAML example:
//!
//! ```yaml
//! comment: Registered users
//! engine: InnoDB
//! default_charset: utf8mb4
//! column:
//!   id:
//!     type: int(10)
//!     attribute: [unsigned, auto_increment]
//!   email:
//!     type: varchar(255)
//!     collation: utf8mb4_bin
//!   team_id:
//!     type: int(10) unsigned
//!     attribute: [nullable]
//! primary_key: [id]
//! index:
//!   uq_email:
//!     column: [email]
//!     unique: true
//! foreign_key:
//!   fk_team:
//!     column: [team_id]
//!     reference_table: teams
//!     reference_column: [id]
//!     on_delete: SET NULL
//! ```
//!
//! Views set `table_type: VIEW` and carry `definition` (plus optional
//! `algorithm` and `security`).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::parser::SpecDocument;
use crate::error::{Result, SchemaError};
use crate::structure::{
    Attribute, ColumnStructure, ForeignKeyStructure, IndexColumn, IndexStructure, PartitionMethod,
    PartitionPartStructure, PartitionStructure, PartitionType, Properties, ReferenceAction,
    TableKind, TableStructure, ViewDefinition,
};

/// `table_type` of a base table.
pub const TABLE_TYPE_TABLE: &str = "TABLE";
/// `table_type` of a view.
pub const TABLE_TYPE_VIEW: &str = "VIEW";

/// Keys allowed at the top level of a spec document.
pub const TABLE_KEYS: &[&str] = &[
    "table_type",
    "comment",
    "engine",
    "default_charset",
    "collate",
    "column",
    "primary_key",
    "index",
    "foreign_key",
    "partition",
    "properties",
    "algorithm",
    "security",
    "definition",
];

/// Keys allowed in a column entry.
pub const COLUMN_KEYS: &[&str] = &[
    "type",
    "default",
    "comment",
    "attribute",
    "collation",
    "generated",
    "properties",
];

/// Keys allowed in an index entry.
pub const INDEX_KEYS: &[&str] = &["column", "unique", "type"];

/// Keys allowed in a foreign key entry.
pub const FOREIGN_KEY_KEYS: &[&str] = &[
    "column",
    "reference_table",
    "reference_column",
    "on_update",
    "on_delete",
];

/// Keys allowed in the partition entry.
pub const PARTITION_KEYS: &[&str] = &["method", "expression", "count", "part"];

/// Keys allowed in a partition part.
pub const PART_KEYS: &[&str] = &["name", "value", "comment"];

// ================================================================
// Validation
// ================================================================

fn check_keys(table: &str, prefix: &str, value: &Value, allowed: &[&str]) -> Result<()> {
    let Some(object) = value.as_object() else {
        return Ok(());
    };
    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(SchemaError::Validation {
                table: table.to_string(),
                key: format!("{prefix}{key}"),
            });
        }
    }
    Ok(())
}

fn check_entries(table: &str, section: &str, value: Option<&Value>, allowed: &[&str]) -> Result<()> {
    let Some(entries) = value.and_then(Value::as_object) else {
        return Ok(());
    };
    for (name, entry) in entries {
        check_keys(table, &format!("{section}.{name}."), entry, allowed)?;
    }
    Ok(())
}

/// Checks every key of a raw document against the spec vocabulary.
///
/// `properties` contents are opaque and never checked.
///
/// # Errors
///
/// Returns [`SchemaError::Validation`] naming the table and the first
/// unknown key as a dotted path (`column.id.colour`).
pub fn validate(table: &str, document: &SpecDocument) -> Result<()> {
    for key in document.keys() {
        if !TABLE_KEYS.contains(&key.as_str()) {
            return Err(SchemaError::Validation {
                table: table.to_string(),
                key: key.clone(),
            });
        }
    }
    check_entries(table, "column", document.get("column"), COLUMN_KEYS)?;
    check_entries(table, "index", document.get("index"), INDEX_KEYS)?;
    check_entries(table, "foreign_key", document.get("foreign_key"), FOREIGN_KEY_KEYS)?;
    if let Some(partition) = document.get("partition") {
        check_keys(table, "partition.", partition, PARTITION_KEYS)?;
        if let Some(parts) = partition.get("part").and_then(Value::as_array) {
            for (position, part) in parts.iter().enumerate() {
                check_keys(table, &format!("partition.part.{position}."), part, PART_KEYS)?;
            }
        }
    }
    Ok(())
}

// ================================================================
// Typed documents
// ================================================================

/// Renders a scalar the way it would appear in SQL.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

fn deserialize_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

fn default_table_type() -> String {
    TABLE_TYPE_TABLE.to_string()
}

fn default_index_type() -> String {
    "BTREE".to_string()
}

#[allow(clippy::ptr_arg)]
fn is_table_type(kind: &String) -> bool {
    kind.eq_ignore_ascii_case(TABLE_TYPE_TABLE)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// One column entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// SQL type; may carry an `unsigned` suffix.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Default value; any scalar is accepted.
    #[serde(
        default,
        deserialize_with = "deserialize_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    /// Column comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Column flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute: Vec<Attribute>,
    /// Explicit collation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Generation expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
    /// Opaque metadata.
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// One index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Key columns, `name` or `name(length)`.
    pub column: Vec<String>,
    /// Uniqueness.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    /// Index type.
    #[serde(rename = "type", default = "default_index_type")]
    pub index_type: String,
}

/// One foreign key entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeySpec {
    /// Referencing columns.
    pub column: Vec<String>,
    /// Referenced table.
    pub reference_table: String,
    /// Referenced columns.
    pub reference_column: Vec<String>,
    /// `ON UPDATE` action; `RESTRICT` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    /// `ON DELETE` action; `RESTRICT` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

/// One named partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSpec {
    /// Partition name.
    pub name: String,
    /// Boundary (`2021`, `MAXVALUE`, `[1, 2, 3]`).
    #[serde(
        default,
        deserialize_with = "deserialize_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    /// Partition comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// The partition entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSpec {
    /// Partition method (`HASH`, `RANGE COLUMNS`, …).
    pub method: String,
    /// Partitioning expression.
    pub expression: String,
    /// Partition count of `HASH`/`KEY` methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Parts of `RANGE`/`LIST` methods.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub part: Vec<PartSpec>,
}

/// A whole spec document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// `TABLE` or `VIEW`.
    #[serde(default = "default_table_type", skip_serializing_if = "is_table_type")]
    pub table_type: String,
    /// Table comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Storage engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Default character set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_charset: Option<String>,
    /// Default collation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collate: Option<String>,
    /// Columns in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub column: IndexMap<String, ColumnSpec>,
    /// Primary key columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    /// Secondary indexes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub index: IndexMap<String, IndexSpec>,
    /// Foreign keys.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub foreign_key: IndexMap<String, ForeignKeySpec>,
    /// Partitioning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionSpec>,
    /// Opaque metadata.
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    /// View algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// View security.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    /// View query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl TableSpec {
    /// Validates a raw document and converts it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Validation`] on unknown keys and
    /// [`SchemaError::InvalidSpec`] when a known key has an unusable value.
    pub fn from_document(table: &str, document: SpecDocument) -> Result<Self> {
        validate(table, &document)?;
        serde_json::from_value(Value::Object(document)).map_err(|e| SchemaError::InvalidSpec {
            table: table.to_string(),
            message: e.to_string(),
        })
    }

    /// Returns whether the document declares a view.
    #[must_use]
    pub fn is_view(&self) -> bool {
        self.table_type.eq_ignore_ascii_case(TABLE_TYPE_VIEW)
    }
}

impl From<&ColumnStructure> for ColumnSpec {
    fn from(column: &ColumnStructure) -> Self {
        Self {
            column_type: column.column_type.clone(),
            default: column.default.clone(),
            comment: column.comment.clone(),
            attribute: column.attributes.iter().copied().collect(),
            collation: column.collation_name.clone(),
            generated: column.generation_expression.clone(),
            properties: column.properties.clone(),
        }
    }
}

impl From<&PartitionStructure> for PartitionSpec {
    fn from(partition: &PartitionStructure) -> Self {
        match partition {
            PartitionStructure::Short(short) => Self {
                method: short.method.to_string(),
                expression: short.expression.clone(),
                count: Some(short.count),
                part: Vec::new(),
            },
            PartitionStructure::Long(long) => Self {
                method: long.method.to_string(),
                expression: long.expression.clone(),
                count: None,
                part: long
                    .parts
                    .iter()
                    .map(|part| PartSpec {
                        name: part.name.clone(),
                        value: Some(part.description.clone()),
                        comment: part.comment.clone(),
                    })
                    .collect(),
            },
        }
    }
}

fn action_spec(action: ReferenceAction) -> Option<String> {
    (action != ReferenceAction::default()).then(|| action.to_string())
}

impl From<&TableStructure> for TableSpec {
    fn from(table: &TableStructure) -> Self {
        let view = table.view_definition();
        let primary_key = table
            .indexes
            .values()
            .find(|i| i.is_primary())
            .map(|i| i.columns.iter().map(ToString::to_string).collect())
            .unwrap_or_default();
        Self {
            table_type: if view.is_some() { TABLE_TYPE_VIEW } else { TABLE_TYPE_TABLE }.to_string(),
            comment: table.comment.clone(),
            engine: table.engine.clone(),
            default_charset: table.default_charset.clone(),
            collate: table.collation.clone(),
            column: table
                .columns
                .iter()
                .map(|c| (c.field.clone(), ColumnSpec::from(c)))
                .collect(),
            primary_key,
            index: table
                .indexes
                .values()
                .filter(|i| !i.is_primary())
                .map(|i| {
                    let spec = IndexSpec {
                        column: i.columns.iter().map(ToString::to_string).collect(),
                        unique: i.is_unique,
                        index_type: i.index_type.clone(),
                    };
                    (i.name.clone(), spec)
                })
                .collect(),
            foreign_key: table
                .foreign_keys
                .values()
                .map(|fk| {
                    let spec = ForeignKeySpec {
                        column: fk.columns.clone(),
                        reference_table: fk.referenced_table.clone(),
                        reference_column: fk.referenced_columns.clone(),
                        on_update: action_spec(fk.on_update),
                        on_delete: action_spec(fk.on_delete),
                    };
                    (fk.name.clone(), spec)
                })
                .collect(),
            partition: table.partition.as_ref().map(PartitionSpec::from),
            properties: table.properties.clone(),
            algorithm: view.map(|v| v.algorithm.clone()),
            security: view.map(|v| v.security.clone()),
            definition: view.map(|v| v.definition.clone()),
        }
    }
}

impl TableStructure {
    /// Serializes the structure back to its spec document.
    #[must_use]
    pub fn to_spec(&self) -> TableSpec {
        TableSpec::from(self)
    }
}

// ================================================================
// Factories
// ================================================================

fn invalid(table: &str, message: impl Into<String>) -> SchemaError {
    SchemaError::InvalidSpec {
        table: table.to_string(),
        message: message.into(),
    }
}

fn parse_action(table: &str, raw: Option<&str>) -> Result<ReferenceAction> {
    raw.map_or(Ok(ReferenceAction::default()), |raw| {
        raw.parse().map_err(|e: String| invalid(table, e))
    })
}

fn partition_from_spec(table: &str, spec: &PartitionSpec) -> Result<PartitionStructure> {
    let method: PartitionMethod = spec.method.parse().map_err(|e: String| invalid(table, e))?;
    match (method.partition_type(), method.boundary_operator()) {
        (PartitionType::Short, _) => {
            let count = spec
                .count
                .ok_or_else(|| invalid(table, format!("partition method {method} needs a count")))?;
            Ok(PartitionStructure::short(method, spec.expression.clone(), count))
        }
        (PartitionType::Long, Some(operator)) => {
            if spec.part.is_empty() {
                return Err(invalid(table, format!("partition method {method} needs parts")));
            }
            let parts = spec
                .part
                .iter()
                .map(|part| {
                    let value = part.value.clone().ok_or_else(|| {
                        invalid(table, format!("partition part '{}' has no value", part.name))
                    })?;
                    Ok(PartitionPartStructure::new(
                        part.name.clone(),
                        operator,
                        value,
                        part.comment.clone(),
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(PartitionStructure::long(method, spec.expression.clone(), parts))
        }
        (PartitionType::Long, None) => Err(invalid(
            table,
            format!("partition method {method} has no boundary operator"),
        )),
    }
}

fn check_declared(table: &TableStructure, columns: &[String], what: &str) -> Result<()> {
    for column in columns {
        let bare = IndexColumn::parse(column).name;
        if table.get_column(&bare).is_none() {
            return Err(invalid(
                &table.name,
                format!("{what} uses unknown column '{bare}'"),
            ));
        }
    }
    Ok(())
}

/// Builds base tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableStructureFactory;

impl TableStructureFactory {
    /// Builds a table from its spec document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidSpec`] when an index or key names an
    /// undeclared column, or when an action or partition method is unknown.
    pub fn from_spec(name: &str, spec: &TableSpec) -> Result<TableStructure> {
        let mut table = TableStructure::new(name)
            .comment(spec.comment.clone())
            .properties(spec.properties.clone());
        table.engine.clone_from(&spec.engine);
        table.default_charset.clone_from(&spec.default_charset);
        table.collation.clone_from(&spec.collate);

        for (field, column_spec) in &spec.column {
            let mut column = ColumnStructure::new(field.clone(), &column_spec.column_type)
                .comment(column_spec.comment.clone())
                .properties(column_spec.properties.clone());
            column.attributes.extend(column_spec.attribute.iter().copied());
            column.default.clone_from(&column_spec.default);
            column.collation_name.clone_from(&column_spec.collation);
            column.generation_expression.clone_from(&column_spec.generated);
            table = table.column(column);
        }

        if !spec.primary_key.is_empty() {
            check_declared(&table, &spec.primary_key, "primary key")?;
        }
        for (index_name, index) in &spec.index {
            check_declared(&table, &index.column, &format!("index '{index_name}'"))?;
        }
        for (fk_name, fk) in &spec.foreign_key {
            check_declared(&table, &fk.column, &format!("foreign key '{fk_name}'"))?;
        }

        if !spec.primary_key.is_empty() {
            table = table.index(IndexStructure::primary(spec.primary_key.iter().map(String::as_str)));
        }
        for (index_name, index) in &spec.index {
            table = table.index(IndexStructure::new(
                index_name.clone(),
                index.unique,
                index.index_type.clone(),
                index.column.iter().map(String::as_str),
            ));
        }
        for (fk_name, fk) in &spec.foreign_key {
            let foreign_key = ForeignKeyStructure::new(
                fk_name.clone(),
                fk.column.iter().cloned(),
                fk.reference_table.clone(),
                fk.reference_column.iter().cloned(),
            )
            .on_update(parse_action(name, fk.on_update.as_deref())?)
            .on_delete(parse_action(name, fk.on_delete.as_deref())?);
            table = table.foreign_key(foreign_key);
        }
        if let Some(partition) = &spec.partition {
            table = table.partition(partition_from_spec(name, partition)?);
        }
        Ok(table)
    }
}

/// Builds views.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewStructureFactory;

impl ViewStructureFactory {
    /// Builds a view from its spec document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidSpec`] when `definition` is missing.
    pub fn from_spec(name: &str, spec: &TableSpec) -> Result<TableStructure> {
        let definition = spec
            .definition
            .clone()
            .ok_or_else(|| invalid(name, "a view needs a definition"))?;
        let mut view = ViewDefinition::new(definition);
        if let Some(algorithm) = &spec.algorithm {
            view.algorithm = algorithm.to_ascii_uppercase();
        }
        if let Some(security) = &spec.security {
            view.security = security.to_ascii_uppercase();
        }
        Ok(TableStructure {
            kind: TableKind::View(view),
            comment: spec.comment.clone(),
            properties: spec.properties.clone(),
            ..TableStructure::new(name)
        })
    }
}

/// Validates a raw document and builds the table or view it declares.
///
/// # Errors
///
/// Returns [`SchemaError::Validation`] on unknown keys,
/// [`SchemaError::UnknownTableType`] when `table_type` is neither `TABLE`
/// nor `VIEW`, and the errors of the matching factory.
pub fn structure_from_document(name: &str, document: SpecDocument) -> Result<TableStructure> {
    let spec = TableSpec::from_document(name, document)?;
    if spec.is_view() {
        ViewStructureFactory::from_spec(name, &spec)
    } else if is_table_type(&spec.table_type) {
        TableStructureFactory::from_spec(name, &spec)
    } else {
        Err(SchemaError::UnknownTableType {
            table: name.to_string(),
            kind: spec.table_type,
        })
    }
}
