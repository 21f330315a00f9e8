//! Migration lines: one diff outcome for one entity kind.
//!
//! A line is no-op, add, drop, or a composite that pairs an optional drop
//! with an optional add. Composites render their drop fragments before
//! their add fragments so an old definition is gone before a new one with
//! the same name appears.

use std::collections::BTreeMap;

use crate::structure::{
    ColumnStructure, ForeignKeyStructure, IndexStructure, PartitionStructure, quote_identifier,
};

/// Something an add or drop line can carry.
pub trait LinePayload {
    /// Fragments that introduce the payload (`ADD …`).
    fn add_fragments(&self) -> Vec<String>;

    /// Fragments that remove the payload (`DROP …`).
    fn drop_fragments(&self) -> Vec<String>;

    /// Returns true when rendering would produce nothing.
    fn is_empty(&self) -> bool {
        false
    }
}

/// Outcome of diffing one entity kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationLine<P> {
    /// Nothing changed.
    Noop,
    /// Payload to add.
    Add(P),
    /// Payload to drop.
    Drop(P),
    /// Optional drop followed by optional add.
    All {
        /// Removed or replaced definitions.
        drop: Option<P>,
        /// New or replacing definitions.
        add: Option<P>,
    },
}

impl<P: LinePayload> MigrationLine<P> {
    /// Creates a composite line.
    #[must_use]
    pub const fn all(drop: Option<P>, add: Option<P>) -> Self {
        Self::All { drop, add }
    }

    /// Returns true when the line renders nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Noop => true,
            Self::Add(payload) | Self::Drop(payload) => payload.is_empty(),
            Self::All { drop, add } => {
                drop.as_ref().is_none_or(LinePayload::is_empty)
                    && add.as_ref().is_none_or(LinePayload::is_empty)
            }
        }
    }

    /// Returns the drop payload.
    #[must_use]
    pub const fn drop_component(&self) -> Option<&P> {
        match self {
            Self::Drop(payload) | Self::All { drop: Some(payload), .. } => Some(payload),
            _ => None,
        }
    }

    /// Returns the add payload.
    #[must_use]
    pub const fn add_component(&self) -> Option<&P> {
        match self {
            Self::Add(payload) | Self::All { add: Some(payload), .. } => Some(payload),
            _ => None,
        }
    }

    /// Renders the drop component.
    #[must_use]
    pub fn drop_fragments(&self) -> Vec<String> {
        self.drop_component()
            .map(LinePayload::drop_fragments)
            .unwrap_or_default()
    }

    /// Renders the add component.
    #[must_use]
    pub fn add_fragments(&self) -> Vec<String> {
        self.add_component()
            .map(LinePayload::add_fragments)
            .unwrap_or_default()
    }

    /// Renders every fragment, drops first.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut fragments = self.drop_fragments();
        fragments.extend(self.add_fragments());
        fragments
    }
}

// ================================================================
// Index payload
// ================================================================

/// A subset of a table's indexes, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSet(pub BTreeMap<String, IndexStructure>);

impl IndexSet {
    /// Indexes in rendering order: primary key first, then by name.
    fn ordered(&self) -> impl Iterator<Item = &IndexStructure> {
        let primary = self.0.values().filter(|i| i.is_primary());
        primary.chain(self.0.values().filter(|i| !i.is_primary()))
    }
}

impl From<BTreeMap<String, IndexStructure>> for IndexSet {
    fn from(indexes: BTreeMap<String, IndexStructure>) -> Self {
        Self(indexes)
    }
}

impl FromIterator<IndexStructure> for IndexSet {
    fn from_iter<I: IntoIterator<Item = IndexStructure>>(iter: I) -> Self {
        Self(iter.into_iter().map(|i| (i.name.clone(), i)).collect())
    }
}

impl LinePayload for IndexSet {
    fn add_fragments(&self) -> Vec<String> {
        self.ordered().map(IndexStructure::add_query).collect()
    }

    fn drop_fragments(&self) -> Vec<String> {
        self.ordered().map(IndexStructure::drop_query).collect()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Index diff outcome.
pub type IndexMigrationLine = MigrationLine<IndexSet>;

// ================================================================
// Foreign key payload
// ================================================================

/// A subset of a table's foreign keys, keyed by constraint name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKeySet(pub BTreeMap<String, ForeignKeyStructure>);

impl FromIterator<ForeignKeyStructure> for ForeignKeySet {
    fn from_iter<I: IntoIterator<Item = ForeignKeyStructure>>(iter: I) -> Self {
        Self(iter.into_iter().map(|fk| (fk.name.clone(), fk)).collect())
    }
}

impl LinePayload for ForeignKeySet {
    fn add_fragments(&self) -> Vec<String> {
        self.0.values().map(ForeignKeyStructure::add_query).collect()
    }

    fn drop_fragments(&self) -> Vec<String> {
        self.0.values().map(ForeignKeyStructure::drop_query).collect()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Foreign key diff outcome.
pub type ForeignKeyMigrationLine = MigrationLine<ForeignKeySet>;

// ================================================================
// Column payload
// ================================================================

/// Where an added column goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPosition {
    /// Before every other column.
    First,
    /// Right after the named column.
    After(String),
}

impl ColumnPosition {
    fn sql(&self) -> String {
        match self {
            Self::First => "FIRST".to_string(),
            Self::After(column) => format!("AFTER {}", quote_identifier(column)),
        }
    }
}

/// One column-level change.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    /// Column only in the new schema.
    Added {
        /// The new column.
        column: ColumnStructure,
        /// Placement in the new column order.
        position: ColumnPosition,
    },
    /// Column in both schemas with different attributes; holds the new one.
    Modified(ColumnStructure),
    /// Column only in the old schema.
    Dropped(ColumnStructure),
}

/// Column changes of one table, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet(pub Vec<ColumnChange>);

impl LinePayload for ColumnSet {
    fn add_fragments(&self) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|change| match change {
                ColumnChange::Added { column, position } => Some(format!(
                    "ADD COLUMN {} {}",
                    column.create_query(),
                    position.sql()
                )),
                ColumnChange::Modified(column) => {
                    Some(format!("MODIFY COLUMN {}", column.create_query()))
                }
                ColumnChange::Dropped(_) => None,
            })
            .collect()
    }

    fn drop_fragments(&self) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|change| match change {
                ColumnChange::Dropped(column) => Some(column.drop_query()),
                _ => None,
            })
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Column diff outcome.
pub type ColumnMigrationLine = MigrationLine<ColumnSet>;

// ================================================================
// Partition payload
// ================================================================

impl LinePayload for PartitionStructure {
    fn add_fragments(&self) -> Vec<String> {
        vec![self.query()]
    }

    fn drop_fragments(&self) -> Vec<String> {
        vec!["REMOVE PARTITIONING".to_string()]
    }
}

/// Partition diff outcome.
pub type PartitionMigrationLine = MigrationLine<PartitionStructure>;
