//! Partitioning schemes.
//!
//! Counted methods (`HASH`, `KEY`) only need a partition count because
//! MySQL names the partitions itself. Range and list methods carry one
//! named part per boundary.

use std::fmt;
use std::str::FromStr;

use super::{quote_identifier, quote_literal};

/// Shape of a partitioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionType {
    /// Counted partitions.
    Short,
    /// Named partitions with boundaries.
    Long,
}

/// Partitioning method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionMethod {
    /// `RANGE`
    Range,
    /// `RANGE COLUMNS`
    RangeColumns,
    /// `LIST`
    List,
    /// `LIST COLUMNS`
    ListColumns,
    /// `HASH`
    Hash,
    /// `LINEAR HASH`
    LinearHash,
    /// `KEY`
    Key,
    /// `LINEAR KEY`
    LinearKey,
}

impl PartitionMethod {
    /// Returns the SQL keyword(s) for this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Range => "RANGE",
            Self::RangeColumns => "RANGE COLUMNS",
            Self::List => "LIST",
            Self::ListColumns => "LIST COLUMNS",
            Self::Hash => "HASH",
            Self::LinearHash => "LINEAR HASH",
            Self::Key => "KEY",
            Self::LinearKey => "LINEAR KEY",
        }
    }

    /// Returns whether partitions are counted or individually named.
    #[must_use]
    pub const fn partition_type(self) -> PartitionType {
        match self {
            Self::Range | Self::RangeColumns | Self::List | Self::ListColumns => {
                PartitionType::Long
            }
            Self::Hash | Self::LinearHash | Self::Key | Self::LinearKey => PartitionType::Short,
        }
    }

    /// Returns the boundary operator of long-form methods.
    #[must_use]
    pub const fn boundary_operator(self) -> Option<BoundaryOperator> {
        match self {
            Self::Range | Self::RangeColumns => Some(BoundaryOperator::LessThan),
            Self::List | Self::ListColumns => Some(BoundaryOperator::In),
            _ => None,
        }
    }
}

impl fmt::Display for PartitionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "RANGE" => Ok(Self::Range),
            "RANGE COLUMNS" => Ok(Self::RangeColumns),
            "LIST" => Ok(Self::List),
            "LIST COLUMNS" => Ok(Self::ListColumns),
            "HASH" => Ok(Self::Hash),
            "LINEAR HASH" => Ok(Self::LinearHash),
            "KEY" => Ok(Self::Key),
            "LINEAR KEY" => Ok(Self::LinearKey),
            _ => Err(format!("unsupported partition method '{s}'")),
        }
    }
}

/// Boundary operator of a named partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryOperator {
    /// `VALUES LESS THAN`
    LessThan,
    /// `VALUES IN`
    In,
}

impl BoundaryOperator {
    /// Returns the SQL keywords.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "VALUES LESS THAN",
            Self::In => "VALUES IN",
        }
    }
}

/// One named partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionPartStructure {
    /// Partition name.
    pub name: String,
    /// Derived from the method.
    pub operator: BoundaryOperator,
    /// Boundary values (`10`, `MAXVALUE`, `1,2,3`).
    pub description: String,
    /// Partition comment.
    pub comment: String,
}

impl PartitionPartStructure {
    /// Creates a part.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        operator: BoundaryOperator,
        description: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            operator,
            description: description.into(),
            comment: comment.into(),
        }
    }

    /// Renders the part definition under `method`.
    ///
    /// Plain `RANGE` takes a bare `MAXVALUE`; `RANGE COLUMNS` only accepts
    /// it inside the value list.
    #[must_use]
    pub fn query(&self, method: PartitionMethod) -> String {
        let bare_maxvalue =
            method == PartitionMethod::Range && self.description.eq_ignore_ascii_case("MAXVALUE");
        let values = if bare_maxvalue {
            "MAXVALUE".to_string()
        } else {
            format!("({})", self.description)
        };
        let mut sql = format!(
            "PARTITION {} {} {values}",
            quote_identifier(&self.name),
            self.operator.as_str()
        );
        if !self.comment.is_empty() {
            sql.push_str(&format!(" COMMENT = {}", quote_literal(&self.comment)));
        }
        sql
    }
}

/// Counted partitioning (`HASH`, `KEY`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionShortStructure {
    /// Method.
    pub method: PartitionMethod,
    /// Partitioning expression or column list.
    pub expression: String,
    /// Number of partitions.
    pub count: u32,
}

/// Named partitioning (`RANGE`, `LIST`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionLongStructure {
    /// Method.
    pub method: PartitionMethod,
    /// Partitioning expression or column list.
    pub expression: String,
    /// Parts in ordinal order.
    pub parts: Vec<PartitionPartStructure>,
}

/// Partitioning of one table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartitionStructure {
    /// Counted form.
    Short(PartitionShortStructure),
    /// Named form.
    Long(PartitionLongStructure),
}

impl PartitionStructure {
    /// Creates a counted scheme.
    #[must_use]
    pub fn short(method: PartitionMethod, expression: impl Into<String>, count: u32) -> Self {
        Self::Short(PartitionShortStructure {
            method,
            expression: expression.into(),
            count,
        })
    }

    /// Creates a named scheme.
    #[must_use]
    pub fn long(
        method: PartitionMethod,
        expression: impl Into<String>,
        parts: Vec<PartitionPartStructure>,
    ) -> Self {
        Self::Long(PartitionLongStructure {
            method,
            expression: expression.into(),
            parts,
        })
    }

    /// Returns the method.
    #[must_use]
    pub const fn method(&self) -> PartitionMethod {
        match self {
            Self::Short(short) => short.method,
            Self::Long(long) => long.method,
        }
    }

    /// Returns the partitioning expression.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Short(short) => &short.expression,
            Self::Long(long) => &long.expression,
        }
    }

    /// Renders the `PARTITION BY` clause.
    #[must_use]
    pub fn query(&self) -> String {
        match self {
            Self::Short(short) => format!(
                "PARTITION BY {} ({}) PARTITIONS {}",
                short.method, short.expression, short.count
            ),
            Self::Long(long) => {
                let parts = long
                    .parts
                    .iter()
                    .map(|part| part.query(long.method))
                    .collect::<Vec<_>>()
                    .join(",\n ");
                format!(
                    "PARTITION BY {} ({})\n({parts})",
                    long.method, long.expression
                )
            }
        }
    }
}
