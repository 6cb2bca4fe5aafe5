//! The table aggregate.
//!
//! A [`Table`] composes columns, partitioning, sort order, distribution,
//! comment, properties and an audit record into one immutable value. Every
//! way of obtaining a `Table` ([`TableBuilder::build`], [`Table::alter`],
//! [`Table::from_catalog`] and deserialization) runs the same validation, so
//! a `Table` that exists is always well-formed and every optional part holds
//! its documented default when unset.
//!
//! Validation order (first failure wins):
//!
//! 1. table name is non-empty;
//! 2. the column list is non-empty, every column name is non-empty and
//!    unique, and every column type is well-formed;
//! 3. every partition transform has valid arguments and resolves its source
//!    columns;
//! 4. the distribution has valid arguments and resolves its columns;
//! 5. every sort entry resolves the columns its expression references;
//! 6. the audit record is consistent.
pub mod builder;
pub mod change;
pub mod error;

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

pub use builder::TableBuilder;
pub use change::{ColumnPosition, TableChange};
pub use error::{TableError, TableResult};

use crate::{
    audit::AuditInfo,
    catalog::CatalogTable,
    column::Column,
    distribution::Distribution,
    properties::Properties,
    sort_order::SortEntry,
    transform::Transform,
};
use error::{InvalidSchemaSnafu, UnresolvedColumnSnafu};

/// An immutable snapshot of a table's structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "TableRecord")]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    partitioning: Vec<Transform>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sort_order: Vec<SortEntry>,
    #[serde(skip_serializing_if = "Distribution::is_none")]
    distribution: Distribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Properties::is_empty")]
    properties: Properties,
    audit: AuditInfo,
}

/// Serialized shape of a [`Table`]; optional parts may be omitted.
#[derive(Deserialize)]
struct TableRecord {
    name: String,
    columns: Vec<Column>,
    #[serde(default)]
    partitioning: Vec<Transform>,
    #[serde(default)]
    sort_order: Vec<SortEntry>,
    #[serde(default)]
    distribution: Distribution,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    properties: Properties,
    audit: AuditInfo,
}

impl TryFrom<TableRecord> for Table {
    type Error = TableError;

    fn try_from(record: TableRecord) -> Result<Self, Self::Error> {
        let table = Table {
            name: record.name,
            columns: record.columns,
            partitioning: record.partitioning,
            sort_order: record.sort_order,
            distribution: record.distribution,
            comment: record.comment,
            properties: record.properties,
            audit: record.audit,
        };
        table.validate()?;
        Ok(table)
    }
}

impl Table {
    /// Start building a table named `name` with `columns`.
    pub fn builder(name: impl Into<String>, columns: Vec<Column>) -> TableBuilder {
        TableBuilder::new(name, columns)
    }

    /// Snapshot any backend's table representation into a validated `Table`.
    ///
    /// Parts the backend does not override come through as their defaults.
    ///
    /// # Errors
    /// Returns the first [`TableError`] the backend's data violates.
    pub fn from_catalog(source: &dyn CatalogTable) -> TableResult<Self> {
        let table = Table {
            name: source.name().to_string(),
            columns: source.columns().to_vec(),
            partitioning: source.partitioning().to_vec(),
            sort_order: source.sort_order().to_vec(),
            distribution: source.distribution().clone(),
            comment: source.comment().map(str::to_string),
            properties: source.properties().clone(),
            audit: source.audit().clone(),
        };
        table.validate()?;
        debug!("Loaded table '{}' from catalog backend", table.name);
        Ok(table)
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order; never empty.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column named `name`, if declared.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Partition transforms, outermost first; empty when unpartitioned.
    pub fn partitioning(&self) -> &[Transform] {
        &self.partitioning
    }

    /// Sort order; empty when unspecified.
    pub fn sort_order(&self) -> &[SortEntry] {
        &self.sort_order
    }

    /// Distribution; [`Distribution::NONE`] when unspecified.
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Table comment, if any.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Table properties; empty when none were set.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Audit record.
    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    /// Returns true if `other` matches this table on every accessor except
    /// the audit record.
    pub fn same_structure(&self, other: &Table) -> bool {
        self.name == other.name
            && self.columns == other.columns
            && self.partitioning == other.partitioning
            && self.sort_order == other.sort_order
            && self.distribution == other.distribution
            && self.comment == other.comment
            && self.properties == other.properties
    }

    pub(crate) fn validate(&self) -> TableResult<()> {
        ensure!(
            !self.name.trim().is_empty(),
            InvalidSchemaSnafu {
                reason: "table name must be non-empty",
            }
        );
        ensure!(
            !self.columns.is_empty(),
            InvalidSchemaSnafu {
                reason: format!("table '{}' must have at least one column", self.name),
            }
        );

        let mut declared: HashSet<&str> = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            ensure!(
                !column.name().trim().is_empty(),
                InvalidSchemaSnafu {
                    reason: "column name must be non-empty",
                }
            );
            ensure!(
                declared.insert(column.name()),
                InvalidSchemaSnafu {
                    reason: format!("duplicate column name '{}'", column.name()),
                }
            );
        }
        for column in &self.columns {
            column.validate()?;
        }

        for (i, transform) in self.partitioning.iter().enumerate() {
            transform.validate_args()?;
            for source in transform.source_columns() {
                ensure!(
                    declared.contains(source),
                    UnresolvedColumnSnafu {
                        column: source,
                        referenced_by: format!("partitioning[{i}] ({})", transform.name()),
                    }
                );
            }
        }

        self.distribution.validate_args()?;
        for column in self.distribution.columns() {
            ensure!(
                declared.contains(column.as_str()),
                UnresolvedColumnSnafu {
                    column: column.as_str(),
                    referenced_by: "distribution",
                }
            );
        }

        for (i, entry) in self.sort_order.iter().enumerate() {
            for column in entry.expression().referenced_columns() {
                ensure!(
                    declared.contains(column),
                    UnresolvedColumnSnafu {
                        column,
                        referenced_by: format!("sort_order[{i}]"),
                    }
                );
            }
        }

        self.audit.validate()
    }
}

impl CatalogTable for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn partitioning(&self) -> &[Transform] {
        &self.partitioning
    }

    fn sort_order(&self) -> &[SortEntry] {
        &self.sort_order
    }

    fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}
