//! Builder for [`Table`] values.
use log::debug;

use crate::{
    audit::AuditInfo,
    column::Column,
    distribution::Distribution,
    properties::Properties,
    sort_order::SortEntry,
    table::{Table, TableResult},
    transform::Transform,
};

/// Collects a table definition and validates it in [`TableBuilder::build`].
///
/// Every setter is optional; parts left unset take their defaults (no
/// partitioning, no sort order, [`Distribution::NONE`], no comment, no
/// properties, and an [`AuditInfo::anonymous`] record stamped at build time).
#[derive(Debug, Clone)]
#[must_use]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    partitioning: Vec<Transform>,
    sort_order: Vec<SortEntry>,
    distribution: Distribution,
    comment: Option<String>,
    properties: Properties,
    audit: Option<AuditInfo>,
}

impl TableBuilder {
    /// Builder for a table named `name` with `columns`.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            partitioning: Vec::new(),
            sort_order: Vec::new(),
            distribution: Distribution::NONE,
            comment: None,
            properties: Properties::new(),
            audit: None,
        }
    }

    /// Partition transforms, outermost first.
    pub fn partitioning(mut self, partitioning: Vec<Transform>) -> Self {
        self.partitioning = partitioning;
        self
    }

    /// Sort order.
    pub fn sort_order(mut self, sort_order: Vec<SortEntry>) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Distribution.
    pub fn distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Table comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Replace all properties.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Set a single property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Audit record.
    pub fn audit(mut self, audit: AuditInfo) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Validate the definition and produce the table.
    ///
    /// # Errors
    /// Returns the first [`crate::TableError`] the definition violates; see
    /// the [`crate::table`] module docs for the validation order.
    pub fn build(self) -> TableResult<Table> {
        let table = Table {
            name: self.name,
            columns: self.columns,
            partitioning: self.partitioning,
            sort_order: self.sort_order,
            distribution: self.distribution,
            comment: self.comment,
            properties: self.properties,
            audit: self.audit.unwrap_or_else(AuditInfo::anonymous),
        };
        table.validate()?;

        debug!(
            "Built table '{}' ({} columns, {} partition transforms, distribution {})",
            table.name,
            table.columns.len(),
            table.partitioning.len(),
            table.distribution
        );
        Ok(table)
    }
}
