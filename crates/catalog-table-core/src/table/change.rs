//! Table alterations.
//!
//! Alteration never touches an existing [`Table`]: [`Table::alter`] applies a
//! list of [`TableChange`]s to a copy, re-runs full validation and stamps a
//! modified audit record. The original snapshot stays valid.
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::{
    column::Column,
    expression::Expression,
    table::{
        Table, TableResult,
        error::{InvalidSchemaSnafu, UnresolvedColumnSnafu},
    },
    types::DataType,
};

/// Where to place a column when adding or moving it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColumnPosition {
    /// Before all other columns.
    First,
    /// Immediately after the named column.
    After(String),
    /// After all other columns.
    #[default]
    Last,
}

/// A single structural change to a table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TableChange {
    /// Rename the table.
    Rename {
        /// New table name.
        new_name: String,
    },
    /// Set or clear the table comment.
    UpdateComment {
        /// New comment; `None` clears it.
        comment: Option<String>,
    },
    /// Set a property, replacing any previous value.
    SetProperty {
        /// Property key.
        key: String,
        /// Property value.
        value: String,
    },
    /// Remove a property. Removing an absent key is a no-op.
    RemoveProperty {
        /// Property key.
        key: String,
    },
    /// Add a column.
    AddColumn {
        /// The new column.
        column: Column,
        /// Where to place it.
        #[serde(default)]
        position: ColumnPosition,
    },
    /// Rename a column. References in partitioning, distribution and sort
    /// order follow the rename.
    RenameColumn {
        /// Current column name.
        name: String,
        /// New column name.
        new_name: String,
    },
    /// Change a column's data type.
    UpdateColumnType {
        /// Column name.
        name: String,
        /// New data type.
        data_type: DataType,
    },
    /// Set or clear a column comment.
    UpdateColumnComment {
        /// Column name.
        name: String,
        /// New comment; `None` clears it.
        comment: Option<String>,
    },
    /// Change a column's nullability.
    UpdateColumnNullability {
        /// Column name.
        name: String,
        /// New nullability.
        nullable: bool,
    },
    /// Set or clear a column default value.
    UpdateColumnDefault {
        /// Column name.
        name: String,
        /// New default; `None` clears it.
        default_value: Option<Expression>,
    },
    /// Move a column.
    UpdateColumnPosition {
        /// Column name.
        name: String,
        /// New position.
        position: ColumnPosition,
    },
    /// Delete a column.
    DeleteColumn {
        /// Column name.
        name: String,
        /// When true, deleting an absent column is a no-op.
        #[serde(default)]
        if_exists: bool,
    },
}

impl Table {
    /// Apply `changes` in order and return the resulting table, with its audit
    /// record marked as modified by `modifier` at `at`.
    ///
    /// # Errors
    /// Returns [`crate::TableError::UnresolvedColumn`] when a change names a
    /// column that does not exist, and otherwise the first validation failure
    /// of the resulting table (for example, deleting a column that a partition
    /// transform still references).
    pub fn alter(
        &self,
        changes: &[TableChange],
        modifier: &str,
        at: DateTime<Utc>,
    ) -> TableResult<Table> {
        let mut next = self.clone();
        for change in changes {
            next.apply(change)?;
        }
        next.validate()?;
        next.audit = self.audit.modified(modifier, at);

        if next.same_structure(self) {
            warn!(
                "Alteration of table '{}' by '{}' changed nothing structurally",
                self.name, modifier
            );
        }
        debug!(
            "Altered table '{}' -> '{}' with {} change(s)",
            self.name,
            next.name,
            changes.len()
        );
        Ok(next)
    }

    /// [`Table::alter`] stamped with the current time.
    ///
    /// # Errors
    /// See [`Table::alter`].
    pub fn alter_now(&self, changes: &[TableChange], modifier: &str) -> TableResult<Table> {
        self.alter(changes, modifier, Utc::now())
    }

    fn apply(&mut self, change: &TableChange) -> TableResult<()> {
        match change {
            TableChange::Rename { new_name } => self.name = new_name.clone(),
            TableChange::UpdateComment { comment } => self.comment = comment.clone(),
            TableChange::SetProperty { key, value } => {
                self.properties.insert(key.clone(), value.clone());
            }
            TableChange::RemoveProperty { key } => {
                self.properties.remove(key);
            }
            TableChange::AddColumn { column, position } => {
                ensure!(
                    self.column(column.name()).is_none(),
                    InvalidSchemaSnafu {
                        reason: format!("column '{}' already exists", column.name()),
                    }
                );
                let index = self.position_index(position, "AddColumn")?;
                self.columns.insert(index, column.clone());
            }
            TableChange::RenameColumn { name, new_name } => {
                ensure!(
                    name == new_name || self.column(new_name).is_none(),
                    InvalidSchemaSnafu {
                        reason: format!("column '{new_name}' already exists"),
                    }
                );
                self.column_mut(name, "RenameColumn")?
                    .set_name(new_name.clone());
                for transform in &mut self.partitioning {
                    transform.rename_column(name, new_name);
                }
                self.distribution.rename_column(name, new_name);
                for entry in &mut self.sort_order {
                    entry.rename_column(name, new_name);
                }
            }
            TableChange::UpdateColumnType { name, data_type } => {
                self.column_mut(name, "UpdateColumnType")?
                    .set_data_type(data_type.clone());
            }
            TableChange::UpdateColumnComment { name, comment } => {
                self.column_mut(name, "UpdateColumnComment")?
                    .set_comment(comment.clone());
            }
            TableChange::UpdateColumnNullability { name, nullable } => {
                self.column_mut(name, "UpdateColumnNullability")?
                    .set_nullable(*nullable);
            }
            TableChange::UpdateColumnDefault {
                name,
                default_value,
            } => {
                self.column_mut(name, "UpdateColumnDefault")?
                    .set_default_value(default_value.clone());
            }
            TableChange::UpdateColumnPosition { name, position } => {
                let from = self.column_index(name, "UpdateColumnPosition")?;
                // Resolve the anchor while the moved column is still in place.
                self.position_index(position, "UpdateColumnPosition")?;
                if matches!(position, ColumnPosition::After(anchor) if anchor == name) {
                    return Ok(());
                }
                let column = self.columns.remove(from);
                let index = self.position_index(position, "UpdateColumnPosition")?;
                self.columns.insert(index, column);
            }
            TableChange::DeleteColumn { name, if_exists } => {
                let found = self.columns.iter().position(|c| c.name() == name);
                match found {
                    Some(index) => {
                        self.columns.remove(index);
                    }
                    None if *if_exists => {
                        debug!("DeleteColumn: '{name}' absent, skipped (if_exists)");
                    }
                    None => {
                        return UnresolvedColumnSnafu {
                            column: name.as_str(),
                            referenced_by: "DeleteColumn",
                        }
                        .fail();
                    }
                }
            }
        }
        Ok(())
    }

    fn column_index(&self, name: &str, referenced_by: &str) -> TableResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .context(UnresolvedColumnSnafu {
                column: name,
                referenced_by,
            })
    }

    fn column_mut(&mut self, name: &str, referenced_by: &str) -> TableResult<&mut Column> {
        let index = self.column_index(name, referenced_by)?;
        Ok(&mut self.columns[index])
    }

    fn position_index(&self, position: &ColumnPosition, referenced_by: &str) -> TableResult<usize> {
        Ok(match position {
            ColumnPosition::First => 0,
            ColumnPosition::Last => self.columns.len(),
            ColumnPosition::After(anchor) => self.column_index(anchor, referenced_by)? + 1,
        })
    }
}
