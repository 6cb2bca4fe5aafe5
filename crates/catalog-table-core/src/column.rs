//! Column definitions.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    expression::Expression,
    table::{TableError, TableResult, error::InvalidSchemaSnafu},
    types::DataType,
};

/// A single table column.
///
/// Columns are plain values: once built they describe a structural fact about
/// a table and are never mutated in place. Name uniqueness is a property of
/// the owning table and is checked when the table is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "ColumnRecord")]
pub struct Column {
    name: String,
    data_type: DataType,
    nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

/// Serialized shape of a [`Column`]; checked like [`Column::new`].
#[derive(Deserialize)]
struct ColumnRecord {
    name: String,
    data_type: DataType,
    nullable: bool,
    #[serde(default)]
    default_value: Option<Expression>,
    #[serde(default)]
    comment: Option<String>,
}

impl TryFrom<ColumnRecord> for Column {
    type Error = TableError;

    fn try_from(record: ColumnRecord) -> Result<Self, Self::Error> {
        let column = Column {
            name: record.name,
            data_type: record.data_type,
            nullable: record.nullable,
            default_value: record.default_value,
            comment: record.comment,
        };
        column.validate()?;
        Ok(column)
    }
}

impl Column {
    /// Build a column.
    ///
    /// # Errors
    /// Returns [`crate::TableError::InvalidSchema`] if `name` is empty or
    /// whitespace, or if `data_type` is malformed (for example a zero-width
    /// fixed binary or an empty struct).
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> TableResult<Self> {
        let column = Column {
            name: name.into(),
            data_type,
            nullable,
            default_value: None,
            comment: None,
        };
        column.validate()?;
        Ok(column)
    }

    /// Same column, with a default value expression.
    pub fn with_default(mut self, default_value: Expression) -> Self {
        self.default_value = Some(default_value);
        self
    }

    /// Same column, with a comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column data type.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Whether the column accepts nulls.
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Default value expression, if any.
    pub fn default_value(&self) -> Option<&Expression> {
        self.default_value.as_ref()
    }

    /// Column comment, if any.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub(crate) fn validate(&self) -> TableResult<()> {
        snafu::ensure!(
            !self.name.trim().is_empty(),
            InvalidSchemaSnafu {
                reason: "column name must be non-empty",
            }
        );
        self.data_type.validate(&self.name)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_data_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
    }

    pub(crate) fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    pub(crate) fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    pub(crate) fn set_default_value(&mut self, default_value: Option<Expression>) {
        self.default_value = default_value;
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        if let Some(default) = &self.default_value {
            write!(f, " DEFAULT {default}")?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT '{comment}'")?;
        }
        Ok(())
    }
}
