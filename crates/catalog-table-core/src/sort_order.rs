//! Sort order entries.
//!
//! A table's sort order is a plain `Vec<SortEntry>`. An empty list means the
//! caller expressed no preference; the model does not distinguish that from
//! "explicitly unsorted".
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expression::Expression;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest values first.
    #[default]
    Ascending,
    /// Largest values first.
    Descending,
}

impl SortDirection {
    /// Null ordering used when none is given: nulls first for ascending,
    /// nulls last for descending.
    pub fn default_null_ordering(self) -> NullOrdering {
        match self {
            SortDirection::Ascending => NullOrdering::NullsFirst,
            SortDirection::Descending => NullOrdering::NullsLast,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ASC"),
            SortDirection::Descending => write!(f, "DESC"),
        }
    }
}

/// Placement of nulls relative to non-null values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NullOrdering {
    /// Nulls sort before all other values.
    NullsFirst,
    /// Nulls sort after all other values.
    NullsLast,
}

impl fmt::Display for NullOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullOrdering::NullsFirst => write!(f, "NULLS FIRST"),
            NullOrdering::NullsLast => write!(f, "NULLS LAST"),
        }
    }
}

/// One sort key: an expression, a direction and a null ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SortEntry {
    expression: Expression,
    direction: SortDirection,
    null_ordering: NullOrdering,
}

impl SortEntry {
    /// Entry with the direction's default null ordering.
    pub fn new(expression: Expression, direction: SortDirection) -> Self {
        Self::with_null_ordering(expression, direction, direction.default_null_ordering())
    }

    /// Entry with an explicit null ordering.
    pub fn with_null_ordering(
        expression: Expression,
        direction: SortDirection,
        null_ordering: NullOrdering,
    ) -> Self {
        Self {
            expression,
            direction,
            null_ordering,
        }
    }

    /// Ascending, nulls first, on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(Expression::column(column), SortDirection::Ascending)
    }

    /// Descending, nulls last, on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(Expression::column(column), SortDirection::Descending)
    }

    /// The sort key expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The sort direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// The null ordering.
    pub fn null_ordering(&self) -> NullOrdering {
        self.null_ordering
    }

    pub(crate) fn rename_column(&mut self, from: &str, to: &str) {
        self.expression.rename_column(from, to);
    }
}

impl fmt::Display for SortEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.expression, self.direction, self.null_ordering
        )
    }
}
