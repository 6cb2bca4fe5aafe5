//! Error types and SNAFU context selectors for table construction.
//!
//! Every validation failure in the model surfaces as one [`TableError`]
//! variant. Context selectors are exposed crate-wide (via
//! `#[snafu(visibility(pub(crate)))]`) so the column, transform and
//! distribution modules can report failures without going through the table
//! builder.

use snafu::prelude::*;

/// Errors raised while constructing or altering a [`crate::table::Table`].
///
/// Errors are only ever produced at construction time; once a value exists it
/// is immutable and every accessor is infallible.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum TableError {
    /// Empty table name, empty column list, empty or duplicate column name, or
    /// a malformed column data type.
    #[snafu(display("Invalid schema: {reason}"))]
    InvalidSchema {
        /// Human-readable description of the violated rule.
        reason: String,
    },

    /// A transform, distribution or sort entry names a column the table does
    /// not declare.
    #[snafu(display("{referenced_by} references unknown column '{column}'"))]
    UnresolvedColumn {
        /// The column name that failed to resolve.
        column: String,
        /// What carried the reference (for example `partitioning[0] (day)`).
        referenced_by: String,
    },

    /// Hash distribution with no columns or a non-positive bucket count.
    #[snafu(display("Invalid distribution: {reason}"))]
    InvalidDistribution {
        /// Human-readable description of the violated rule.
        reason: String,
    },

    /// Malformed transform arguments (for example a zero bucket count or
    /// truncate width).
    #[snafu(display("Invalid transform '{transform}': {reason}"))]
    InvalidTransform {
        /// Canonical name of the offending transform.
        transform: String,
        /// Human-readable description of the violated rule.
        reason: String,
    },

    /// Inconsistent audit record (modification before creation, or a
    /// modifier without a modification time and vice versa).
    #[snafu(display("Invalid audit record: {reason}"))]
    InvalidAudit {
        /// Human-readable description of the violated rule.
        reason: String,
    },
}

/// A convenience alias for results of table construction.
pub type TableResult<T> = Result<T, TableError>;
