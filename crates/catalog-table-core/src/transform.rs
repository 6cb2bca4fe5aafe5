//! Partition transforms.
//!
//! A table's partitioning is an ordered list of [`Transform`]s, outermost
//! first. Each transform derives a partition value from one or more source
//! columns. The known kinds (identity, bucket, truncate and the time
//! functions) can be matched exhaustively via [`TransformKind`]; anything a
//! backend supports beyond that travels as [`Transform::Custom`] and is
//! interpreted by the backend alone.
//!
//! Column references are checked against the owning table when the table is
//! built; argument checks ([`Transform::validate_args`]) run both there and in
//! the fallible constructors.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::table::{TableResult, error::InvalidTransformSnafu};

const SECONDS_PER_HOUR: i64 = 60 * 60;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const EPOCH_YEAR: i64 = 1970;

/// Errors produced when parsing a time granularity name (e.g. `day`).
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ParseGranularityError {
    /// The input was empty or only whitespace.
    #[snafu(display("time granularity is empty"))]
    Empty,

    /// The input did not name a supported granularity.
    #[snafu(display("unknown time granularity '{input}' (expected year|month|day|hour)"))]
    Unknown {
        /// The original input.
        input: String,
    },
}

/// Granularity of a time-function partition transform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeGranularity {
    /// One partition per calendar year.
    Year,
    /// One partition per calendar month.
    Month,
    /// One partition per calendar day.
    Day,
    /// One partition per hour.
    Hour,
}

impl TimeGranularity {
    /// Canonical lower-case name, also used as the transform name.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeGranularity::Year => "year",
            TimeGranularity::Month => "month",
            TimeGranularity::Day => "day",
            TimeGranularity::Hour => "hour",
        }
    }

    /// Map `ts` to its partition ordinal, counted from the Unix epoch.
    ///
    /// - `Year`: whole years since 1970.
    /// - `Month`: whole months since 1970-01.
    /// - `Day`: whole days since 1970-01-01.
    /// - `Hour`: whole hours since 1970-01-01T00:00:00Z.
    ///
    /// The mapping is monotonic in time and uses floor division, so instants
    /// before the epoch map to negative ordinals.
    pub fn ordinal(self, ts: DateTime<Utc>) -> i64 {
        match self {
            TimeGranularity::Year => i64::from(ts.year()) - EPOCH_YEAR,
            TimeGranularity::Month => {
                (i64::from(ts.year()) - EPOCH_YEAR) * 12 + i64::from(ts.month0())
            }
            TimeGranularity::Day => ts.timestamp().div_euclid(SECONDS_PER_DAY),
            TimeGranularity::Hour => ts.timestamp().div_euclid(SECONDS_PER_HOUR),
        }
    }

    /// Parse a granularity name. This is a convenience wrapper around
    /// `str::parse`, accepting common aliases (`years`, `mon`, `d`, `hr`, ...).
    ///
    /// # Errors
    /// Returns [`ParseGranularityError`] if the input is empty or unknown.
    pub fn parse(input: &str) -> Result<Self, ParseGranularityError> {
        input.parse()
    }
}

impl FromStr for TimeGranularity {
    type Err = ParseGranularityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let spec = input.trim();
        ensure!(!spec.is_empty(), EmptySnafu);

        match spec.to_ascii_lowercase().as_str() {
            "y" | "year" | "years" => Ok(TimeGranularity::Year),
            "mon" | "month" | "months" => Ok(TimeGranularity::Month),
            "d" | "day" | "days" => Ok(TimeGranularity::Day),
            "h" | "hr" | "hour" | "hours" => Ok(TimeGranularity::Hour),
            _ => UnknownSnafu { input: spec }.fail(),
        }
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument of a [`Transform::Custom`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransformArg {
    /// Reference to a table column; resolved against the owning table.
    Column(String),
    /// Opaque literal argument, passed to the backend verbatim.
    Literal(String),
}

impl fmt::Display for TransformArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformArg::Column(name) => write!(f, "{name}"),
            TransformArg::Literal(value) => write!(f, "'{value}'"),
        }
    }
}

/// Discriminator for exhaustive matching over [`Transform`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// [`Transform::Identity`].
    Identity,
    /// [`Transform::Bucket`].
    Bucket,
    /// [`Transform::Truncate`].
    Truncate,
    /// [`Transform::Time`].
    TimeFunction,
    /// [`Transform::Custom`].
    Custom,
}

/// A partition transform over one or more source columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Partition by the raw column value.
    Identity {
        /// Source column.
        column: String,
    },

    /// Hash the source columns into a fixed number of buckets.
    Bucket {
        /// Source columns, in hashing order.
        columns: Vec<String>,
        /// Number of buckets; must be at least 1.
        num_buckets: u32,
    },

    /// Truncate the source value to `width` (string prefix length or integer
    /// range width, depending on the column type).
    Truncate {
        /// Source column.
        column: String,
        /// Truncation width; must be at least 1.
        width: u32,
    },

    /// Partition a temporal column at a calendar granularity.
    Time {
        /// Source column.
        column: String,
        /// Partition granularity.
        granularity: TimeGranularity,
    },

    /// Backend-specific transform the model does not interpret.
    Custom {
        /// Transform name as understood by the backend.
        name: String,
        /// Ordered arguments.
        #[serde(default)]
        args: Vec<TransformArg>,
    },
}

impl Transform {
    /// Identity transform over `column`.
    pub fn identity(column: impl Into<String>) -> Self {
        Transform::Identity {
            column: column.into(),
        }
    }

    /// Bucket transform over `columns`.
    ///
    /// # Errors
    /// Returns [`crate::TableError::InvalidTransform`] when `columns` is
    /// empty or `num_buckets` is zero.
    pub fn bucket<I, S>(columns: I, num_buckets: u32) -> TableResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transform = Transform::Bucket {
            columns: columns.into_iter().map(Into::into).collect(),
            num_buckets,
        };
        transform.validate_args()?;
        Ok(transform)
    }

    /// Truncate transform over `column`.
    ///
    /// # Errors
    /// Returns [`crate::TableError::InvalidTransform`] when `width` is zero.
    pub fn truncate(column: impl Into<String>, width: u32) -> TableResult<Self> {
        let transform = Transform::Truncate {
            column: column.into(),
            width,
        };
        transform.validate_args()?;
        Ok(transform)
    }

    /// Time-function transform over `column`.
    pub fn time(column: impl Into<String>, granularity: TimeGranularity) -> Self {
        Transform::Time {
            column: column.into(),
            granularity,
        }
    }

    /// `year(column)`.
    pub fn year(column: impl Into<String>) -> Self {
        Self::time(column, TimeGranularity::Year)
    }

    /// `month(column)`.
    pub fn month(column: impl Into<String>) -> Self {
        Self::time(column, TimeGranularity::Month)
    }

    /// `day(column)`.
    pub fn day(column: impl Into<String>) -> Self {
        Self::time(column, TimeGranularity::Day)
    }

    /// `hour(column)`.
    pub fn hour(column: impl Into<String>) -> Self {
        Self::time(column, TimeGranularity::Hour)
    }

    /// Backend-specific transform.
    ///
    /// # Errors
    /// Returns [`crate::TableError::InvalidTransform`] when `name` is empty.
    pub fn custom(name: impl Into<String>, args: Vec<TransformArg>) -> TableResult<Self> {
        let transform = Transform::Custom {
            name: name.into(),
            args,
        };
        transform.validate_args()?;
        Ok(transform)
    }

    /// The variant discriminator.
    pub fn kind(&self) -> TransformKind {
        match self {
            Transform::Identity { .. } => TransformKind::Identity,
            Transform::Bucket { .. } => TransformKind::Bucket,
            Transform::Truncate { .. } => TransformKind::Truncate,
            Transform::Time { .. } => TransformKind::TimeFunction,
            Transform::Custom { .. } => TransformKind::Custom,
        }
    }

    /// Canonical transform name (`identity`, `bucket`, `truncate`, `year`,
    /// `month`, `day`, `hour`, or the custom name).
    pub fn name(&self) -> &str {
        match self {
            Transform::Identity { .. } => "identity",
            Transform::Bucket { .. } => "bucket",
            Transform::Truncate { .. } => "truncate",
            Transform::Time { granularity, .. } => granularity.as_str(),
            Transform::Custom { name, .. } => name,
        }
    }

    /// Source columns in argument order. For custom transforms these are the
    /// [`TransformArg::Column`] arguments.
    pub fn source_columns(&self) -> Vec<&str> {
        match self {
            Transform::Identity { column }
            | Transform::Truncate { column, .. }
            | Transform::Time { column, .. } => vec![column.as_str()],
            Transform::Bucket { columns, .. } => columns.iter().map(String::as_str).collect(),
            Transform::Custom { args, .. } => args
                .iter()
                .filter_map(|arg| match arg {
                    TransformArg::Column(name) => Some(name.as_str()),
                    TransformArg::Literal(_) => None,
                })
                .collect(),
        }
    }

    /// Stable name of the partition field this transform produces, e.g.
    /// `ts_day`, `id_bucket_16`, `name_trunc_4`.
    pub fn partition_field_name(&self) -> String {
        match self {
            Transform::Identity { column } => column.clone(),
            Transform::Bucket {
                columns,
                num_buckets,
            } => format!("{}_bucket_{num_buckets}", columns.join("_")),
            Transform::Truncate { column, width } => format!("{column}_trunc_{width}"),
            Transform::Time {
                column,
                granularity,
            } => format!("{column}_{granularity}"),
            Transform::Custom { name, .. } => {
                let mut parts = vec![name.as_str()];
                parts.extend(self.source_columns());
                parts.join("_")
            }
        }
    }

    /// Check argument rules that do not depend on the owning table.
    ///
    /// # Errors
    /// Returns [`crate::TableError::InvalidTransform`] for an empty bucket
    /// column list, a zero bucket count or truncate width, an empty custom
    /// name, or an empty column reference.
    pub fn validate_args(&self) -> TableResult<()> {
        let transform = self.name();
        match self {
            Transform::Bucket {
                columns,
                num_buckets,
            } => {
                ensure!(
                    !columns.is_empty(),
                    InvalidTransformSnafu {
                        transform,
                        reason: "requires at least one source column",
                    }
                );
                ensure!(
                    *num_buckets >= 1,
                    InvalidTransformSnafu {
                        transform,
                        reason: format!("num_buckets must be >= 1 (got {num_buckets})"),
                    }
                );
            }
            Transform::Truncate { width, .. } => {
                ensure!(
                    *width >= 1,
                    InvalidTransformSnafu {
                        transform,
                        reason: format!("width must be >= 1 (got {width})"),
                    }
                );
            }
            Transform::Custom { name, .. } => {
                ensure!(
                    !name.trim().is_empty(),
                    InvalidTransformSnafu {
                        transform: "custom",
                        reason: "custom transform name must be non-empty",
                    }
                );
            }
            Transform::Identity { .. } | Transform::Time { .. } => {}
        }

        for column in self.source_columns() {
            ensure!(
                !column.trim().is_empty(),
                InvalidTransformSnafu {
                    transform,
                    reason: "column reference must be non-empty",
                }
            );
        }
        Ok(())
    }

    /// Rewrite every reference to column `from` into `to`.
    pub(crate) fn rename_column(&mut self, from: &str, to: &str) {
        let rename = |name: &mut String| {
            if name == from {
                *name = to.to_string();
            }
        };
        match self {
            Transform::Identity { column }
            | Transform::Truncate { column, .. }
            | Transform::Time { column, .. } => rename(column),
            Transform::Bucket { columns, .. } => columns.iter_mut().for_each(rename),
            Transform::Custom { args, .. } => {
                for arg in args {
                    if let TransformArg::Column(name) = arg {
                        rename(name);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Identity { column } => write!(f, "{column}"),
            Transform::Bucket {
                columns,
                num_buckets,
            } => write!(f, "bucket({num_buckets}, {})", columns.join(", ")),
            Transform::Truncate { column, width } => write!(f, "truncate({width}, {column})"),
            Transform::Time {
                column,
                granularity,
            } => write!(f, "{granularity}({column})"),
            Transform::Custom { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
