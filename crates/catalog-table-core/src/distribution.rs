//! Data distribution (bucketing) across partitions.
use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::table::{TableResult, error::InvalidDistributionSnafu};

static NONE: Distribution = Distribution::None;

/// Discriminator for [`Distribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    /// No distribution requirement.
    None,
    /// Hash distribution into a fixed number of buckets.
    Hash,
}

/// How rows are distributed across buckets.
///
/// Tables that do not specify a distribution report [`Distribution::NONE`],
/// so consumers never deal with an absent value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Distribution {
    /// No distribution requirement.
    #[default]
    None,

    /// Hash the given columns into `num_buckets` buckets.
    Hash {
        /// Columns to hash, in order.
        columns: Vec<String>,
        /// Number of buckets; always at least 1.
        num_buckets: u32,
    },
}

impl Distribution {
    /// The "no distribution" sentinel.
    pub const NONE: Distribution = Distribution::None;

    /// A `'static` reference to [`Distribution::NONE`], for default trait
    /// methods that hand out borrowed values.
    pub fn none_ref() -> &'static Distribution {
        &NONE
    }

    /// Hash distribution over `columns`.
    ///
    /// # Errors
    /// Returns [`crate::TableError::InvalidDistribution`] when `columns` is
    /// empty, a column name is empty, or `num_buckets` is zero.
    pub fn hash<I, S>(columns: I, num_buckets: u32) -> TableResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distribution = Distribution::Hash {
            columns: columns.into_iter().map(Into::into).collect(),
            num_buckets,
        };
        distribution.validate_args()?;
        Ok(distribution)
    }

    /// The variant discriminator.
    pub fn kind(&self) -> DistributionKind {
        match self {
            Distribution::None => DistributionKind::None,
            Distribution::Hash { .. } => DistributionKind::Hash,
        }
    }

    /// Returns true for the [`Distribution::NONE`] sentinel.
    pub fn is_none(&self) -> bool {
        matches!(self, Distribution::None)
    }

    /// Distribution columns; empty for [`Distribution::NONE`].
    pub fn columns(&self) -> &[String] {
        match self {
            Distribution::None => &[],
            Distribution::Hash { columns, .. } => columns,
        }
    }

    /// Bucket count; `None` for [`Distribution::NONE`].
    pub fn num_buckets(&self) -> Option<u32> {
        match self {
            Distribution::None => None,
            Distribution::Hash { num_buckets, .. } => Some(*num_buckets),
        }
    }

    /// Check the rules that do not depend on the owning table.
    ///
    /// # Errors
    /// See [`Distribution::hash`].
    pub fn validate_args(&self) -> TableResult<()> {
        if let Distribution::Hash {
            columns,
            num_buckets,
        } = self
        {
            ensure!(
                !columns.is_empty(),
                InvalidDistributionSnafu {
                    reason: "hash distribution requires at least one column",
                }
            );
            ensure!(
                *num_buckets > 0,
                InvalidDistributionSnafu {
                    reason: format!("num_buckets must be > 0 (got {num_buckets})"),
                }
            );
            ensure!(
                columns.iter().all(|c| !c.trim().is_empty()),
                InvalidDistributionSnafu {
                    reason: "distribution column name must be non-empty",
                }
            );
        }
        Ok(())
    }

    pub(crate) fn rename_column(&mut self, from: &str, to: &str) {
        if let Distribution::Hash { columns, .. } = self {
            for column in columns.iter_mut().filter(|c| c.as_str() == from) {
                *column = to.to_string();
            }
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::None => write!(f, "none"),
            Distribution::Hash {
                columns,
                num_buckets,
            } => write!(f, "hash({}) into {num_buckets} buckets", columns.join(", ")),
        }
    }
}
