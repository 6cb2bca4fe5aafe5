//! Namespace and table identifiers supplied by the catalog layer.
//!
//! The model never interprets a namespace; it only carries it so that
//! catalog backends can address tables.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Hierarchical container path, outermost level first
/// (for example `["metalake", "catalog", "schema"]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Namespace(Vec<String>);

impl Namespace {
    /// Namespace from its levels.
    pub fn of<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(levels.into_iter().map(Into::into).collect())
    }

    /// The root namespace (no levels).
    pub fn root() -> Self {
        Self::default()
    }

    /// Levels, outermost first.
    pub fn levels(&self) -> &[String] {
        &self.0
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root namespace.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Fully-qualified table identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableIdent {
    /// Containing namespace.
    pub namespace: Namespace,
    /// Table name within the namespace.
    pub name: String,
}

impl TableIdent {
    /// Identifier for `name` in `namespace`.
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}
