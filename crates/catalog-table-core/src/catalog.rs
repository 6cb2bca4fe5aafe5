//! The contract catalog backends implement.
//!
//! Two traits make up the seam between the model and a backend:
//!
//! - [`CatalogTable`] is how a backend exposes its own table representation.
//!   Only the name, columns and audit record are required; every other part
//!   has a provided default, so a backend that has no notion of (say)
//!   bucketing simply does not override [`CatalogTable::distribution`] and
//!   consumers see [`Distribution::NONE`].
//! - [`TableCatalog`] is the set of operations a backend offers over a
//!   namespace: list, load, create, alter and drop.
//!
//! [`memory::InMemoryCatalog`] is a reference implementation.
pub mod memory;

use snafu::prelude::*;

use crate::{
    audit::AuditInfo,
    column::Column,
    distribution::Distribution,
    namespace::{Namespace, TableIdent},
    properties::Properties,
    sort_order::SortEntry,
    table::{Table, TableChange, TableError},
    transform::Transform,
};

pub use memory::InMemoryCatalog;

/// A backend's view of one table.
pub trait CatalogTable {
    /// Table name.
    fn name(&self) -> &str;

    /// Columns in declaration order.
    fn columns(&self) -> &[Column];

    /// Audit record.
    fn audit(&self) -> &AuditInfo;

    /// Partition transforms, outermost first. Defaults to unpartitioned.
    fn partitioning(&self) -> &[Transform] {
        &[]
    }

    /// Sort order. Defaults to no preference.
    fn sort_order(&self) -> &[SortEntry] {
        &[]
    }

    /// Distribution. Defaults to [`Distribution::NONE`].
    fn distribution(&self) -> &Distribution {
        Distribution::none_ref()
    }

    /// Table comment. Defaults to none.
    fn comment(&self) -> Option<&str> {
        None
    }

    /// Table properties. Defaults to empty.
    fn properties(&self) -> &Properties {
        Properties::empty()
    }
}

/// Errors returned by [`TableCatalog`] operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CatalogError {
    /// The namespace is not known to the catalog.
    #[snafu(display("Namespace '{namespace}' does not exist"))]
    NoSuchNamespace {
        /// The missing namespace.
        namespace: Namespace,
    },

    /// No table exists under the identifier.
    #[snafu(display("Table '{ident}' does not exist"))]
    NoSuchTable {
        /// The missing table.
        ident: TableIdent,
    },

    /// A table already exists under the identifier.
    #[snafu(display("Table '{ident}' already exists"))]
    TableAlreadyExists {
        /// The conflicting identifier.
        ident: TableIdent,
    },

    /// Another writer replaced the table after it was loaded for alteration.
    #[snafu(display("Table '{ident}' was modified concurrently; reload and retry"))]
    ConcurrentModification {
        /// The contended table.
        ident: TableIdent,
    },

    /// The table definition or alteration is invalid.
    #[snafu(display("Invalid table '{ident}': {source}"))]
    InvalidTable {
        /// The table being created or altered.
        ident: TableIdent,
        /// Underlying validation error.
        source: TableError,
    },
}

/// A convenience type alias for results of catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Everything needed to create a table besides its identifier.
///
/// The table name comes from the identifier passed to
/// [`TableCatalog::create_table`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDefinition {
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Partition transforms, outermost first.
    pub partitioning: Vec<Transform>,
    /// Sort order.
    pub sort_order: Vec<SortEntry>,
    /// Distribution.
    pub distribution: Distribution,
    /// Table comment.
    pub comment: Option<String>,
    /// Table properties.
    pub properties: Properties,
}

impl TableDefinition {
    /// Definition with `columns` and every other part at its default.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Validate into a table named `name`, created by `creator` now.
    ///
    /// # Errors
    /// Returns the first [`TableError`] the definition violates.
    pub fn into_table(self, name: &str, creator: &str) -> Result<Table, TableError> {
        let mut builder = Table::builder(name, self.columns)
            .partitioning(self.partitioning)
            .sort_order(self.sort_order)
            .distribution(self.distribution)
            .properties(self.properties)
            .audit(AuditInfo::new(creator));
        if let Some(comment) = self.comment {
            builder = builder.comment(comment);
        }
        builder.build()
    }
}

/// Table operations a catalog backend provides.
///
/// Implementations hand out immutable [`Table`] snapshots. Publishing a new
/// snapshot after [`TableCatalog::alter_table`] must be atomic with respect
/// to concurrent [`TableCatalog::load_table`] calls.
pub trait TableCatalog: Send + Sync {
    /// Identifiers of all tables in `namespace`, in identifier order.
    ///
    /// # Errors
    /// [`CatalogError::NoSuchNamespace`] if the namespace is unknown.
    fn list_tables(&self, namespace: &Namespace) -> CatalogResult<Vec<TableIdent>>;

    /// Load the current snapshot of a table.
    ///
    /// # Errors
    /// [`CatalogError::NoSuchTable`] if nothing is registered under `ident`.
    fn load_table(&self, ident: &TableIdent) -> CatalogResult<Table>;

    /// Returns true if a table is registered under `ident`.
    fn table_exists(&self, ident: &TableIdent) -> bool {
        self.load_table(ident).is_ok()
    }

    /// Create a table from `definition`, recording `creator` in its audit
    /// record.
    ///
    /// # Errors
    /// [`CatalogError::TableAlreadyExists`], [`CatalogError::NoSuchNamespace`]
    /// or [`CatalogError::InvalidTable`].
    fn create_table(
        &self,
        ident: &TableIdent,
        definition: TableDefinition,
        creator: &str,
    ) -> CatalogResult<Table>;

    /// Apply `changes` to a table and publish the new snapshot.
    ///
    /// A [`TableChange::Rename`] moves the table to the new name within the
    /// same namespace.
    ///
    /// # Errors
    /// [`CatalogError::NoSuchTable`], [`CatalogError::TableAlreadyExists`]
    /// (rename onto an existing table), [`CatalogError::ConcurrentModification`]
    /// (another writer published first) or [`CatalogError::InvalidTable`].
    fn alter_table(
        &self,
        ident: &TableIdent,
        changes: &[TableChange],
        modifier: &str,
    ) -> CatalogResult<Table>;

    /// Drop a table. Returns false if no table was registered under `ident`.
    fn drop_table(&self, ident: &TableIdent) -> bool;
}
