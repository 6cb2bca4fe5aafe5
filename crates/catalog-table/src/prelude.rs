//! Wrapper prelude.
//!
//! The `catalog-table` crate is the supported public entry point.
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::catalog::{CatalogTable, InMemoryCatalog, Namespace, TableCatalog, TableIdent};
pub use crate::{
    AuditInfo, Column, ColumnPosition, DataType, Distribution, Expression, Literal, NullOrdering,
    Properties, SortDirection, SortEntry, Table, TableBuilder, TableChange, TableError,
    TimeGranularity, TimeUnit, Transform,
};
