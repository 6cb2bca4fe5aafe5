//! Core model for catalog tables.
//!
//! This crate provides a backend-neutral description of a table as catalogs
//! (Hive metastores, JDBC databases, lakehouse formats) expose it:
//!
//! - Columns with a logical type vocabulary (`types`, `column` modules).
//! - Partitioning transforms, distribution and sort order, each validated
//!   against the table's columns (`transform`, `distribution`,
//!   `sort_order` modules).
//! - An immutable, validated [`Table`] value plus copy-on-write alterations
//!   (`table` module).
//! - The [`CatalogTable`] and [`TableCatalog`] traits backends implement,
//!   with an in-memory reference catalog (`catalog` module).
//! - Projection of a table onto an Arrow schema (`arrow_schema` module).
//!
//! Higher-level integration crates are expected to depend on this core crate
//! rather than re-implementing table validation.
#![deny(missing_docs)]
pub mod arrow_schema;
pub mod audit;
pub mod catalog;
pub mod column;
pub mod distribution;
pub mod expression;
pub mod namespace;
pub mod properties;
pub mod sort_order;
pub mod table;
pub mod transform;
pub mod types;

pub use catalog::{
    CatalogError, CatalogResult, CatalogTable, InMemoryCatalog, TableCatalog, TableDefinition,
};
pub use table::{ColumnPosition, Table, TableBuilder, TableChange, TableError, TableResult};
