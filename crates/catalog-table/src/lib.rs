//! # catalog-table
//!
//! Backend-neutral table metadata: columns, partitioning, distribution and
//! sort order, validated as one unit.
//!
//! This crate is the supported public entry point and provides a small, stable surface.
//!
//! ## Example
//!
//! ```rust
//! use catalog_table::prelude::*;
//!
//! let table = Table::builder(
//!     "events",
//!     vec![
//!         Column::new("id", DataType::Int32, false)?,
//!         Column::new("ts", DataType::timestamp(TimeUnit::Micros), true)?,
//!     ],
//! )
//! .partitioning(vec![Transform::day("ts")])
//! .distribution(Distribution::hash(["id"], 16)?)
//! .build()?;
//!
//! assert_eq!(table.partitioning()[0].to_string(), "day(ts)");
//! # Ok::<(), TableError>(())
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// Catalog backends (traits and the in-memory reference implementation).
pub mod catalog {
    pub use catalog_table_core::catalog::{
        CatalogError, CatalogResult, CatalogTable, InMemoryCatalog, TableCatalog, TableDefinition,
    };
    pub use catalog_table_core::namespace::{Namespace, TableIdent};
}

/// Arrow projection.
pub mod arrow {
    pub use catalog_table_core::arrow_schema::{COMMENT_METADATA_KEY, SchemaConvertError};
}

pub use catalog_table_core::audit::AuditInfo;
pub use catalog_table_core::column::Column;
pub use catalog_table_core::distribution::{Distribution, DistributionKind};
pub use catalog_table_core::expression::{Expression, Literal};
pub use catalog_table_core::properties::Properties;
pub use catalog_table_core::sort_order::{NullOrdering, SortDirection, SortEntry};
pub use catalog_table_core::table::{
    ColumnPosition, Table, TableBuilder, TableChange, TableError, TableResult,
};
pub use catalog_table_core::transform::{
    ParseGranularityError, TimeGranularity, Transform, TransformArg, TransformKind,
};
pub use catalog_table_core::types::{DataType, StructField, TimeUnit};
