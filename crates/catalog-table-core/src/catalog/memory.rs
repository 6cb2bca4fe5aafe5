//! In-memory [`TableCatalog`] implementation.
//!
//! Tables are stored as `Arc<Table>` snapshots behind a single
//! `parking_lot::RwLock`. An alteration computes the new snapshot outside the
//! write lock and swaps it in under the lock, so readers observe either the
//! old or the new snapshot, never a mix.
use std::{collections::BTreeMap, sync::Arc};

use log::{debug, warn};
use parking_lot::RwLock;
use snafu::prelude::*;

use crate::{
    catalog::{
        CatalogResult, ConcurrentModificationSnafu, InvalidTableSnafu, NoSuchNamespaceSnafu,
        NoSuchTableSnafu, TableAlreadyExistsSnafu, TableCatalog, TableDefinition,
    },
    namespace::{Namespace, TableIdent},
    table::{Table, TableChange},
};

type TableMap = BTreeMap<String, Arc<Table>>;

/// A catalog that keeps every table in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    namespaces: RwLock<BTreeMap<Namespace, TableMap>>,
}

impl InMemoryCatalog {
    /// An empty catalog with no namespaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `namespace`. Returns false if it already existed.
    pub fn create_namespace(&self, namespace: Namespace) -> bool {
        let mut guard = self.namespaces.write();
        if guard.contains_key(&namespace) {
            return false;
        }
        debug!("Created namespace '{namespace}'");
        guard.insert(namespace, TableMap::new());
        true
    }

    /// Registered namespaces, in order.
    pub fn namespaces(&self) -> Vec<Namespace> {
        self.namespaces.read().keys().cloned().collect()
    }

    /// Shared handle to the current snapshot of a table.
    ///
    /// # Errors
    /// [`crate::catalog::CatalogError::NoSuchTable`] if nothing is registered
    /// under `ident`.
    pub fn load_table_shared(&self, ident: &TableIdent) -> CatalogResult<Arc<Table>> {
        self.namespaces
            .read()
            .get(&ident.namespace)
            .and_then(|tables| tables.get(&ident.name))
            .cloned()
            .context(NoSuchTableSnafu {
                ident: ident.clone(),
            })
    }

    /// Swap `altered` in for `base`, provided `base` is still the published
    /// snapshot of `ident`.
    fn publish(
        &self,
        ident: &TableIdent,
        base: &Arc<Table>,
        altered: &Table,
    ) -> CatalogResult<()> {
        let mut guard = self.namespaces.write();
        let tables = guard
            .get_mut(&ident.namespace)
            .context(NoSuchTableSnafu {
                ident: ident.clone(),
            })?;

        let published = tables.get(&ident.name).context(NoSuchTableSnafu {
            ident: ident.clone(),
        })?;
        if !Arc::ptr_eq(published, base) {
            warn!("Table '{ident}' changed after it was loaded; alteration rejected");
            return ConcurrentModificationSnafu {
                ident: ident.clone(),
            }
            .fail();
        }

        if altered.name() != ident.name {
            ensure!(
                !tables.contains_key(altered.name()),
                TableAlreadyExistsSnafu {
                    ident: TableIdent::new(ident.namespace.clone(), altered.name()),
                }
            );
            tables.remove(&ident.name);
        }
        tables.insert(altered.name().to_string(), Arc::new(altered.clone()));
        Ok(())
    }
}

impl TableCatalog for InMemoryCatalog {
    fn list_tables(&self, namespace: &Namespace) -> CatalogResult<Vec<TableIdent>> {
        let guard = self.namespaces.read();
        let tables = guard.get(namespace).context(NoSuchNamespaceSnafu {
            namespace: namespace.clone(),
        })?;
        Ok(tables
            .keys()
            .map(|name| TableIdent::new(namespace.clone(), name.clone()))
            .collect())
    }

    fn load_table(&self, ident: &TableIdent) -> CatalogResult<Table> {
        self.load_table_shared(ident).map(|table| (*table).clone())
    }

    fn create_table(
        &self,
        ident: &TableIdent,
        definition: TableDefinition,
        creator: &str,
    ) -> CatalogResult<Table> {
        let table = definition
            .into_table(&ident.name, creator)
            .context(InvalidTableSnafu {
                ident: ident.clone(),
            })?;

        let mut guard = self.namespaces.write();
        let tables = guard
            .get_mut(&ident.namespace)
            .context(NoSuchNamespaceSnafu {
                namespace: ident.namespace.clone(),
            })?;
        ensure!(
            !tables.contains_key(&ident.name),
            TableAlreadyExistsSnafu {
                ident: ident.clone(),
            }
        );
        tables.insert(ident.name.clone(), Arc::new(table.clone()));

        debug!("Created table '{ident}'");
        Ok(table)
    }

    fn alter_table(
        &self,
        ident: &TableIdent,
        changes: &[TableChange],
        modifier: &str,
    ) -> CatalogResult<Table> {
        let current = self.load_table_shared(ident)?;
        let altered = current
            .alter_now(changes, modifier)
            .context(InvalidTableSnafu {
                ident: ident.clone(),
            })?;

        self.publish(ident, &current, &altered)?;
        debug!("Published new snapshot of '{ident}' as '{}'", altered.name());
        Ok(altered)
    }

    fn drop_table(&self, ident: &TableIdent) -> bool {
        let mut guard = self.namespaces.write();
        let dropped = guard
            .get_mut(&ident.namespace)
            .and_then(|tables| tables.remove(&ident.name))
            .is_some();
        if dropped {
            debug!("Dropped table '{ident}'");
        } else {
            warn!("Drop of '{ident}' found no table");
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::CatalogError, column::Column, table::TableError, transform::Transform,
        types::DataType,
    };

    fn ns() -> Namespace {
        Namespace::of(["lake", "sales"])
    }

    fn definition() -> TableDefinition {
        TableDefinition {
            partitioning: vec![Transform::identity("region")],
            ..TableDefinition::new(vec![
                Column::new("id", DataType::Int64, false).unwrap(),
                Column::new("region", DataType::Utf8, true).unwrap(),
            ])
        }
    }

    fn catalog() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.create_namespace(ns()));
        catalog
    }

    #[test]
    fn create_load_list_drop() {
        let catalog = catalog();
        let ident = TableIdent::new(ns(), "orders");

        let created = catalog
            .create_table(&ident, definition(), "alice")
            .unwrap();
        assert_eq!(created.name(), "orders");
        assert_eq!(created.audit().creator(), "alice");

        assert_eq!(catalog.load_table(&ident).unwrap(), created);
        assert!(catalog.table_exists(&ident));
        assert_eq!(catalog.list_tables(&ns()).unwrap(), vec![ident.clone()]);

        assert!(catalog.drop_table(&ident));
        assert!(!catalog.drop_table(&ident));
        assert!(!catalog.table_exists(&ident));
    }

    #[test]
    fn duplicate_namespace_and_table() {
        let catalog = catalog();
        assert!(!catalog.create_namespace(ns()));

        let ident = TableIdent::new(ns(), "orders");
        catalog.create_table(&ident, definition(), "alice").unwrap();
        let err = catalog
            .create_table(&ident, definition(), "bob")
            .unwrap_err();
        assert!(matches!(err, CatalogError::TableAlreadyExists { .. }));
    }

    #[test]
    fn unknown_namespace() {
        let catalog = InMemoryCatalog::new();
        let ident = TableIdent::new(ns(), "orders");
        assert!(matches!(
            catalog.create_table(&ident, definition(), "alice"),
            Err(CatalogError::NoSuchNamespace { .. })
        ));
        assert!(matches!(
            catalog.list_tables(&ns()),
            Err(CatalogError::NoSuchNamespace { .. })
        ));
    }

    #[test]
    fn invalid_definition_is_wrapped() {
        let catalog = catalog();
        let ident = TableIdent::new(ns(), "orders");
        let mut bad = definition();
        bad.partitioning = vec![Transform::day("ts")];

        let err = catalog.create_table(&ident, bad, "alice").unwrap_err();
        assert!(
            matches!(
                &err,
                CatalogError::InvalidTable { source: TableError::UnresolvedColumn { column, .. }, .. }
                    if column == "ts"
            ),
            "unexpected error: {err:?}"
        );
        assert!(!catalog.table_exists(&ident));
    }

    #[test]
    fn alter_publishes_new_snapshot_and_keeps_old_handles_valid() {
        let catalog = catalog();
        let ident = TableIdent::new(ns(), "orders");
        catalog.create_table(&ident, definition(), "alice").unwrap();
        let before = catalog.load_table_shared(&ident).unwrap();

        let altered = catalog
            .alter_table(
                &ident,
                &[TableChange::SetProperty {
                    key: "owner".to_string(),
                    value: "sales".to_string(),
                }],
                "bob",
            )
            .unwrap();

        assert_eq!(altered.properties().get("owner"), Some("sales"));
        assert_eq!(altered.audit().last_modifier(), Some("bob"));
        assert!(before.properties().is_empty());
        assert_eq!(catalog.load_table(&ident).unwrap(), altered);
    }

    #[test]
    fn alter_rename_moves_table() {
        let catalog = catalog();
        let ident = TableIdent::new(ns(), "orders");
        catalog.create_table(&ident, definition(), "alice").unwrap();
        catalog
            .create_table(&TableIdent::new(ns(), "taken"), definition(), "alice")
            .unwrap();

        let err = catalog
            .alter_table(
                &ident,
                &[TableChange::Rename {
                    new_name: "taken".to_string(),
                }],
                "bob",
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::TableAlreadyExists { .. }));

        catalog
            .alter_table(
                &ident,
                &[TableChange::Rename {
                    new_name: "orders_v2".to_string(),
                }],
                "bob",
            )
            .unwrap();
        assert!(!catalog.table_exists(&ident));
        assert!(catalog.table_exists(&TableIdent::new(ns(), "orders_v2")));
    }

    #[test]
    fn alter_missing_table() {
        let catalog = catalog();
        let err = catalog
            .alter_table(&TableIdent::new(ns(), "nope"), &[], "bob")
            .unwrap_err();
        assert!(matches!(err, CatalogError::NoSuchTable { .. }));
    }

    fn set_property(key: &str, value: &str) -> TableChange {
        TableChange::SetProperty {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn stale_snapshot_is_a_concurrent_modification() {
        let catalog = catalog();
        let ident = TableIdent::new(ns(), "orders");
        catalog.create_table(&ident, definition(), "alice").unwrap();

        let stale = catalog.load_table_shared(&ident).unwrap();
        let from_stale = stale.alter_now(&[set_property("a", "1")], "bob").unwrap();
        catalog
            .alter_table(&ident, &[set_property("b", "2")], "carol")
            .unwrap();

        let err = catalog.publish(&ident, &stale, &from_stale).unwrap_err();
        assert!(
            matches!(&err, CatalogError::ConcurrentModification { ident: contended } if contended == &ident),
            "unexpected error: {err:?}"
        );
        assert!(catalog.table_exists(&ident));
        assert_eq!(
            catalog.load_table(&ident).unwrap().properties().get("a"),
            None
        );
    }

    #[test]
    fn stale_snapshot_of_dropped_table_is_missing() {
        let catalog = catalog();
        let ident = TableIdent::new(ns(), "orders");
        catalog.create_table(&ident, definition(), "alice").unwrap();

        let stale = catalog.load_table_shared(&ident).unwrap();
        let from_stale = stale.alter_now(&[set_property("a", "1")], "bob").unwrap();
        assert!(catalog.drop_table(&ident));

        let err = catalog.publish(&ident, &stale, &from_stale).unwrap_err();
        assert!(matches!(err, CatalogError::NoSuchTable { .. }));
    }

    #[test]
    fn contended_alterations_never_report_a_missing_table() {
        let catalog = Arc::new(catalog());
        let ident = TableIdent::new(ns(), "orders");
        catalog.create_table(&ident, definition(), "alice").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let catalog = Arc::clone(&catalog);
                let ident = ident.clone();
                std::thread::spawn(move || {
                    let mut published = 0usize;
                    for round in 0..200 {
                        let change = set_property(&format!("w{worker}"), &round.to_string());
                        match catalog.alter_table(&ident, &[change], "writer") {
                            Ok(_) => published += 1,
                            Err(CatalogError::ConcurrentModification { .. }) => {}
                            Err(err) => panic!("unexpected error: {err:?}"),
                        }
                    }
                    published
                })
            })
            .collect();

        let published: usize = handles
            .into_iter()
            .map(|h| h.join().expect("writer thread"))
            .sum();
        assert!(published > 0);
        assert!(catalog.table_exists(&ident));
    }

    #[test]
    fn namespaces_are_listed_in_order() {
        let catalog = catalog();
        assert!(catalog.create_namespace(Namespace::of(["lake", "ads"])));
        assert!(catalog.create_namespace(Namespace::root()));

        let listed = catalog.namespaces();
        assert_eq!(
            listed,
            vec![
                Namespace::root(),
                Namespace::of(["lake", "ads"]),
                Namespace::of(["lake", "sales"]),
            ]
        );
        assert_eq!(listed[2].levels(), ["lake".to_string(), "sales".to_string()]);
        assert_eq!(listed[2].len(), 2);
        assert!(listed[0].is_empty());
    }
}
