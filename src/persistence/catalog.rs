use std::{
    collections::BTreeSet,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use indexmap::IndexMap;
use log::info;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::storage::{KvBackend, open_backend};

use super::registry::SchemaRegistry;
use super::schema::{ColumnDefinition, validate_columns, validate_table_name};
use super::table::Table;

/// The set of tables reachable through one key-value backend.
///
/// A [`Catalog`] is an ordinary value: whoever needs tables constructs one and
/// passes it around. Open tables are cached in an [`IndexMap`] keyed by name so
/// [`Catalog::open_tables`] reports them in the order they were opened.
///
/// Existence checks look at both the cache and the persisted schemas. A table
/// that exists on disk but was never opened is loaded on first use.
///
/// Create and drop hold the cache's write lock for their whole duration, so
/// the existence check and the write that follows cannot interleave with
/// another create or drop.
pub struct Catalog {
    backend: Arc<dyn KvBackend>,
    registry: SchemaRegistry,
    tables: RwLock<IndexMap<String, Arc<Table>>>,
    scan_batch_size: usize,
}

impl Catalog {
    pub fn new(backend: Arc<dyn KvBackend>, scan_batch_size: usize) -> Catalog {
        let registry = SchemaRegistry::new(&backend);

        Catalog {
            backend,
            registry,
            tables: RwLock::new(IndexMap::new()),
            scan_batch_size,
        }
    }

    pub fn open(config: &EngineConfig) -> Result<Catalog> {
        //! Open the configured backend and wrap it in a catalog.

        config.validate()?;
        let backend = open_backend(config)?;
        Ok(Catalog::new(backend, config.scan_batch_size))
    }

    pub fn backend(&self) -> Arc<dyn KvBackend> {
        Arc::clone(&self.backend)
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn create_table(&self, name: &str, columns: Vec<ColumnDefinition>) -> Result<Arc<Table>> {
        //! Persist a new table and open it.

        validate_table_name(name)?;
        validate_columns(&columns)?;

        let mut tables = self.write_tables();
        if tables.contains_key(name) || self.registry.table_exists(name)? {
            return Err(Error::already_exists(name));
        }

        self.registry.create_table(name, &columns)?;
        let table = Arc::new(self.build_table(name, columns)?);
        tables.insert(name.to_string(), Arc::clone(&table));

        Ok(table)
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        //! Delete the table's schema, row count and rows, and close it.
        //!
        //! Handles that callers still hold are retired: every later operation on
        //! them fails with [`Error::NotFound`], even once the name is created
        //! again.

        let mut tables = self.write_tables();
        let cached = tables.get(name).cloned();
        let persisted = self.registry.table_exists(name)?;

        if cached.is_none() && !persisted {
            return Err(Error::not_found(name));
        }

        let drop_storage = || -> Result<()> {
            if persisted {
                self.registry.drop_table(name)?;
            }
            Ok(())
        };
        match cached {
            Some(table) => table.retire(drop_storage)?,
            None => drop_storage()?,
        }
        tables.shift_remove(name);

        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Result<Arc<Table>> {
        //! Return the open table, loading it from its persisted schema on the
        //! first request.

        if let Some(table) = self.read_tables().get(name) {
            return Ok(Arc::clone(table));
        }

        let mut tables = self.write_tables();
        // Someone may have opened it between the two locks.
        if let Some(table) = tables.get(name) {
            return Ok(Arc::clone(table));
        }

        if !self.registry.table_exists(name)? {
            return Err(Error::not_found(name));
        }

        let columns = self.registry.get_table_schema(name)?;
        let table = Arc::new(self.build_table(name, columns)?);
        tables.insert(name.to_string(), Arc::clone(&table));
        info!("opened table {} from storage", name);

        Ok(table)
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        if self.read_tables().contains_key(name) {
            return Ok(true);
        }
        self.registry.table_exists(name)
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        //! Every known table, open or not, sorted by name.

        let mut names: BTreeSet<String> = self.registry.list_tables()?.into_iter().collect();
        names.extend(self.read_tables().keys().cloned());
        Ok(names.into_iter().collect())
    }

    pub fn open_tables(&self) -> Vec<String> {
        //! Only the tables opened by this catalog, in the order they were opened.

        self.read_tables().keys().cloned().collect()
    }

    pub fn flush(&self) -> Result<()> {
        self.backend.flush()
    }

    fn build_table(&self, name: &str, columns: Vec<ColumnDefinition>) -> Result<Table> {
        let mut table = Table::new(name, &self.registry, &self.backend, self.scan_batch_size);
        table.initialize(columns)?;
        Ok(table)
    }

    // The map only caches handles; a poisoned lock still holds a usable map.
    fn read_tables(&self) -> RwLockReadGuard<'_, IndexMap<String, Arc<Table>>> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, IndexMap<String, Arc<Table>>> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}
