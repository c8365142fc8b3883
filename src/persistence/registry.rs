use std::sync::Arc;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::storage::{KvBackend, Transaction};

use super::codec::{decode_row_count, decode_schema, encode_row_count, encode_schema};
use super::keys::{SCHEMA_PREFIX, meta_key, schema_key, table_from_schema_key};
use super::schema::{ColumnDefinition, validate_columns, validate_table_name};
use super::storage::RowStorage;

/// Persists table schemas and row counts under their reserved keys.
///
/// The registry is the source of truth for whether a table exists: a table
/// exists exactly when its schema key does. The row count is advisory in the
/// sense that a missing count reads as 0.
#[derive(Clone)]
pub struct SchemaRegistry {
    backend: Arc<dyn KvBackend>,
    rows: RowStorage,
}

impl SchemaRegistry {
    pub fn new(backend: &Arc<dyn KvBackend>) -> SchemaRegistry {
        SchemaRegistry {
            backend: Arc::clone(backend),
            rows: RowStorage::new(backend),
        }
    }

    pub fn create_table(&self, name: &str, columns: &[ColumnDefinition]) -> Result<()> {
        //! Write the schema record and a row count of 0 in one batch.

        validate_table_name(name)?;
        validate_columns(columns)?;

        if self.table_exists(name)? {
            return Err(Error::already_exists(name));
        }

        let mut txn = Transaction::begin(&self.backend);
        txn.put(&schema_key(name), &encode_schema(columns))?;
        txn.put(&meta_key(name), &encode_row_count(0))?;
        txn.commit()?;

        info!("created table {} with {} column(s)", name, columns.len());
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> Result<usize> {
        //! Remove the schema, the row count and every row of the table in one
        //! batch.
        //!
        //! Returns the number of rows that were removed.

        if !self.table_exists(name)? {
            return Err(Error::not_found(name));
        }

        let mut txn = Transaction::begin(&self.backend);
        txn.delete(&schema_key(name))?;
        txn.delete(&meta_key(name))?;
        let dropped_rows = self.rows.stage_drop_rows(&mut txn, name)?;
        txn.commit()?;

        info!("dropped table {} and {} row(s)", name, dropped_rows);
        Ok(dropped_rows)
    }

    pub fn get_table_schema(&self, name: &str) -> Result<Vec<ColumnDefinition>> {
        let key = schema_key(name);
        let bytes = self
            .backend
            .get(&key)?
            .ok_or_else(|| Error::not_found(name))?;

        decode_schema(&bytes).map_err(|e| Error::corrupt(&key, e.to_string()))
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        //! Probe the schema key only.

        Ok(self.backend.get(&schema_key(name))?.is_some())
    }

    pub fn store_table_metadata(&self, name: &str, row_count: u64) -> Result<()> {
        debug!("storing row count {} for {}", row_count, name);
        self.backend.put(&meta_key(name), &encode_row_count(row_count))
    }

    pub fn stage_table_metadata(
        &self,
        txn: &mut Transaction,
        name: &str,
        row_count: u64,
    ) -> Result<()> {
        txn.put(&meta_key(name), &encode_row_count(row_count))
    }

    pub fn load_table_row_count(&self, name: &str) -> Result<u64> {
        //! Missing metadata reads as 0.

        let key = meta_key(name);
        match self.backend.get(&key)? {
            Some(bytes) => decode_row_count(&bytes).map_err(|e| Error::corrupt(&key, e.to_string())),
            None => Ok(0),
        }
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        //! Every table with a persisted schema, in key order.

        let mut names = Vec::new();
        self.backend
            .iterate_prefix(SCHEMA_PREFIX.as_bytes(), &mut |key: &[u8], _: &[u8]| {
                if let Some(name) = table_from_schema_key(key) {
                    names.push(name);
                }
                true
            })?;
        Ok(names)
    }
}
