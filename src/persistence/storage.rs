use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::storage::{KvBackend, Transaction};

use super::codec::{decode_row, encode_row};
use super::keys::{parse_row_key, row_key, row_prefix};
use super::row::{DataChunk, Row};
use super::schema::{LogicalType, Schema};

/// Which columns a read returns, in which order, and what type each is cast to.
///
/// `width` is the column count every stored row of the table must have.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    column_ids: Vec<usize>,
    types: Vec<LogicalType>,
    width: usize,
}

impl Projection {
    pub fn new(schema: &Schema, column_ids: &[usize]) -> Result<Projection> {
        //! Build a projection of `column_ids` over `schema`.
        //!
        //! Fails if an id is not a column of the schema.

        let types = column_ids
            .iter()
            .map(|&id| {
                schema.get(id).map(|col| col.logical_type).ok_or_else(|| {
                    Error::InvalidDefinition(format!(
                        "column id {} is out of range for {} column(s)",
                        id,
                        schema.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Projection {
            column_ids: column_ids.to_vec(),
            types,
            width: schema.len(),
        })
    }

    pub fn all(schema: &Schema) -> Projection {
        Projection {
            column_ids: schema.all_column_ids(),
            types: schema.types(),
            width: schema.len(),
        }
    }

    pub fn column_ids(&self) -> &[usize] {
        &self.column_ids
    }
}

/// The outcome of one [`RowStorage::scan_rows`] call.
///
/// `next_row` is the first row id that was NOT probed. It moves past deleted
/// ids even when `chunk` comes back empty, so callers advance by `next_row`
/// and never by the number of rows read.
#[derive(Debug)]
pub struct ScanBatch {
    pub chunk: DataChunk,
    pub next_row: u64,
}

/// Row-level access to a table's data keys.
///
/// A missing row is reported as [`None`], not as an error; scans step over the
/// gaps that deletions leave behind. A row that exists but does not decode is
/// always an error.
#[derive(Clone)]
pub struct RowStorage {
    backend: Arc<dyn KvBackend>,
}

impl RowStorage {
    pub fn new(backend: &Arc<dyn KvBackend>) -> RowStorage {
        RowStorage {
            backend: Arc::clone(backend),
        }
    }

    pub fn write_row(&self, table: &str, row_id: u64, row: &Row) -> Result<()> {
        //! Overwrite whatever is stored at `row_id`.

        self.backend.put(&row_key(table, row_id), &encode_row(&row.0))
    }

    pub fn read_row(
        &self,
        table: &str,
        row_id: u64,
        projection: &Projection,
    ) -> Result<Option<Row>> {
        //! Read one row and keep only the projected columns.
        //!
        //! Returns [`None`] when no row is stored at `row_id`.

        let key = row_key(table, row_id);
        let Some(bytes) = self.backend.get(&key)? else {
            return Ok(None);
        };

        let values = decode_row(&bytes).map_err(|e| Error::corrupt(&key, e.to_string()))?;
        if values.len() != projection.width {
            return Err(Error::corrupt(
                &key,
                format!(
                    "row has {} column(s), the table has {}",
                    values.len(),
                    projection.width
                ),
            ));
        }

        let mut projected = Vec::with_capacity(projection.column_ids.len());
        for (&column_id, &logical_type) in projection.column_ids.iter().zip(&projection.types) {
            let value = &values[column_id];
            let cast = value.cast_to(logical_type).ok_or_else(|| {
                Error::corrupt(
                    &key,
                    format!("value {} of column {} is not a {}", value, column_id, logical_type),
                )
            })?;
            projected.push(cast);
        }

        Ok(Some(Row(projected)))
    }

    pub fn delete_row(&self, table: &str, row_id: u64) -> Result<()> {
        //! Deleting a row that is not there does nothing.

        self.backend.delete(&row_key(table, row_id))
    }

    pub fn write_chunk(&self, table: &str, start_row: u64, rows: &[Row]) -> Result<()> {
        //! Write `rows[i]` at `start_row + i`, one put at a time.
        //!
        //! Not atomic; a failure part way leaves the earlier rows written. Use
        //! [`RowStorage::stage_chunk`] inside a transaction when that matters.

        for (offset, row) in rows.iter().enumerate() {
            self.write_row(table, start_row + offset as u64, row)?;
        }
        debug!("wrote {} row(s) to {} from row {}", rows.len(), table, start_row);
        Ok(())
    }

    pub fn stage_row(&self, txn: &mut Transaction, table: &str, row_id: u64, row: &Row) -> Result<()> {
        txn.put(&row_key(table, row_id), &encode_row(&row.0))
    }

    pub fn stage_delete_row(&self, txn: &mut Transaction, table: &str, row_id: u64) -> Result<()> {
        txn.delete(&row_key(table, row_id))
    }

    pub fn stage_chunk(
        &self,
        txn: &mut Transaction,
        table: &str,
        start_row: u64,
        rows: &[Row],
    ) -> Result<()> {
        for (offset, row) in rows.iter().enumerate() {
            self.stage_row(txn, table, start_row + offset as u64, row)?;
        }
        Ok(())
    }

    pub fn read_chunk(
        &self,
        table: &str,
        start_row: u64,
        max_count: u64,
        projection: &Projection,
    ) -> Result<DataChunk> {
        //! Read every stored row in `[start_row, start_row + max_count)`.

        let mut chunk = DataChunk::new();
        for row_id in start_row..start_row.saturating_add(max_count) {
            if let Some(row) = self.read_row(table, row_id, projection)? {
                chunk.push(row);
            }
        }
        Ok(chunk)
    }

    pub fn scan_rows(
        &self,
        table: &str,
        start_row: u64,
        max_count: u64,
        projection: &Projection,
        capacity: usize,
    ) -> Result<ScanBatch> {
        //! Probe up to `max_count` row ids from `start_row`, skipping deleted ones,
        //! and stop early once `capacity` rows were read. A `capacity` of 0 is
        //! read as 1 so `next_row` always moves past a non-empty window.

        let capacity = capacity.max(1);
        let end = start_row.saturating_add(max_count);
        let mut chunk = DataChunk::with_capacity(capacity.min(max_count as usize));
        let mut row_id = start_row;

        while row_id < end && chunk.len() < capacity {
            if let Some(row) = self.read_row(table, row_id, projection)? {
                chunk.push(row);
            }
            row_id += 1;
        }

        debug!(
            "scanned {} ids of {} from row {}, {} live",
            row_id - start_row,
            table,
            start_row,
            chunk.len()
        );

        Ok(ScanBatch {
            chunk,
            next_row: row_id,
        })
    }

    pub fn stage_drop_rows(&self, txn: &mut Transaction, table: &str) -> Result<usize> {
        //! Stage the deletion of every row key that belongs to `table`.
        //!
        //! Returns the number of rows staged.

        let mut keys = Vec::new();
        self.backend
            .iterate_prefix(&row_prefix(table), &mut |key: &[u8], _: &[u8]| {
                if parse_row_key(table, key).is_some() {
                    keys.push(key.to_vec());
                }
                true
            })?;

        for key in keys.iter() {
            txn.delete(key)?;
        }
        Ok(keys.len())
    }

    pub fn stored_row_ids(&self, table: &str) -> Result<Vec<u64>> {
        //! Every row id that currently has a stored row, in ascending order.

        let mut ids = Vec::new();
        self.backend
            .iterate_prefix(&row_prefix(table), &mut |key: &[u8], _: &[u8]| {
                if let Some(id) = parse_row_key(table, key) {
                    ids.push(id);
                }
                true
            })?;
        Ok(ids)
    }
}
