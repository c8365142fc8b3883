use super::registry::SchemaRegistry;
use super::row::{DataChunk, Row, Value};
use super::schema::{ColumnDefinition, Schema};
use super::storage::{Projection, RowStorage};

use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::storage::{KvBackend, Transaction};

/// An open table: its schema, its row count and the way to its rows.
///
/// Row ids are handed out sequentially from the row count. Deleting rows leaves
/// gaps and never lowers the count, so the count is an upper bound on the ids
/// in use and not the number of live rows.
///
/// Every mutation holds the table's lock from reading the count to committing
/// the transaction that carries both the rows and the new count. Two appends
/// on the same table can therefore never hand out the same ids. Scans do not
/// take the lock.
pub struct Table {
    name: String,
    schema: Arc<Schema>,
    registry: SchemaRegistry,
    storage: RowStorage,
    backend: Arc<dyn KvBackend>,
    state: Mutex<TableState>,
    scan_batch_size: usize,
}

/// What the table's lock guards. A dropped handle refuses every operation,
/// so a caller holding it across a drop cannot write into a table that was
/// created again under the same name.
struct TableState {
    row_count: u64,
    dropped: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanPhase {
    Created,
    Scanning,
    Finished,
}

/// Progress of one scan over a table.
///
/// The range is fixed when the scan is initialized: rows appended afterwards
/// are not part of it, rows deleted afterwards are skipped.
#[derive(Debug)]
pub struct ScanState {
    phase: ScanPhase,
    current_row: u64,
    total_rows: u64,
    rows_returned: u64,
    projection: Option<Projection>,
}

impl ScanState {
    pub fn new() -> ScanState {
        ScanState {
            phase: ScanPhase::Created,
            current_row: 0,
            total_rows: 0,
            rows_returned: 0,
            projection: None,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == ScanPhase::Finished
    }

    pub fn current_row(&self) -> u64 {
        self.current_row
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn rows_returned(&self) -> u64 {
        self.rows_returned
    }

    pub fn column_ids(&self) -> &[usize] {
        self.projection
            .as_ref()
            .map(|p| p.column_ids())
            .unwrap_or(&[])
    }
}

impl Default for ScanState {
    fn default() -> Self {
        ScanState::new()
    }
}

impl Table {
    pub fn new(
        name: &str,
        registry: &SchemaRegistry,
        backend: &Arc<dyn KvBackend>,
        scan_batch_size: usize,
    ) -> Table {
        //! A handle with no columns yet; call [`Table::initialize`] before use.

        Table {
            name: name.to_string(),
            schema: Arc::new(Schema::new(vec![])),
            registry: registry.clone(),
            storage: RowStorage::new(backend),
            backend: Arc::clone(backend),
            state: Mutex::new(TableState {
                row_count: 0,
                dropped: false,
            }),
            scan_batch_size: scan_batch_size.max(1),
        }
    }

    pub fn initialize(&mut self, columns: Vec<ColumnDefinition>) -> Result<()> {
        //! Set the schema and load the persisted row count.

        let row_count = self.registry.load_table_row_count(&self.name)?;
        self.schema = Arc::new(Schema::new(columns));
        self.state.get_mut().unwrap_or_else(|e| e.into_inner()).row_count = row_count;

        debug!("initialized {} at row count {}", self.name, row_count);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        self.schema.get_vec()
    }

    pub fn row_count(&self) -> u64 {
        self.lock_state().row_count
    }

    pub fn is_dropped(&self) -> bool {
        self.lock_state().dropped
    }

    pub(crate) fn retire<F>(&self, drop_storage: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        //! Run `drop_storage` under the table's lock and mark the handle
        //! dropped once it succeeds. No mutation can slip in between.

        let mut live = self.lock_live()?;
        drop_storage()?;
        live.dropped = true;
        debug!("handle of {} retired", self.name);
        Ok(())
    }

    pub fn append(&self, chunk: &DataChunk) -> Result<u64> {
        //! Append the rows of `chunk` at the end of the table.
        //!
        //! Every row is checked against the schema first; one bad row rejects
        //! the whole chunk. Rows and the new count are committed together.
        //!
        //! Returns the row id given to the first row.

        let rows = chunk
            .rows()
            .iter()
            .map(|row| self.conform_row(row))
            .collect::<Result<Vec<Row>>>()?;

        let mut live = self.lock_live()?;
        let start_row = live.row_count;
        if rows.is_empty() {
            return Ok(start_row);
        }

        let new_count = start_row + rows.len() as u64;
        let mut txn = Transaction::begin(&self.backend);
        self.storage
            .stage_chunk(&mut txn, &self.name, start_row, &rows)?;
        self.registry
            .stage_table_metadata(&mut txn, &self.name, new_count)?;
        txn.commit()?;

        live.row_count = new_count;
        debug!(
            "appended {} row(s) to {}, row count now {}",
            rows.len(),
            self.name,
            new_count
        );
        Ok(start_row)
    }

    pub fn delete(&self, row_ids: &[u64]) -> Result<usize> {
        //! Delete the given rows. Ids that are out of range or already deleted
        //! are skipped.
        //!
        //! Returns the number of rows that were actually removed. The row count
        //! does not change.

        let live = self.lock_live()?;
        let projection = Projection::all(&self.schema);
        let mut txn = Transaction::begin(&self.backend);
        let mut deleted = 0;

        for &row_id in row_ids {
            if row_id >= live.row_count {
                continue;
            }
            if self
                .storage
                .read_row(&self.name, row_id, &projection)?
                .is_some()
            {
                self.storage.stage_delete_row(&mut txn, &self.name, row_id)?;
                deleted += 1;
            }
        }

        txn.commit()?;
        if deleted > 0 {
            info!("deleted {} row(s) from {}", deleted, self.name);
        }
        Ok(deleted)
    }

    pub fn update(
        &self,
        row_ids: &[u64],
        column_ids: &[usize],
        chunk: &DataChunk,
    ) -> Result<usize> {
        //! Overwrite the columns `column_ids` of the rows `row_ids`. The i-th row
        //! of `chunk` holds the new values for `row_ids[i]`, in `column_ids`
        //! order. Rows that are not stored are skipped.
        //!
        //! Returns the number of rows that were updated.

        if row_ids.len() != chunk.len() {
            return Err(Error::InvalidDefinition(format!(
                "{} row id(s) given for {} row(s) of values",
                row_ids.len(),
                chunk.len()
            )));
        }
        Projection::new(&self.schema, column_ids)?;

        let _live = self.lock_live()?;
        let projection = Projection::all(&self.schema);
        let mut txn = Transaction::begin(&self.backend);
        let mut updated = 0;

        for (&row_id, new_values) in row_ids.iter().zip(chunk.rows()) {
            if new_values.len() != column_ids.len() {
                return Err(Error::InvalidDefinition(format!(
                    "expected {} value(s) per row, got {}",
                    column_ids.len(),
                    new_values.len()
                )));
            }

            let Some(mut row) = self.storage.read_row(&self.name, row_id, &projection)? else {
                continue;
            };

            for (&column_id, value) in column_ids.iter().zip(new_values.0.iter()) {
                row.0[column_id] = self.conform_value(column_id, value)?;
            }

            self.storage.stage_row(&mut txn, &self.name, row_id, &row)?;
            updated += 1;
        }

        txn.commit()?;
        debug!("updated {} row(s) of {}", updated, self.name);
        Ok(updated)
    }

    pub fn get_row(&self, row_id: u64) -> Result<Option<Row>> {
        let _live = self.lock_live()?;
        self.storage
            .read_row(&self.name, row_id, &Projection::all(&self.schema))
    }

    pub fn initialize_scan(&self, state: &mut ScanState, column_ids: &[usize]) -> Result<()> {
        //! Start (or restart) `state` over the rows that exist right now. An
        //! empty `column_ids` selects every column in schema order.

        let projection = if column_ids.is_empty() {
            Projection::all(&self.schema)
        } else {
            Projection::new(&self.schema, column_ids)?
        };
        let total_rows = self.lock_live()?.row_count;

        state.projection = Some(projection);
        state.phase = ScanPhase::Scanning;
        state.current_row = 0;
        state.total_rows = total_rows;
        state.rows_returned = 0;

        debug!("scan of {} initialized over {} row id(s)", self.name, state.total_rows);
        Ok(())
    }

    pub fn scan(&self, state: &mut ScanState) -> Result<DataChunk> {
        //! Return the next batch of live rows.
        //!
        //! Windows made only of deleted rows are stepped over, so an empty chunk
        //! comes back only once the scan is finished.

        if state.phase == ScanPhase::Scanning && self.is_dropped() {
            return Err(Error::not_found(&self.name));
        }

        let projection = match (state.phase, state.projection.as_ref()) {
            (ScanPhase::Finished, _) => return Ok(DataChunk::new()),
            (ScanPhase::Scanning, Some(projection)) => projection.clone(),
            _ => {
                return Err(Error::InvalidDefinition(format!(
                    "scan of {} was not initialized",
                    self.name
                )));
            }
        };

        while state.current_row < state.total_rows {
            let window = (self.scan_batch_size as u64).min(state.total_rows - state.current_row);
            let batch = self.storage.scan_rows(
                &self.name,
                state.current_row,
                window,
                &projection,
                self.scan_batch_size,
            )?;

            state.current_row = batch.next_row;
            if !batch.chunk.is_empty() {
                if state.current_row >= state.total_rows {
                    state.phase = ScanPhase::Finished;
                }
                state.rows_returned += batch.chunk.len() as u64;
                return Ok(batch.chunk);
            }
        }

        state.phase = ScanPhase::Finished;
        Ok(DataChunk::new())
    }

    pub fn scan_all(&self, column_ids: &[usize]) -> Result<Vec<Row>> {
        //! Drain a fresh scan into a single vector.

        let mut state = ScanState::new();
        self.initialize_scan(&mut state, column_ids)?;

        let mut rows = Vec::new();
        loop {
            let chunk = self.scan(&mut state)?;
            if chunk.is_empty() {
                break;
            }
            rows.extend(chunk.into_rows());
        }
        Ok(rows)
    }

    fn conform_row(&self, row: &Row) -> Result<Row> {
        //! Check a row against the schema and cast every value to its column type.

        if row.len() != self.schema.len() {
            return Err(Error::InvalidValue {
                column: self.name.clone(),
                reason: format!(
                    "row has {} value(s), table has {} column(s)",
                    row.len(),
                    self.schema.len()
                ),
            });
        }

        row.0
            .iter()
            .enumerate()
            .map(|(column_id, value)| self.conform_value(column_id, value))
            .collect::<Result<Vec<Value>>>()
            .map(Row)
    }

    fn conform_value(&self, column_id: usize, value: &Value) -> Result<Value> {
        let column = self.schema.get(column_id).ok_or_else(|| {
            Error::InvalidDefinition(format!("column id {} is out of range", column_id))
        })?;

        value
            .cast_to(column.logical_type)
            .ok_or_else(|| Error::InvalidValue {
                column: column.name.clone(),
                reason: format!("{} is not compatible with {}", value, column.logical_type),
            })
    }

    // Plain values; a panic while holding the lock cannot tear them.
    fn lock_state(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_live(&self) -> Result<MutexGuard<'_, TableState>> {
        let state = self.lock_state();
        if state.dropped {
            return Err(Error::not_found(&self.name));
        }
        Ok(state)
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{} row id(s)]\n{}", self.name, self.row_count(), self.schema)
    }
}
