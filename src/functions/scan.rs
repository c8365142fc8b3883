//! The table function that streams a table's rows out to the SQL side.
//!
//! The calling convention follows the usual three phases:
//!
//! - [`bind`] resolves the table and reports its column names and types
//! - [`init_global`] and [`init_local`] create the per-query state
//! - [`execute`] is called repeatedly, each call returning the next batch, until
//!   it returns an empty batch

use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::persistence::{Catalog, DataChunk, LogicalType, ScanPhase, ScanState, Table};

pub const FUNCTION_NAME: &str = "rucks_scan";

pub struct BindData {
    pub table_name: String,
    pub types: Vec<LogicalType>,
    pub names: Vec<String>,
    table: Arc<Table>,
}

pub struct GlobalState {
    pub table_name: String,
    pub total_rows: u64,
}

/// Per-thread scan state. It stays in [`ScanPhase::Created`] until the first
/// [`execute`] call starts the scan.
pub struct LocalState {
    column_ids: Vec<usize>,
    scan: ScanState,
}

impl BindData {
    pub fn table(&self) -> Arc<Table> {
        Arc::clone(&self.table)
    }
}

impl LocalState {
    pub fn phase(&self) -> ScanPhase {
        self.scan.phase()
    }
}

pub fn bind(catalog: &Catalog, table_name: &str) -> Result<BindData> {
    //! Resolve `table_name` and describe its columns.
    //!
    //! Fails with [`crate::Error::NotFound`] if the table does not exist.

    let table = catalog.get_table(table_name)?;
    let schema = table.schema();

    Ok(BindData {
        table_name: table_name.to_string(),
        types: schema.types(),
        names: schema.names(),
        table,
    })
}

pub fn init_global(bind_data: &BindData) -> GlobalState {
    GlobalState {
        table_name: bind_data.table_name.clone(),
        total_rows: bind_data.table.row_count(),
    }
}

pub fn init_local(bind_data: &BindData, column_ids: &[usize]) -> LocalState {
    //! An empty `column_ids` selects every column in schema order.

    let column_ids = if column_ids.is_empty() {
        bind_data.table.schema().all_column_ids()
    } else {
        column_ids.to_vec()
    };

    LocalState {
        column_ids,
        scan: ScanState::new(),
    }
}

pub fn execute(bind_data: &BindData, local: &mut LocalState) -> Result<DataChunk> {
    //! Produce the next batch. An empty batch means the scan is over.

    if local.scan.phase() == ScanPhase::Created {
        bind_data
            .table
            .initialize_scan(&mut local.scan, &local.column_ids)?;
        debug!("{} started on {}", FUNCTION_NAME, bind_data.table_name);
    }

    bind_data.table.scan(&mut local.scan)
}
