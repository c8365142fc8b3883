//! Tables over a key-value store need the following components
//! - Codec (rows, schemas and row counts to and from bytes)
//! - Schema Registry (schema and row count of every table, under reserved keys)
//! - Row Storage (one key per row, gap-tolerant scans over row id ranges)
//! - Table (schema, row count, append and the scan cursor)
//! - Catalog (the open tables, created and dropped through it)
//!

//  All modules of this lib
mod catalog;
pub mod codec;
mod keys;
mod registry;
mod row;
mod schema;
mod storage;
mod table;

//  External API
pub use catalog::Catalog;
pub use registry::SchemaRegistry;
pub use row::{DataChunk, Row, Value};
pub use schema::{ColumnDefinition, LogicalType, Schema};
pub use storage::{Projection, RowStorage, ScanBatch};
pub use table::{ScanPhase, ScanState, Table};
