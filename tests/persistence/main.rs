use std::sync::Arc;

use rucks_engine::persistence::{Catalog, ColumnDefinition, DataChunk, LogicalType, Row, Value};
use rucks_engine::storage::{KvBackend, MemoryBackend};

mod backend;
mod catalog;
mod codec;
mod functions;
mod registry;
mod transaction;

fn _memory_catalog(scan_batch_size: usize) -> (Arc<MemoryBackend>, Catalog) {
    let memory = Arc::new(MemoryBackend::new());
    let backend: Arc<dyn KvBackend> = memory.clone();
    (memory, Catalog::new(backend, scan_batch_size))
}

fn _id_name_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("id", LogicalType::Integer),
        ColumnDefinition::new("name", LogicalType::Varchar),
    ]
}

fn _id_name_chunk(values: &[(i64, &str)]) -> DataChunk {
    values
        .iter()
        .map(|(id, name)| Row(vec![Value::Integer(*id), Value::from(*name)]))
        .collect::<Vec<Row>>()
        .into()
}
