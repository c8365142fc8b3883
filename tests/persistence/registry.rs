use std::sync::Arc;

use rucks_engine::Error;
use rucks_engine::persistence::{ColumnDefinition, LogicalType, SchemaRegistry};
use rucks_engine::storage::{KvBackend, MemoryBackend};

use super::_id_name_columns;

fn _registry() -> (Arc<MemoryBackend>, SchemaRegistry) {
    let memory = Arc::new(MemoryBackend::new());
    let backend: Arc<dyn KvBackend> = memory.clone();
    (memory, SchemaRegistry::new(&backend))
}

#[test]
fn registry_create_then_read_schema() {
    let (_, registry) = _registry();
    registry.create_table("users", &_id_name_columns()).unwrap();

    assert!(registry.table_exists("users").unwrap());
    assert_eq!(registry.get_table_schema("users").unwrap(), _id_name_columns());
    assert_eq!(registry.load_table_row_count("users").unwrap(), 0);
}

#[test]
fn registry_column_names_keep_backslashes() {
    let (_, registry) = _registry();
    let columns = vec![
        ColumnDefinition::new(r"a\b", LogicalType::Integer),
        ColumnDefinition::new(r"c\", LogicalType::Varchar),
    ];
    registry.create_table("t", &columns).unwrap();

    let schema = registry.get_table_schema("t").unwrap();
    assert_eq!(schema, columns);
    assert_eq!(schema[0].name, r"a\b");
    assert_eq!(schema[1].name, r"c\");
}

#[test]
fn registry_create_existing_fails() {
    let (_, registry) = _registry();
    registry.create_table("users", &_id_name_columns()).unwrap();

    assert!(matches!(
        registry.create_table("users", &_id_name_columns()),
        Err(Error::AlreadyExists { .. })
    ));
}

#[test]
fn registry_missing_table() {
    let (_, registry) = _registry();

    assert!(!registry.table_exists("nope").unwrap());
    assert!(matches!(
        registry.get_table_schema("nope"),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(registry.drop_table("nope"), Err(Error::NotFound { .. })));
    assert_eq!(registry.load_table_row_count("nope").unwrap(), 0);
}

#[test]
fn registry_row_count_round_trips() {
    let (_, registry) = _registry();
    registry.create_table("users", &_id_name_columns()).unwrap();
    registry.store_table_metadata("users", 12_345).unwrap();

    assert_eq!(registry.load_table_row_count("users").unwrap(), 12_345);
}

#[test]
fn registry_corrupt_schema_is_reported() {
    let (memory, registry) = _registry();
    memory.put(b"schema_broken", b"2|id:INTEGER|").unwrap();

    assert!(matches!(
        registry.get_table_schema("broken"),
        Err(Error::CorruptRecord { key, .. }) if key == "schema_broken"
    ));
}

#[test]
fn registry_unknown_type_reads_as_varchar() {
    let (memory, registry) = _registry();
    memory.put(b"schema_legacy", b"1|when:TIMESTAMP|").unwrap();

    assert_eq!(
        registry.get_table_schema("legacy").unwrap(),
        vec![ColumnDefinition::new("when", LogicalType::Varchar)]
    );
}

#[test]
fn registry_lists_tables_in_key_order() {
    let (_, registry) = _registry();
    for name in ["b", "a", "a_row"] {
        registry.create_table(name, &_id_name_columns()).unwrap();
    }

    assert_eq!(registry.list_tables().unwrap(), vec!["a", "a_row", "b"]);
}
