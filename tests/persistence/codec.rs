use rucks_engine::persistence::codec::{decode_row, decode_row_count, decode_schema};
use rucks_engine::persistence::{ColumnDefinition, DataChunk, LogicalType, Row, Value};
use rucks_engine::storage::KvBackend;

use super::_memory_catalog;

#[test]
fn codec_append_writes_the_documented_layout() {
    let (memory, catalog) = _memory_catalog(2048);
    let columns = vec![
        ColumnDefinition::new("id", LogicalType::Integer),
        ColumnDefinition::new("name", LogicalType::Varchar),
        ColumnDefinition::new("score", LogicalType::Float),
    ];
    let table = catalog.create_table("t", columns.clone()).unwrap();

    let chunk: DataChunk = vec![Row(vec![
        Value::Integer(7),
        Value::from("a|b"),
        Value::Null,
    ])]
    .into();
    table.append(&chunk).unwrap();

    let schema = memory.get(b"schema_t").unwrap().unwrap();
    assert_eq!(schema, b"3|id:INTEGER|name:VARCHAR|score:FLOAT|".to_vec());
    assert_eq!(decode_schema(&schema).unwrap(), columns);

    let count = memory.get(b"table_meta_t").unwrap().unwrap();
    assert_eq!(decode_row_count(&count).unwrap(), 1);

    let row = memory
        .get(b"data_t_row_00000000000000000000")
        .unwrap()
        .unwrap();
    assert_eq!(row, b"3|INT:7|VARCHAR:a\\|b|NULL|".to_vec());
    assert_eq!(
        decode_row(&row).unwrap(),
        vec![Value::Integer(7), Value::from("a|b"), Value::Null]
    );
}

#[test]
fn codec_boolean_columns_come_back_as_booleans() {
    let (memory, catalog) = _memory_catalog(2048);
    let table = catalog
        .create_table("flags", vec![ColumnDefinition::new("ok", LogicalType::Boolean)])
        .unwrap();

    let chunk: DataChunk = vec![Row(vec![Value::Boolean(true)])].into();
    table.append(&chunk).unwrap();

    let stored = memory
        .get(b"data_flags_row_00000000000000000000")
        .unwrap()
        .unwrap();
    assert_eq!(stored, b"1|VARCHAR:true|".to_vec());
    assert_eq!(
        table.scan_all(&[]).unwrap(),
        vec![Row(vec![Value::Boolean(true)])]
    );
}

#[test]
fn codec_floats_keep_their_bits_through_storage() {
    let (_, catalog) = _memory_catalog(2048);
    let table = catalog
        .create_table("f", vec![ColumnDefinition::new("x", LogicalType::Float)])
        .unwrap();

    let values = [0.1_f64, -2.5e-300, f64::MAX, 1.0 / 3.0];
    let chunk: DataChunk = values
        .iter()
        .map(|v| Row(vec![Value::Float(*v)]))
        .collect::<Vec<Row>>()
        .into();
    table.append(&chunk).unwrap();

    let stored: Vec<u64> = table
        .scan_all(&[])
        .unwrap()
        .into_iter()
        .map(|row| match row.0[0] {
            Value::Float(v) => v.to_bits(),
            ref other => panic!("expected a float, got {:?}", other),
        })
        .collect();
    let expected: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();

    assert_eq!(stored, expected);
}
