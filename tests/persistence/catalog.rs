use std::sync::Arc;

use rucks_engine::Error;
use rucks_engine::config::{BackendKind, EngineConfig};
use rucks_engine::persistence::{
    Catalog, ColumnDefinition, LogicalType, Projection, Row, RowStorage, ScanState, Schema, Value,
};
use rucks_engine::storage::KvBackend;

use super::{_id_name_chunk, _id_name_columns, _memory_catalog};

#[test]
fn catalog_create_table_twice_fails() {
    let (_, catalog) = _memory_catalog(2048);
    catalog.create_table("t", _id_name_columns()).unwrap();

    let result = catalog.create_table("t", _id_name_columns());
    assert!(matches!(result, Err(Error::AlreadyExists { table }) if table == "t"));
}

#[test]
fn catalog_create_table_rejects_bad_definitions() {
    let (_, catalog) = _memory_catalog(2048);

    assert!(catalog.create_table("", _id_name_columns()).is_err());
    assert!(catalog.create_table("t", vec![]).is_err());

    let duplicated = vec![
        ColumnDefinition::new("id", LogicalType::Integer),
        ColumnDefinition::new("id", LogicalType::Varchar),
    ];
    assert!(matches!(
        catalog.create_table("t", duplicated),
        Err(Error::InvalidDefinition(_))
    ));
    assert!(!catalog.table_exists("t").unwrap());
}

#[test]
fn catalog_drop_table_removes_everything() {
    let (memory, catalog) = _memory_catalog(2048);
    let table = catalog.create_table("t", _id_name_columns()).unwrap();
    table.append(&_id_name_chunk(&[(1, "a"), (2, "b")])).unwrap();

    catalog.drop_table("t").unwrap();

    assert!(!catalog.table_exists("t").unwrap());
    assert!(matches!(catalog.get_table("t"), Err(Error::NotFound { .. })));
    assert!(matches!(catalog.drop_table("t"), Err(Error::NotFound { .. })));
    assert!(memory.is_empty());
}

#[test]
fn catalog_handle_held_across_drop_cannot_touch_the_new_table() {
    let (memory, catalog) = _memory_catalog(2048);
    let stale = catalog.create_table("t", _id_name_columns()).unwrap();
    stale.append(&_id_name_chunk(&[(1, "a")])).unwrap();

    catalog.drop_table("t").unwrap();
    assert!(stale.is_dropped());

    let fresh = catalog.create_table("t", _id_name_columns()).unwrap();
    fresh
        .append(&_id_name_chunk(&[(10, "w"), (20, "x"), (30, "y"), (40, "z")]))
        .unwrap();

    let appended = stale.append(&_id_name_chunk(&[(99, "stale")]));
    assert!(matches!(appended, Err(Error::NotFound { table }) if table == "t"));
    assert!(matches!(stale.delete(&[0]), Err(Error::NotFound { .. })));
    assert!(matches!(stale.get_row(0), Err(Error::NotFound { .. })));
    let mut state = ScanState::new();
    assert!(matches!(
        stale.initialize_scan(&mut state, &[]),
        Err(Error::NotFound { .. })
    ));

    assert!(!fresh.is_dropped());
    assert_eq!(fresh.row_count(), 4);
    assert_eq!(
        fresh.get_row(2).unwrap(),
        Some(Row(vec![Value::Integer(30), Value::from("y")]))
    );

    let backend: Arc<dyn KvBackend> = memory;
    let reopened = Catalog::new(backend, 2048);
    let table = reopened.get_table("t").unwrap();
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.scan_all(&[]).unwrap().len(), 4);
}

#[test]
fn catalog_scan_started_before_drop_stops_with_not_found() {
    let (_, catalog) = _memory_catalog(1);
    let table = catalog.create_table("t", _id_name_columns()).unwrap();
    table.append(&_id_name_chunk(&[(1, "a"), (2, "b")])).unwrap();

    let mut state = ScanState::new();
    table.initialize_scan(&mut state, &[]).unwrap();
    assert_eq!(table.scan(&mut state).unwrap().len(), 1);

    catalog.drop_table("t").unwrap();
    assert!(matches!(table.scan(&mut state), Err(Error::NotFound { .. })));
}

#[test]
fn catalog_scan_rows_with_zero_capacity_still_advances() {
    let (_, catalog) = _memory_catalog(2048);
    let table = catalog.create_table("t", _id_name_columns()).unwrap();
    table.append(&_id_name_chunk(&[(1, "a"), (2, "b"), (3, "c")])).unwrap();

    let storage = RowStorage::new(&catalog.backend());
    let schema = Schema::new(_id_name_columns());
    let projection = Projection::all(&schema);

    let batch = storage.scan_rows("t", 0, 3, &projection, 0).unwrap();
    assert!(batch.next_row > 0);
    assert!(batch.chunk.len() <= 1);

    let mut next = batch.next_row;
    let mut seen = batch.chunk.len();
    while next < 3 {
        let batch = storage.scan_rows("t", next, 3 - next, &projection, 0).unwrap();
        assert!(batch.next_row > next);
        seen += batch.chunk.len();
        next = batch.next_row;
    }
    assert_eq!(seen, 3);
}

#[test]
fn catalog_drop_table_leaves_lookalike_tables_alone() {
    let (_, catalog) = _memory_catalog(2048);
    catalog
        .create_table("a", _id_name_columns())
        .unwrap()
        .append(&_id_name_chunk(&[(1, "a")]))
        .unwrap();
    catalog
        .create_table("a_row", _id_name_columns())
        .unwrap()
        .append(&_id_name_chunk(&[(2, "b")]))
        .unwrap();

    catalog.drop_table("a").unwrap();

    let survivor = catalog.get_table("a_row").unwrap();
    assert_eq!(
        survivor.scan_all(&[]).unwrap(),
        vec![Row(vec![Value::Integer(2), Value::from("b")])]
    );
}

#[test]
fn catalog_reopen_sees_persisted_tables() {
    let (memory, catalog) = _memory_catalog(2048);
    let table = catalog.create_table("t", _id_name_columns()).unwrap();
    table.append(&_id_name_chunk(&[(1, "a"), (2, "b")])).unwrap();
    drop(table);
    drop(catalog);

    let backend: Arc<dyn KvBackend> = memory;
    let reopened = Catalog::new(backend, 2048);

    assert!(reopened.open_tables().is_empty());
    assert_eq!(reopened.list_tables().unwrap(), vec!["t".to_string()]);
    assert!(reopened.table_exists("t").unwrap());

    let table = reopened.get_table("t").unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.schema().names(), vec!["id", "name"]);
    assert_eq!(reopened.open_tables(), vec!["t".to_string()]);

    assert_eq!(table.append(&_id_name_chunk(&[(3, "c")])).unwrap(), 2);
}

#[test]
fn catalog_list_tables_is_sorted_and_open_tables_keeps_open_order() {
    let (_, catalog) = _memory_catalog(2048);
    for name in ["zeta", "alpha", "mid"] {
        catalog.create_table(name, _id_name_columns()).unwrap();
    }

    assert_eq!(catalog.list_tables().unwrap(), vec!["alpha", "mid", "zeta"]);
    assert_eq!(catalog.open_tables(), vec!["zeta", "alpha", "mid"]);
}

#[test]
fn catalog_get_table_returns_the_same_handle() {
    let (_, catalog) = _memory_catalog(2048);
    let created = catalog.create_table("t", _id_name_columns()).unwrap();
    let fetched = catalog.get_table("t").unwrap();

    assert!(Arc::ptr_eq(&created, &fetched));
}

#[test]
fn catalog_corrupt_row_surfaces_during_scan() {
    let (memory, catalog) = _memory_catalog(2048);
    let table = catalog.create_table("t", _id_name_columns()).unwrap();
    table.append(&_id_name_chunk(&[(1, "a"), (2, "b")])).unwrap();

    let key = format!("data_t_row_{:020}", 1);
    memory.put(key.as_bytes(), b"2|INT:1|").unwrap();

    let result = table.scan_all(&[]);
    assert!(matches!(result, Err(Error::CorruptRecord { key: bad, .. }) if bad == key));
}

#[test]
fn catalog_over_sled_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        data_dir: dir.path().to_path_buf(),
        backend: BackendKind::Sled,
        ..EngineConfig::default()
    };

    {
        let catalog = Catalog::open(&config).unwrap();
        let table = catalog.create_table("t", _id_name_columns()).unwrap();
        table.append(&_id_name_chunk(&[(1, "a"), (2, "b")])).unwrap();
        table.delete(&[0]).unwrap();
        catalog.flush().unwrap();
    }

    let catalog = Catalog::open(&config).unwrap();
    assert_eq!(catalog.list_tables().unwrap(), vec!["t".to_string()]);

    let table = catalog.get_table("t").unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.scan_all(&[]).unwrap(),
        vec![Row(vec![Value::Integer(2), Value::from("b")])]
    );
}
