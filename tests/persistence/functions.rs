use rucks_engine::Error;
use rucks_engine::functions::{scalars, scan};
use rucks_engine::persistence::{LogicalType, Row, ScanPhase, Value};

use super::{_id_name_chunk, _id_name_columns, _memory_catalog};

#[test]
fn functions_scan_binds_and_streams_batches() {
    let (_, catalog) = _memory_catalog(2);
    let table = catalog.create_table("t", _id_name_columns()).unwrap();
    table
        .append(&_id_name_chunk(&[(1, "a"), (2, "b"), (3, "c")]))
        .unwrap();

    let bind_data = scan::bind(&catalog, "t").unwrap();
    assert_eq!(bind_data.names, vec!["id", "name"]);
    assert_eq!(
        bind_data.types,
        vec![LogicalType::Integer, LogicalType::Varchar]
    );

    let global = scan::init_global(&bind_data);
    assert_eq!(global.total_rows, 3);

    let mut local = scan::init_local(&bind_data, &[1]);
    assert_eq!(local.phase(), ScanPhase::Created);

    let first = scan::execute(&bind_data, &mut local).unwrap();
    assert_eq!(first.len(), 2);
    let second = scan::execute(&bind_data, &mut local).unwrap();
    assert_eq!(second.rows(), &[Row(vec![Value::from("c")])]);
    assert!(scan::execute(&bind_data, &mut local).unwrap().is_empty());
    assert_eq!(local.phase(), ScanPhase::Finished);
}

#[test]
fn functions_scan_empty_projection_means_every_column() {
    let (_, catalog) = _memory_catalog(2048);
    catalog
        .create_table("t", _id_name_columns())
        .unwrap()
        .append(&_id_name_chunk(&[(1, "a")]))
        .unwrap();

    let bind_data = scan::bind(&catalog, "t").unwrap();
    let mut local = scan::init_local(&bind_data, &[]);

    let chunk = scan::execute(&bind_data, &mut local).unwrap();
    assert_eq!(
        chunk.rows(),
        &[Row(vec![Value::Integer(1), Value::from("a")])]
    );
}

#[test]
fn functions_scan_bind_unknown_table() {
    let (_, catalog) = _memory_catalog(2048);

    assert!(matches!(
        scan::bind(&catalog, "ghost"),
        Err(Error::NotFound { table }) if table == "ghost"
    ));
}

#[test]
fn functions_create_table_scalar() {
    let (_, catalog) = _memory_catalog(2048);

    assert!(scalars::create_table(&catalog, "t", "id INTEGER, name VARCHAR(20)"));
    assert!(catalog.table_exists("t").unwrap());
    assert_eq!(
        catalog.get_table("t").unwrap().columns(),
        _id_name_columns().as_slice()
    );

    // Already there, and a column list that does not parse.
    assert!(!scalars::create_table(&catalog, "t", "id INTEGER"));
    assert!(!scalars::create_table(&catalog, "u", "id INTEGER,,"));
    assert!(!catalog.table_exists("u").unwrap());
}

#[test]
fn functions_drop_table_scalar() {
    let (_, catalog) = _memory_catalog(2048);
    catalog.create_table("t", _id_name_columns()).unwrap();

    assert!(scalars::drop_table(&catalog, "t"));
    assert!(!scalars::drop_table(&catalog, "t"));
    assert!(!catalog.table_exists("t").unwrap());
}

#[test]
fn functions_scalar_resolver() {
    let (_, catalog) = _memory_catalog(2048);

    assert!(scalars::is_allowed("create_table"));
    assert!(!scalars::is_allowed("truncate"));
    assert!(scalars::get_runner("explode").is_err());

    let create = scalars::get_runner("create_table").unwrap();
    assert!(create(&catalog, &["t".to_string(), "id INTEGER".to_string()]));
    assert!(!create(&catalog, &["only_a_name".to_string()]));

    let drop = scalars::get_runner("DROP_TABLE").unwrap();
    assert!(drop(&catalog, &["t".to_string()]));
}
