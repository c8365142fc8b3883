//! The reserved key layout.
//!
//! - `schema_<table>` holds the schema record
//! - `table_meta_<table>` holds the row count
//! - `data_<table>_row_<id>` holds one row, `<id>` zero-padded to 20 digits
//!
//! Zero padding makes byte order equal numeric order, so `row 2` sorts before
//! `row 10`. A row key is only recognised when exactly [`ROW_ID_WIDTH`] digits
//! follow the table's row prefix; rows of a table called `a_row_x` never match
//! the prefix of table `a`.

pub(crate) const SCHEMA_PREFIX: &str = "schema_";
pub(crate) const TABLE_META_PREFIX: &str = "table_meta_";
pub(crate) const DATA_PREFIX: &str = "data_";

/// Digits in `u64::MAX`.
pub(crate) const ROW_ID_WIDTH: usize = 20;

pub(crate) fn schema_key(table: &str) -> Vec<u8> {
    format!("{}{}", SCHEMA_PREFIX, table).into_bytes()
}

pub(crate) fn meta_key(table: &str) -> Vec<u8> {
    format!("{}{}", TABLE_META_PREFIX, table).into_bytes()
}

pub(crate) fn row_prefix(table: &str) -> Vec<u8> {
    format!("{}{}_row_", DATA_PREFIX, table).into_bytes()
}

pub(crate) fn row_key(table: &str, row_id: u64) -> Vec<u8> {
    format!("{}{}_row_{:0width$}", DATA_PREFIX, table, row_id, width = ROW_ID_WIDTH).into_bytes()
}

pub(crate) fn parse_row_key(table: &str, key: &[u8]) -> Option<u64> {
    //! Returns the row id if `key` is a row key of `table`.

    let prefix = row_prefix(table);
    let id = key.strip_prefix(prefix.as_slice())?;

    if id.len() != ROW_ID_WIDTH || !id.iter().all(u8::is_ascii_digit) {
        return None;
    }

    std::str::from_utf8(id).ok()?.parse().ok()
}

pub(crate) fn table_from_schema_key(key: &[u8]) -> Option<String> {
    let name = key.strip_prefix(SCHEMA_PREFIX.as_bytes())?;
    String::from_utf8(name.to_vec()).ok()
}
