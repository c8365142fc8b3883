//! Create a table from a name and a column list such as `id INTEGER, name VARCHAR`.

use log::{info, warn};

use crate::persistence::Catalog;

use super::schema_text::parse_column_list;

pub(super) const SCLR_NAME: &str = "CREATE_TABLE";

pub fn create_table(catalog: &Catalog, name: &str, schema_text: &str) -> bool {
    //! Returns `true` if the table was created. Any failure, an unparsable
    //! column list included, is logged and reported as `false`.

    let result = parse_column_list(schema_text)
        .and_then(|columns| catalog.create_table(name, columns));

    match result {
        Ok(_) => {
            info!("{}: created {}", SCLR_NAME, name);
            true
        }
        Err(error) => {
            warn!("{}: {} was not created: {}", SCLR_NAME, name, error);
            false
        }
    }
}

pub(super) fn run(catalog: &Catalog, args: &[String]) -> bool {
    match args {
        [name, schema_text] => create_table(catalog, name, schema_text),
        _ => {
            warn!("{}: expected 2 arguments, got {}", SCLR_NAME, args.len());
            false
        }
    }
}
