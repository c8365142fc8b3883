use log::{info, warn};

use crate::persistence::Catalog;

pub(super) const SCLR_NAME: &str = "DROP_TABLE";

pub fn drop_table(catalog: &Catalog, name: &str) -> bool {
    //! Returns `true` if the table existed and was dropped.

    match catalog.drop_table(name) {
        Ok(()) => {
            info!("{}: dropped {}", SCLR_NAME, name);
            true
        }
        Err(error) => {
            warn!("{}: {} was not dropped: {}", SCLR_NAME, name, error);
            false
        }
    }
}

pub(super) fn run(catalog: &Catalog, args: &[String]) -> bool {
    match args {
        [name] => drop_table(catalog, name),
        _ => {
            warn!("{}: expected 1 argument, got {}", SCLR_NAME, args.len());
            false
        }
    }
}
