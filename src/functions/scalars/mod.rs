use crate::error::{Error, Result};
use crate::persistence::Catalog;

mod create_table;
mod drop_table;
pub mod schema_text;

pub use create_table::create_table;
pub use drop_table::drop_table;

const ALLOWED_SCALARS: [&str; 2] = [create_table::SCLR_NAME, drop_table::SCLR_NAME];

/// Every scalar takes the catalog and its string arguments, and answers with
/// pass or fail.
pub type ScalarRunner = fn(&Catalog, &[String]) -> bool;

/// A central method that works as a registry for all scalars.
///
/// To add one, simply add another match arm.
///
/// Get the pointer to the function, to call it later.
pub fn get_runner(name: &str) -> Result<ScalarRunner> {
    match name.to_uppercase().as_str() {
        create_table::SCLR_NAME => Ok(create_table::run),
        drop_table::SCLR_NAME => Ok(drop_table::run),
        _ => Err(Error::InvalidDefinition(format!(
            "unknown scalar function: {}",
            name
        ))),
    }
}

pub fn is_allowed(name: &str) -> bool {
    ALLOWED_SCALARS.contains(&name.to_uppercase().as_str())
}
