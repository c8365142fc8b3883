//! Column lists written as SQL, e.g. `id INTEGER, name VARCHAR(50)`.
//!
//! The text is wrapped in a `CREATE TABLE` statement and handed to
//! [`sqlparser`], so anything the parser accepts as a column definition is
//! accepted here. Column options (NOT NULL, PRIMARY KEY, ...) are ignored;
//! tables do not support constraints.

use sqlparser::{
    ast::{ColumnDef, Statement},
    dialect::GenericDialect,
    parser::Parser,
};

use crate::error::{Error, Result};
use crate::persistence::{ColumnDefinition, LogicalType};

pub fn parse_column_list(schema_text: &str) -> Result<Vec<ColumnDefinition>> {
    //! Parse a comma separated column list.
    //!
    //! Returns [`Error::InvalidDefinition`] when the text is not exactly one
    //! column list.

    let sql = format!("CREATE TABLE columns ({})", schema_text);
    let statements = Parser::parse_sql(&GenericDialect {}, &sql)
        .map_err(|e| Error::InvalidDefinition(format!("cannot parse column list: {}", e)))?;

    match statements.as_slice() {
        [Statement::CreateTable(create_table)] => {
            Ok(create_table.columns.iter().map(column_definition).collect())
        }
        _ => Err(Error::InvalidDefinition(format!(
            "not a column list: {}",
            schema_text
        ))),
    }
}

pub fn column_definition(column: &ColumnDef) -> ColumnDefinition {
    //! Map a parsed column to the engine's column definition. Only the base
    //! type name matters; `VARCHAR(50)` and `VARCHAR` are the same column type.

    let type_name = column.data_type.to_string();
    let base_name = type_name
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    ColumnDefinition::new(&column.name.value, LogicalType::from_name(base_name))
}
