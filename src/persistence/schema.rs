use std::{collections::HashSet, fmt::Display};

use crate::error::{Error, Result};

/// The column types a table can declare.
///
/// Unknown type names fall back to [`LogicalType::Varchar`] when parsed, the
/// same way unknown value tags do in the row codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Integer,
    Float,
    Varchar,
    Boolean,
}

impl LogicalType {
    pub fn from_name(name: &str) -> LogicalType {
        //! Parse a type name, case-insensitively, accepting the usual SQL aliases.

        match name.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" | "TINYINT" => LogicalType::Integer,
            "FLOAT" | "DOUBLE" | "REAL" | "DECIMAL" | "NUMERIC" => LogicalType::Float,
            "BOOLEAN" | "BOOL" => LogicalType::Boolean,
            _ => LogicalType::Varchar,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::Integer => "INTEGER",
            LogicalType::Float => "FLOAT",
            LogicalType::Varchar => "VARCHAR",
            LogicalType::Boolean => "BOOLEAN",
        }
    }
}

impl Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub logical_type: LogicalType,
}

impl ColumnDefinition {
    pub fn new(name: &str, logical_type: LogicalType) -> ColumnDefinition {
        ColumnDefinition {
            name: name.to_string(),
            logical_type,
        }
    }
}

/// The ordered column list of a table. Fixed once the table is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema(Vec<ColumnDefinition>);

impl Schema {
    pub fn new(columns: Vec<ColumnDefinition>) -> Schema {
        Schema(columns)
    }

    pub fn get(&self, index: usize) -> Option<&ColumnDefinition> {
        //! Get the column definition at `index`.

        self.0.get(index)
    }

    pub fn get_vec(&self) -> &Vec<ColumnDefinition> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, column_name: &str) -> Option<usize> {
        self.0.iter().position(|col| col.name == column_name)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|col| col.name.clone()).collect()
    }

    pub fn types(&self) -> Vec<LogicalType> {
        self.0.iter().map(|col| col.logical_type).collect()
    }

    pub fn all_column_ids(&self) -> Vec<usize> {
        (0..self.0.len()).collect()
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schema: Vec<String> = self
            .0
            .iter()
            .map(|col| format!("{} ({})", col.name, col.logical_type))
            .collect();
        write!(f, "{}", schema.join(" | "))
    }
}

pub(crate) fn validate_table_name(name: &str) -> Result<()> {
    //! A table name ends up inside every key of the table, so it cannot be
    //! empty or carry control characters.

    if name.is_empty() {
        return Err(Error::InvalidDefinition(
            "table name cannot be empty".to_string(),
        ));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(Error::InvalidDefinition(format!(
            "table name {:?} contains control characters",
            name
        )));
    }

    Ok(())
}

pub(crate) fn validate_columns(columns: &[ColumnDefinition]) -> Result<()> {
    //! The schema record separates names from types with the first `:`, so a
    //! column name cannot contain one. `|` is kept out of names as well.

    if columns.is_empty() {
        return Err(Error::InvalidDefinition(
            "0 columns does not make a schema".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for column in columns {
        if column.name.is_empty() {
            return Err(Error::InvalidDefinition(
                "column name cannot be empty".to_string(),
            ));
        }
        if column.name.contains(['|', ':']) || column.name.chars().any(|c| c.is_control()) {
            return Err(Error::InvalidDefinition(format!(
                "column name {:?} contains a reserved character",
                column.name
            )));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(Error::InvalidDefinition(format!(
                "column {} is defined more than once",
                column.name
            )));
        }
    }

    Ok(())
}
