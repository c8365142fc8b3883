//! This module where all the commands are stored.
//!
//! Rucks command line syntax:
//!
//! - rucks --help | Command Line Help
//! - rucks client | Run the REPL.
//! - rucks tables | Print every persisted table.
//!
//! Once the user is inside the REPL, the SQL parser takes over. These are the
//! statements the executor understands.
//!
//! - CREATE TABLE [IF NOT EXISTS] table (schema*);
//! - DROP TABLE [IF EXISTS] table;
//! - INSERT INTO table [(cols*)] VALUES (values)*;
//! - SELECT * | cols* FROM table;
//! - SELECT create_table('table', 'schema*') | drop_table('table');
//! - DELETE FROM table [WHERE rowid = n | rowid IN (n*)];
//! - SHOW TABLES;
//!
//! Here * means more than one such values separated by a comma.

use std::fmt::Display;
use std::sync::{Arc, RwLock};

use colored::Colorize;
use sqlparser::ast::{
    BinaryOperator, Expr, FromTable, Function, FunctionArg, FunctionArgExpr, FunctionArguments,
    ObjectName, ObjectType, SelectItem, SetExpr, Statement, TableFactor, TableObject,
    TableWithJoins, UnaryOperator, Value as SqlValue, ValueWithSpan,
};

use crate::cli::colors::RUCKS_SLATE;
use crate::cli::messages::{error_message, highlight_argument, system_message};
use crate::error::Result as EngineResult;
use crate::functions::scalars::{self, schema_text};
use crate::functions::scan;
use crate::persistence::{Catalog, DataChunk, Row, Value};
use crate::sessions::session::Session;

/// The pseudo column DELETE can filter on. It is the storage row id, not a
/// column of the table.
const ROW_ID_COLUMN: &str = "rowid";

/// The executor class that runs the statements.
///
/// Every statement needs an executor to be run. The executor only talks to
/// the catalog of the session; all locking happens below it, inside the
/// catalog and the tables.
pub struct SqlExecutor {
    statement: Statement,
    session: Arc<RwLock<Session>>,
}

/// The rows a statement produced, with the names of their columns.
pub struct ResultSet {
    pub names: Vec<String>,
    pub rows: Vec<Row>,
}

/// What the REPL prints after a statement completes.
pub struct SqlResult {
    pub table: Option<ResultSet>,
    pub n_rows_processed: Option<usize>,
}

impl SqlResult {
    fn processed(n_rows: usize) -> SqlResult {
        SqlResult {
            table: None,
            n_rows_processed: Some(n_rows),
        }
    }
}

impl Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.names.join(" | ").color(RUCKS_SLATE).bold())?;
        for row in self.rows.iter() {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

fn engine<T>(result: EngineResult<T>) -> Result<T, String> {
    result.map_err(|error| error_message(&error))
}

impl SqlExecutor {
    pub fn new(statement: Statement, session: &Arc<RwLock<Session>>) -> SqlExecutor {
        SqlExecutor {
            statement,
            session: Arc::clone(session),
        }
    }

    fn _catalog(&self) -> Arc<Catalog> {
        let session = self.session.read().unwrap_or_else(|e| e.into_inner());
        session.catalog()
    }

    fn _parse_object_name(&self, obj_name: &ObjectName) -> String {
        obj_name
            .0
            .iter()
            .filter_map(|part| part.as_ident())
            .map(|ident| ident.value.clone())
            .collect::<Vec<_>>()
            .join(".")
    }

    fn _extract_table_name(&self, table_with_joins: &TableWithJoins) -> Result<String, String> {
        match &table_with_joins.relation {
            TableFactor::Table { name, .. } => Ok(self._parse_object_name(name)),
            _ => Err(system_message(
                "exctr",
                "Invalid table name format.".to_string(),
            )),
        }
    }

    fn _parse_expr(&self, expr: &Expr) -> Result<Value, String> {
        //! Turn a literal expression into an engine [`Value`].

        match expr {
            Expr::Value(value) => self._parse_value(value),
            Expr::UnaryOp {
                op: UnaryOperator::Minus,
                expr,
            } => match self._parse_expr(expr)? {
                Value::Integer(v) => Ok(Value::Integer(-v)),
                Value::Float(v) => Ok(Value::Float(-v)),
                other => Err(system_message(
                    "exctr",
                    format!("Cannot negate {}.", highlight_argument(&other.to_string())),
                )),
            },
            _ => Err(system_message(
                "exctr",
                format!(
                    "Unsupported value: {}",
                    highlight_argument(&expr.to_string())
                ),
            )),
        }
    }

    fn _parse_value(&self, value: &ValueWithSpan) -> Result<Value, String> {
        //! Integers stay integers; any other number is read as a float.

        match &value.value {
            SqlValue::Number(number, _) => number
                .parse::<i64>()
                .map(Value::Integer)
                .or_else(|_| number.parse::<f64>().map(Value::Float))
                .map_err(|_| {
                    system_message("exctr", format!("Invalid number {}.", highlight_argument(number)))
                }),
            SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => {
                Ok(Value::Text(s.clone()))
            }
            SqlValue::Boolean(b) => Ok(Value::Boolean(*b)),
            SqlValue::Null => Ok(Value::Null),
            _ => Err(system_message(
                "exctr",
                format!(
                    "Unsupported value: {}",
                    highlight_argument(&value.to_string())
                ),
            )),
        }
    }

    fn _parse_row_id(&self, expr: &Expr) -> Result<u64, String> {
        match self._parse_expr(expr)? {
            Value::Integer(id) if id >= 0 => Ok(id as u64),
            other => Err(system_message(
                "exctr",
                format!(
                    "A {} must be a non-negative integer, got {}.",
                    ROW_ID_COLUMN,
                    highlight_argument(&other.to_string())
                ),
            )),
        }
    }

    fn _parse_row_id_filter(&self, selection: &Expr) -> Result<Vec<u64>, String> {
        //! Accepts `rowid = n` and `rowid IN (n, ...)` only.

        let is_row_id = |expr: &Expr| matches!(expr, Expr::Identifier(ident) if ident.value.eq_ignore_ascii_case(ROW_ID_COLUMN));

        match selection {
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } if is_row_id(left) => Ok(vec![self._parse_row_id(right)?]),
            Expr::InList {
                expr,
                list,
                negated: false,
            } if is_row_id(expr) => list.iter().map(|item| self._parse_row_id(item)).collect(),
            _ => Err(system_message(
                "exctr",
                format!(
                    "Only {} and {} filters are supported.",
                    highlight_argument("rowid = n"),
                    highlight_argument("rowid IN (n, ...)")
                ),
            )),
        }
    }

    fn _extract_scalar_call(&self, func: &Function) -> Result<(String, Vec<String>), String> {
        //! Pull the name and the string arguments out of a scalar call like
        //! `create_table('t', 'id INTEGER')`.

        let name = self._parse_object_name(&func.name);
        let args = match &func.args {
            FunctionArguments::List(list) => list
                .args
                .iter()
                .map(|arg| match arg {
                    FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => {
                        self._parse_expr(expr).map(|value| value.to_string())
                    }
                    _ => Err(system_message(
                        "exctr",
                        "Only plain arguments are supported.".to_string(),
                    )),
                })
                .collect::<Result<Vec<String>, String>>()?,
            FunctionArguments::None => vec![],
            _ => {
                return Err(system_message(
                    "exctr",
                    "Invalid type of function arguments. Check your query.".to_string(),
                ));
            }
        };

        Ok((name, args))
    }

    fn _run_scalar(&self, func: &Function) -> Result<SqlResult, String> {
        let (name, args) = self._extract_scalar_call(func)?;
        if !scalars::is_allowed(&name) {
            return Err(system_message(
                "exctr",
                format!("The function {} is not an allowed scalar.", highlight_argument(&name)),
            ));
        }

        let runner = engine(scalars::get_runner(&name))?;
        let passed = runner(&self._catalog(), &args);

        Ok(SqlResult {
            table: Some(ResultSet {
                names: vec![name.to_lowercase()],
                rows: vec![Row(vec![Value::Boolean(passed)])],
            }),
            n_rows_processed: Some(1),
        })
    }

    fn _select(&self, select: &sqlparser::ast::Select) -> Result<SqlResult, String> {
        //! A SELECT without FROM may call a scalar; a SELECT with FROM scans one
        //! table through the table function.

        let Some(table_with_joins) = select.from.first() else {
            return match select.projection.as_slice() {
                [SelectItem::UnnamedExpr(Expr::Function(func))] => self._run_scalar(func),
                _ => Err(system_message(
                    "exctr",
                    "There is no table name after FROM keyword.".to_string(),
                )),
            };
        };

        if select.selection.is_some() {
            return Err(system_message(
                "exctr",
                "WHERE is not supported for SELECT yet.".to_string(),
            ));
        }

        let table_name = self._extract_table_name(table_with_joins)?;
        let catalog = self._catalog();
        let bind_data = engine(scan::bind(&catalog, &table_name))?;

        let mut column_ids = vec![];
        for item in select.projection.iter() {
            match item {
                SelectItem::Wildcard(_) => column_ids.extend(0..bind_data.names.len()),
                SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                    let id = bind_data
                        .names
                        .iter()
                        .position(|name| *name == ident.value)
                        .ok_or_else(|| {
                            system_message(
                                "exctr",
                                format!(
                                    "Column {} does not exist in {}.",
                                    highlight_argument(&ident.value),
                                    highlight_argument(&table_name)
                                ),
                            )
                        })?;
                    column_ids.push(id);
                }
                _ => {
                    return Err(system_message(
                        "exctr",
                        "Only column names and * can be selected.".to_string(),
                    ));
                }
            }
        }

        let names = column_ids
            .iter()
            .map(|&id| bind_data.names[id].clone())
            .collect();

        let _global = scan::init_global(&bind_data);
        let mut local = scan::init_local(&bind_data, &column_ids);
        let mut rows = vec![];
        loop {
            let chunk: DataChunk = engine(scan::execute(&bind_data, &mut local))?;
            if chunk.is_empty() {
                break;
            }
            rows.extend(chunk.into_rows());
        }

        let n_rows = rows.len();
        Ok(SqlResult {
            table: Some(ResultSet { names, rows }),
            n_rows_processed: Some(n_rows),
        })
    }

    pub fn execute(&self) -> Result<SqlResult, String> {
        //! Run the assigned statement and return what should be displayed.

        match &self.statement {
            Statement::Query(query) => match query.body.as_ref() {
                SetExpr::Select(select) => self._select(select),
                _ => Err(system_message(
                    "exctr",
                    "This type of query is not handled by the engine yet!".to_string(),
                )),
            },
            Statement::CreateTable(create_table) => {
                let table_name = self._parse_object_name(&create_table.name);
                let columns = create_table
                    .columns
                    .iter()
                    .map(schema_text::column_definition)
                    .collect();

                let catalog = self._catalog();
                if create_table.if_not_exists && engine(catalog.table_exists(&table_name))? {
                    return Ok(SqlResult::processed(0));
                }

                engine(catalog.create_table(&table_name, columns))?;
                Ok(SqlResult::processed(0))
            }
            Statement::Drop {
                object_type,
                if_exists,
                names,
                ..
            } => {
                if *object_type != ObjectType::Table {
                    return Err(system_message(
                        "system",
                        format!(
                            "No other case than {} is handled yet.",
                            highlight_argument("DROP TABLE <table_name>")
                        ),
                    ));
                }

                let catalog = self._catalog();
                let mut dropped = 0;
                for name in names.iter() {
                    let table_name = self._parse_object_name(name);
                    if *if_exists && !engine(catalog.table_exists(&table_name))? {
                        continue;
                    }
                    engine(catalog.drop_table(&table_name))?;
                    dropped += 1;
                }

                Ok(SqlResult::processed(dropped))
            }
            Statement::Insert(insert) => {
                let table_name = match &insert.table {
                    TableObject::TableName(obj) => self._parse_object_name(obj),
                    _ => return Err("Invalid table name. Please check your query.".to_string()),
                };

                let catalog = self._catalog();
                let table = engine(catalog.get_table(&table_name))?;
                let schema = table.schema();

                // Columns left out of an explicit column list are stored as NULL.
                let positions: Vec<usize> = if insert.columns.is_empty() {
                    schema.all_column_ids()
                } else {
                    insert
                        .columns
                        .iter()
                        .map(|column| {
                            let column_name = column.value.clone();
                            schema.position(&column_name).ok_or_else(|| {
                                system_message(
                                    "exctr",
                                    format!(
                                        "Column {} does not exist in {}.",
                                        highlight_argument(&column_name),
                                        highlight_argument(&table_name)
                                    ),
                                )
                            })
                        })
                        .collect::<Result<_, String>>()?
                };

                let query_body = insert.source.as_ref().ok_or_else(|| {
                    system_message("system", "No values to insert.".to_string())
                })?;
                let query_rows = match query_body.body.as_ref() {
                    SetExpr::Values(values) => &values.rows,
                    _ => {
                        return Err("Invalid values list. Please check your query.".to_string());
                    }
                };

                let mut chunk = DataChunk::with_capacity(query_rows.len());
                for query_row in query_rows.iter() {
                    if query_row.len() != positions.len() {
                        return Err(system_message(
                            "exctr",
                            format!(
                                "Expected {} value(s) per row, got {}.",
                                positions.len(),
                                query_row.len()
                            ),
                        ));
                    }

                    let mut values = vec![Value::Null; schema.len()];
                    for (&position, expr) in positions.iter().zip(query_row.iter()) {
                        values[position] = self._parse_expr(expr)?;
                    }
                    chunk.push(Row(values));
                }

                engine(table.append(&chunk))?;
                Ok(SqlResult::processed(chunk.len()))
            }
            Statement::Delete(delete) => {
                let joins = match &delete.from {
                    FromTable::WithFromKeyword(joins) => joins,
                    _ => return Err("Invalid DELETE statement.".to_string()),
                };
                let table_with_joins = joins.first().ok_or_else(|| {
                    system_message(
                        "exctr",
                        "There is no table name after FROM keyword.".to_string(),
                    )
                })?;
                let table_name = self._extract_table_name(table_with_joins)?;

                let catalog = self._catalog();
                let table = engine(catalog.get_table(&table_name))?;
                let row_ids: Vec<u64> = match delete.selection.as_ref() {
                    Some(selection) => self._parse_row_id_filter(selection)?,
                    None => (0..table.row_count()).collect(),
                };

                let deleted = engine(table.delete(&row_ids))?;
                Ok(SqlResult::processed(deleted))
            }
            Statement::ShowTables { .. } => {
                let catalog = self._catalog();
                let table_names = engine(catalog.list_tables())?;

                Ok(SqlResult {
                    n_rows_processed: Some(table_names.len()),
                    table: Some(ResultSet {
                        names: vec!["table".to_string()],
                        rows: table_names
                            .into_iter()
                            .map(|name| Row(vec![Value::Text(name)]))
                            .collect(),
                    }),
                })
            }
            _ => Err(system_message(
                "exctr",
                "This statement is not handled by the engine yet!".to_string(),
            )),
        }
    }
}
