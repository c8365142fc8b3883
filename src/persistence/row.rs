use std::fmt::Display;

use super::schema::LogicalType;

/// A single cell.
///
/// Types the codec has no tag for are carried as their text and tagged as
/// `VARCHAR` on disk; [`Value::cast_to`] brings them back to the column's type
/// on the way out.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn logical_type(&self) -> Option<LogicalType> {
        //! The natural column type of this value, [`None`] for NULL.

        match self {
            Value::Null => None,
            Value::Integer(_) => Some(LogicalType::Integer),
            Value::Float(_) => Some(LogicalType::Float),
            Value::Text(_) => Some(LogicalType::Varchar),
            Value::Boolean(_) => Some(LogicalType::Boolean),
        }
    }

    pub fn cast_to(&self, target: LogicalType) -> Option<Value> {
        //! Convert the value to `target`. NULL casts to every type.
        //!
        //! Text is trimmed before it is parsed as a number or a boolean, and
        //! an integer past 2^53 loses precision as a float. Returns [`None`]
        //! when the conversion is not possible.

        match (self, target) {
            (Value::Null, _) => Some(Value::Null),

            (Value::Integer(v), LogicalType::Integer) => Some(Value::Integer(*v)),
            (Value::Integer(v), LogicalType::Float) => Some(Value::Float(*v as f64)),
            (Value::Integer(v), LogicalType::Varchar) => Some(Value::Text(v.to_string())),
            (Value::Integer(_), LogicalType::Boolean) => None,

            (Value::Float(v), LogicalType::Float) => Some(Value::Float(*v)),
            (Value::Float(v), LogicalType::Varchar) => Some(Value::Text(v.to_string())),
            (Value::Float(_), _) => None,

            (Value::Text(s), LogicalType::Varchar) => Some(Value::Text(s.clone())),
            (Value::Text(s), LogicalType::Integer) => s.trim().parse().ok().map(Value::Integer),
            (Value::Text(s), LogicalType::Float) => s.trim().parse().ok().map(Value::Float),
            (Value::Text(s), LogicalType::Boolean) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(Value::Boolean(true)),
                    "false" => Some(Value::Boolean(false)),
                    _ => None,
                }
            }

            (Value::Boolean(b), LogicalType::Boolean) => Some(Value::Boolean(*b)),
            (Value::Boolean(b), LogicalType::Varchar) => Some(Value::Text(b.to_string())),
            (Value::Boolean(_), _) => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NIL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row(values)
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row: Vec<String> = self.0.iter().map(|value| value.to_string()).collect();
        write!(f, "{}", row.join(" | "))
    }
}

/// A batch of rows moving in or out of a table.
///
/// Scans fill one chunk per call. Each row of a scanned chunk holds only the
/// projected columns, in the order they were requested.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataChunk {
    rows: Vec<Row>,
}

impl DataChunk {
    pub fn new() -> DataChunk {
        DataChunk { rows: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> DataChunk {
        DataChunk {
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl From<Vec<Row>> for DataChunk {
    fn from(rows: Vec<Row>) -> Self {
        DataChunk { rows }
    }
}

impl Display for DataChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self.rows.iter().map(|row| row.to_string()).collect();
        write!(f, "{}", rows.join("\n"))
    }
}
