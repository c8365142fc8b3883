//! Text encoding of rows, schemas and row counts.
//!
//! A record is a count followed by that many fields, each terminated by `|`:
//!
//! ```text
//! 3|INT:1|VARCHAR:ada|NULL|
//! ```
//!
//! Inside a field `\` and `|` are escaped with a backslash, so any string
//! survives a round trip. Integers are written in decimal, floats with the
//! shortest representation that parses back to the same bits.

use log::debug;
use thiserror::Error;

use super::row::Value;
use super::schema::{ColumnDefinition, LogicalType};

const FIELD_DELIMITER: char = '|';
const TAG_SEPARATOR: char = ':';
const ESCAPE: char = '\\';

const NULL_FIELD: &str = "NULL";
const INT_TAG: &str = "INT";
const FLOAT_TAG: &str = "FLOAT";
const VARCHAR_TAG: &str = "VARCHAR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("record is not valid UTF-8")]
    NotUtf8,
    #[error("missing or invalid count prefix {0:?}")]
    BadCount(String),
    #[error("declared {declared} field(s) but found {found}")]
    CountMismatch { declared: usize, found: usize },
    #[error("field {0} is empty")]
    EmptyField(usize),
    #[error("field {0} has no type tag")]
    MissingTag(usize),
    #[error("field {index} is not a valid {tag}: {literal:?}")]
    BadLiteral {
        index: usize,
        tag: &'static str,
        literal: String,
    },
    #[error("record ends inside a field")]
    Unterminated,
}

pub fn encode_row(values: &[Value]) -> Vec<u8> {
    //! Encode the values of one row in column order.

    let mut record = format!("{}{}", values.len(), FIELD_DELIMITER);

    for value in values {
        match value {
            Value::Null => record.push_str(NULL_FIELD),
            Value::Integer(v) => push_tagged(&mut record, INT_TAG, &v.to_string()),
            Value::Float(v) => push_tagged(&mut record, FLOAT_TAG, &v.to_string()),
            Value::Text(s) => push_tagged(&mut record, VARCHAR_TAG, s),
            // No dedicated tag; stored as text and cast back on read.
            Value::Boolean(b) => push_tagged(&mut record, VARCHAR_TAG, &b.to_string()),
        }
        record.push(FIELD_DELIMITER);
    }

    record.into_bytes()
}

pub fn decode_row(bytes: &[u8]) -> Result<Vec<Value>, DecodeError> {
    //! Decode a record written by [`encode_row`].
    //!
    //! A field whose tag is not known decodes as text of its payload. Newer
    //! writers may add tags, older readers still get something usable.

    let fields = split_record(bytes)?;

    fields
        .iter()
        .enumerate()
        .map(|(index, field)| decode_field(index, field))
        .collect()
}

pub fn encode_schema(columns: &[ColumnDefinition]) -> Vec<u8> {
    let mut record = format!("{}{}", columns.len(), FIELD_DELIMITER);

    for column in columns {
        push_escaped(&mut record, &column.name);
        record.push(TAG_SEPARATOR);
        record.push_str(column.logical_type.name());
        record.push(FIELD_DELIMITER);
    }

    record.into_bytes()
}

pub fn decode_schema(bytes: &[u8]) -> Result<Vec<ColumnDefinition>, DecodeError> {
    //! Decode a schema record. Unknown type names become `VARCHAR`.

    let fields = split_record(bytes)?;

    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let (name, type_name) = field
                .split_once(TAG_SEPARATOR)
                .ok_or(DecodeError::MissingTag(index))?;
            if name.is_empty() {
                return Err(DecodeError::EmptyField(index));
            }
            Ok(ColumnDefinition::new(name, LogicalType::from_name(type_name)))
        })
        .collect()
}

pub fn encode_row_count(row_count: u64) -> Vec<u8> {
    row_count.to_string().into_bytes()
}

pub fn decode_row_count(bytes: &[u8]) -> Result<u64, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
    text.parse()
        .map_err(|_| DecodeError::BadCount(text.to_string()))
}

fn push_tagged(record: &mut String, tag: &str, literal: &str) {
    record.push_str(tag);
    record.push(TAG_SEPARATOR);
    push_escaped(record, literal);
}

fn push_escaped(record: &mut String, text: &str) {
    for c in text.chars() {
        if c == FIELD_DELIMITER || c == ESCAPE {
            record.push(ESCAPE);
        }
        record.push(c);
    }
}

fn split_record(bytes: &[u8]) -> Result<Vec<String>, DecodeError> {
    //! Split a record into its unescaped fields and check them against the count
    //! prefix.

    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
    let (count, body) = text
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| DecodeError::BadCount(text.to_string()))?;
    let declared: usize = count
        .parse()
        .map_err(|_| DecodeError::BadCount(count.to_string()))?;

    let mut fields = Vec::with_capacity(declared);
    let mut current = String::new();
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => current.push(chars.next().ok_or(DecodeError::Unterminated)?),
            FIELD_DELIMITER => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }

    if !current.is_empty() {
        return Err(DecodeError::Unterminated);
    }

    if fields.len() != declared {
        return Err(DecodeError::CountMismatch {
            declared,
            found: fields.len(),
        });
    }

    Ok(fields)
}

fn decode_field(index: usize, field: &str) -> Result<Value, DecodeError> {
    if field.is_empty() {
        return Err(DecodeError::EmptyField(index));
    }
    if field == NULL_FIELD {
        return Ok(Value::Null);
    }

    let (tag, literal) = field
        .split_once(TAG_SEPARATOR)
        .ok_or(DecodeError::MissingTag(index))?;

    let bad_literal = |tag: &'static str| DecodeError::BadLiteral {
        index,
        tag,
        literal: literal.to_string(),
    };

    match tag {
        INT_TAG => literal
            .parse()
            .map(Value::Integer)
            .map_err(|_| bad_literal(INT_TAG)),
        FLOAT_TAG => literal
            .parse()
            .map(Value::Float)
            .map_err(|_| bad_literal(FLOAT_TAG)),
        VARCHAR_TAG => Ok(Value::Text(literal.to_string())),
        unknown => {
            debug!("unknown value tag {:?} in field {}; reading as text", unknown, index);
            Ok(Value::Text(literal.to_string()))
        }
    }
}
