use thiserror::Error;

/// Every failure the engine can report.
///
/// Missing rows are NOT errors; the row storage layer returns [`None`] for those so
/// scans can step over deleted ids. Missing tables are.
#[derive(Debug, Error)]
pub enum Error {
    #[error("table '{table}' already exists")]
    AlreadyExists { table: String },

    #[error("table '{table}' does not exist")]
    NotFound { table: String },

    #[error("corrupt record at '{key}': {reason}")]
    CorruptRecord { key: String, reason: String },

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("sled failure: {0}")]
    Sled(#[from] sled::Error),

    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("invalid value for column '{column}': {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("transaction is no longer active")]
    TransactionClosed,

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn corrupt(key: &[u8], reason: impl Into<String>) -> Error {
        Error::CorruptRecord {
            key: String::from_utf8_lossy(key).into_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(table: &str) -> Error {
        Error::NotFound {
            table: table.to_string(),
        }
    }

    pub(crate) fn already_exists(table: &str) -> Error {
        Error::AlreadyExists {
            table: table.to_string(),
        }
    }
}
