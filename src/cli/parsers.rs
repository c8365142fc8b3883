//! The place where CLI and SQL parsers are defined.

use std::path::PathBuf;

use clap::{Parser, Subcommand, arg, command};
use sqlparser::{ast::Statement, dialect::Dialect, parser};

use crate::cli::messages::{highlight_argument, system_message};
use crate::config::{BackendKind, ConfigOverrides};

#[derive(Parser)]
#[command(name = "rucks")]
#[command(about = "Typed tables stored in an ordered key-value engine", long_about = None)]
pub struct CliParser {
    #[command(subcommand)]
    pub mode: CliMode,

    // A JSON file with engine settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    // Where the sled backend keeps its files.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendKind>,

    // Rows returned per scan batch.
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    // trace, debug, info, warn or error; RUST_LOG takes precedence.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum CliMode {
    // Start a REPL client over the configured storage.
    Client,

    // Print every persisted table and exit.
    Tables,
}

impl CliParser {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data_dir: self.data_dir.clone(),
            backend: self.backend,
            scan_batch_size: self.batch_size,
            log_level: self.log_level.clone(),
        }
    }
}

/// Parses the statements typed into the REPL.
///
/// For now, it only supports a single dialect, but in future, may support
/// multiple ones.
pub struct SqlParser {
    dialect: Box<dyn Dialect>,
}

impl SqlParser {
    pub fn new(dialect: Box<dyn Dialect>) -> SqlParser {
        SqlParser { dialect }
    }

    pub fn parse_sql(&self, statement: &str) -> Result<Vec<Statement>, String> {
        //! Parse one or more SQL queries at once.
        //!
        //! Returns an AST of statements.

        parser::Parser::parse_sql(self.dialect.as_ref(), statement).map_err(|e| {
            system_message(
                "parser",
                format!(
                    "Error parsing query: {}",
                    highlight_argument(e.to_string().as_str())
                ),
            )
        })
    }

    pub fn parse_single_sql(&self, statement: &str) -> Result<Statement, String> {
        //! Parse only one SQL query at once.

        let mut statements = self.parse_sql(statement)?;

        match statements.len() {
            1 => Ok(statements.remove(0)),
            0 => Err(system_message(
                "parser",
                "There is no statement to run.".to_string(),
            )),
            _ => Err(system_message(
                "parser",
                "Please write a single statement at a time.".to_string(),
            )),
        }
    }
}
