//! Message formatting for the CLI, so every line the REPL prints has the
//! same shape.
//!
//! - Highlight Argument (amber, not bold)
//! - System Message (`[source] message`, with the source in bold amber)
//! - Error Message (a system message built from an engine error)

use colored::Colorize;

use crate::cli::colors::RUCKS_AMBER;
use crate::error::Error;

pub fn highlight_argument(argument: &str) -> String {
    format!("{}", argument.color(RUCKS_AMBER))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! Takes in a source name (like 'system') and the message as a formatted
    //! text; output of [`format!`].

    format!(
        "[{}] {}",
        format!("{:6}", source_name.color(RUCKS_AMBER).bold()),
        message
    )
}

pub fn error_message(error: &Error) -> String {
    let source = match error {
        Error::AlreadyExists { .. } | Error::NotFound { .. } => "catalog",
        Error::CorruptRecord { .. } => "codec",
        Error::Backend(_) | Error::Sled(_) | Error::TransactionClosed => "store",
        Error::InvalidDefinition(_) | Error::InvalidValue { .. } => "exctr",
        Error::Config(_) => "config",
    };

    system_message(source, highlight_argument(&error.to_string()))
}
