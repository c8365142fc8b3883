use std::{
    io::{self, BufRead, Write},
    sync::{Arc, RwLock},
};

use colored::Colorize;
use log::{debug, info};
use sqlparser::dialect::GenericDialect;

use crate::{
    cli::{
        colors::RUCKS_AMBER,
        commands::{SqlExecutor, SqlResult},
        messages::{highlight_argument, system_message},
        parsers::SqlParser,
    },
    config::EngineConfig,
    error::Result,
    persistence::Catalog,
    sessions::session::Session,
};

mod colors;
pub mod commands;
pub mod messages;
pub mod parsers;
mod splash_screen;

const DEFAULT_LAST_COMMAND_DELIMITER: &str = "!";

const RUCKS_ENGINE_COMMANDS_LIST: [(&str, &str); 5] = [
    ("!", "execute the last command, add more to go further back"),
    ("help", "list all available commands"),
    ("history", "list command history for this session"),
    ("tables", "list every table, opened or not"),
    ("quit", "flush the storage and leave the session"),
];

pub fn run_client(config: &EngineConfig) -> Result<()> {
    //! Open the configured storage and run the REPL over it until the user
    //! quits or stdin closes.

    splash_screen::splash_screen(config);

    let catalog = Arc::new(Catalog::open(config)?);
    let session = Arc::new(RwLock::new(Session::client(&catalog)));
    info!("client session started over {:?} storage", config.backend);

    start_repl(&session);
    catalog.flush()
}

pub fn run_tables(config: &EngineConfig) -> Result<()> {
    //! Print the name and the column list of every persisted table.

    let catalog = Catalog::open(config)?;
    let names = catalog.list_tables()?;

    if names.is_empty() {
        println!(
            "{}",
            system_message("info", "There are no tables yet.".to_string())
        );
        return Ok(());
    }

    for name in names.iter() {
        let table = catalog.get_table(name)?;
        println!(
            "{:16} {} ({} row ids)",
            name.color(RUCKS_AMBER).bold(),
            table.schema(),
            table.row_count()
        );
    }

    Ok(())
}

pub fn show_help() {
    println!(
        "{}",
        system_message(
            "info",
            format!(
                "Any other statements are considered {}.",
                highlight_argument("sql statements")
            )
        )
    );

    println!();
    println!("{:10} {}", "COMMAND".color(RUCKS_AMBER), "DETAILS");
    for (command, details) in RUCKS_ENGINE_COMMANDS_LIST {
        println!("{:10} {}", command.color(RUCKS_AMBER), details)
    }
}

fn run_statement(sql: &str, client_session: &Arc<RwLock<Session>>) -> Option<SqlResult> {
    let parser = SqlParser::new(Box::new(GenericDialect {}));

    let statement = match parser.parse_single_sql(sql) {
        Ok(statement) => statement,
        Err(error) => {
            println!("{}", error);
            return None;
        }
    };
    debug!("running statement: {}", statement);

    let executor = SqlExecutor::new(statement, client_session);
    match executor.execute() {
        Ok(result) => {
            println!(
                "{}",
                system_message(
                    "rucks",
                    format!(
                        "{} row(s) processed!",
                        result.n_rows_processed.unwrap_or(0)
                    )
                )
            );
            Some(result)
        }
        Err(error) => {
            println!("{}", error);
            None
        }
    }
}

fn start_repl(client_session: &Arc<RwLock<Session>>) {
    println!(
        "{}",
        system_message(
            "system",
            format!(
                "Use '{}' to leave and '{}' to know all commands available.",
                highlight_argument("quit"),
                highlight_argument("help"),
            ),
        )
    );

    {
        let session = client_session.read().unwrap_or_else(|e| e.into_inner());
        println!(
            "{}",
            system_message(
                "system",
                format!(
                    "New session initiated at '{}'.",
                    highlight_argument(&session.start_time_string())
                ),
            )
        );
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        print!("{:6} > ", "rucks".color(RUCKS_AMBER).bold());
        let _ = io::stdout().flush();

        let mut buffer = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                println!(
                    "{}",
                    system_message("system", format!("Cannot read input: {}", error))
                );
                break;
            }
            None => break,
        };

        if buffer.starts_with(DEFAULT_LAST_COMMAND_DELIMITER) {
            let session = client_session.read().unwrap_or_else(|e| e.into_inner());
            let last = buffer.matches(DEFAULT_LAST_COMMAND_DELIMITER).count();

            match session.get_last_command(last) {
                Some(command) => buffer = command.to_string(),
                None => {
                    println!(
                        "{}",
                        system_message(
                            "system",
                            format!(
                                "No command {} steps back.",
                                highlight_argument(&last.to_string())
                            ),
                        )
                    );
                    continue;
                }
            }
        }

        {
            let mut session = client_session.write().unwrap_or_else(|e| e.into_inner());
            session.add_to_command_history(buffer.trim());
        }

        let query_result = match buffer.trim() {
            "" => None,
            "history" => {
                let session = client_session.read().unwrap_or_else(|e| e.into_inner());
                session.show_command_history(None);
                None
            }
            "help" => {
                show_help();
                None
            }
            "tables" => run_statement("SHOW TABLES", client_session),
            "quit" | "exit" => break,
            sql => run_statement(sql, client_session),
        };

        if let Some(table) = query_result.and_then(|result| result.table) {
            println!("{}", table)
        }
    }

    println!("Goodbye!")
}
