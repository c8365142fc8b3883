//! Everything that belongs to one command line session: the command history,
//! when the session started, and the catalog the session's statements run
//! against.
//!
//! A session does not own the storage. The catalog is created by whoever
//! starts the session and handed in, so two sessions over the same catalog
//! see the same tables.

use std::{fmt::Display, sync::Arc, time::SystemTime};

use chrono::{DateTime, Local};

use crate::persistence::Catalog;

struct CommandHistory {
    command: String,
    command_time: SystemTime,
}

impl CommandHistory {
    pub fn command_time_string(&self) -> String {
        let datetime: DateTime<Local> = self.command_time.into();
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Display for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.command_time_string(), self.command)
    }
}

pub struct Session {
    command_history: Vec<CommandHistory>,
    start_time: SystemTime,
    catalog: Arc<Catalog>,
}

impl Session {
    pub fn client(catalog: &Arc<Catalog>) -> Session {
        //! Returns a new client session over `catalog`.

        Session {
            command_history: vec![],
            start_time: SystemTime::now(),
            catalog: Arc::clone(catalog),
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn add_to_command_history(&mut self, command: &str) {
        if command.is_empty() {
            return;
        }

        self.command_history.push(CommandHistory {
            command: command.to_string(),
            command_time: SystemTime::now(),
        });
    }

    pub fn start_time_string(&self) -> String {
        let datetime: DateTime<Local> = self.start_time.into();
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn history_len(&self) -> usize {
        self.command_history.len()
    }

    pub fn show_command_history(&self, n_prev: Option<usize>) {
        //! Show the list of previously invoked commands, newest first.
        //! Use `n_prev` to limit the number of commands you see.

        let limit = n_prev.unwrap_or(self.command_history.len());

        for (index, command) in self.command_history.iter().rev().take(limit).enumerate() {
            println!("{:3} | {}", index, command);
        }
    }

    pub fn get_last_command(&self, nth_back: usize) -> Option<&str> {
        //! The `nth_back` most recent command, 1 being the last one.

        if nth_back == 0 {
            return None;
        }

        self.command_history
            .iter()
            .nth_back(nth_back - 1)
            .map(|cmd| cmd.command.as_str())
    }
}
