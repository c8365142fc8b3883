//! The banner printed when the REPL starts.
//!
//! - Title
//! - Short Description
//! - Version Information
//! - Where the data lives

use colored::*;

use crate::cli::colors::RUCKS_AMBER;
use crate::config::{BackendKind, EngineConfig};

pub fn splash_screen(config: &EngineConfig) {
    show_splash_screen();
    show_version_info(config);
}

fn show_splash_screen() {
    print!(
        r#"
    {}
        "#,
        r"
    ██████╗ ██╗   ██╗ ██████╗██╗  ██╗███████╗
    ██╔══██╗██║   ██║██╔════╝██║ ██╔╝██╔════╝
    ██████╔╝██║   ██║██║     █████╔╝ ███████╗
    ██╔══██╗██║   ██║██║     ██╔═██╗ ╚════██║
    ██║  ██║╚██████╔╝╚██████╗██║  ██╗███████║
    ╚═╝  ╚═╝ ╚═════╝  ╚═════╝╚═╝  ╚═╝╚══════╝
        "
        .color(RUCKS_AMBER)
    )
}

fn show_version_info(config: &EngineConfig) {
    let storage = match config.backend {
        BackendKind::Memory => "memory (not persisted)".to_string(),
        BackendKind::Sled => format!("sled at {}", config.data_dir.display()),
    };

    println!(
        r"
    {}

    Version {}
    Storage {}
        ",
        env!("CARGO_PKG_DESCRIPTION").color(RUCKS_AMBER),
        env!("CARGO_PKG_VERSION").color(RUCKS_AMBER).italic(),
        storage.color(RUCKS_AMBER).italic(),
    )
}
