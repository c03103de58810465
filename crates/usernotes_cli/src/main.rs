//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `usernotes_core` linkage.
//! - Validate an optional config file and report the effective surfaces.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use usernotes_core::db::migrations::latest_version;
use usernotes_core::logging::init_from_config;
use usernotes_core::{open_db_in_memory, NotesConfig};

fn main() -> ExitCode {
    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("usernotes_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<String>) -> Result<(), String> {
    let config = match config_path.as_deref() {
        Some(path) => NotesConfig::load(path).map_err(|err| err.to_string())?,
        None => NotesConfig::default(),
    };
    if init_from_config(&config.logging).map_err(|err| err.to_string())? {
        log::info!("event=cli_start module=cli status=ok");
    }

    let conn = open_db_in_memory().map_err(|err| err.to_string())?;
    let schema_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|err: rusqlite::Error| err.to_string())?;

    println!("usernotes_core ping={}", usernotes_core::ping());
    println!("usernotes_core version={}", usernotes_core::core_version());
    println!("schema version={schema_version} latest={}", latest_version());
    println!("form flag={} target={}", config.form.flag_field, config.form.target_field);
    println!("api header={}", config.api.note_header);
    println!(
        "status meta_key={} binding={}",
        config.status.meta_key, config.status.binding_source
    );
    Ok(())
}
