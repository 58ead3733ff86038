//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_FILE_PATH: when using file mode, the path of the log file (default "logs/modal-relayer.log")

use chrono::Utc;
use color_eyre::Result;
use log::info;
use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};
use std::{
    env,
    fs::{create_dir_all, File},
    path::Path,
};

use crate::constants::{DEFAULT_LOG_FILE_PATH, DEFAULT_LOG_LEVEL, DEFAULT_LOG_MODE};

fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Appends the UTC date to the file name, keeping a `.log` extension last.
fn rolled_file_path(base_file_path: &str, date_str: &str) -> String {
    match base_file_path.strip_suffix(".log") {
        Some(trimmed) => format!("{}-{}.log", trimmed, date_str),
        None => format!("{}-{}.log", base_file_path, date_str),
    }
}

pub fn setup_logging() -> Result<()> {
    let log_mode = env::var("LOG_MODE").unwrap_or_else(|_| DEFAULT_LOG_MODE.to_string());
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    let level_filter = parse_level(&log_level);

    if log_mode.to_lowercase() == "file" {
        let base_file_path =
            env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE_PATH.to_string());
        let date_str = Utc::now().format("%Y-%m-%d").to_string();
        let file_path = rolled_file_path(&base_file_path, &date_str);

        if let Some(parent) = Path::new(&file_path).parent() {
            create_dir_all(parent)
                .map_err(|e| eyre::eyre!("Failed to create log directory: {}", e))?;
        }

        let log_file = File::create(&file_path)
            .map_err(|e| eyre::eyre!("Unable to create log file {}: {}", file_path, e))?;

        WriteLogger::init(level_filter, Config::default(), log_file)
            .map_err(|e| eyre::eyre!("Failed to initialize file logger: {}", e))?;
    } else {
        SimpleLogger::init(level_filter, Config::default())
            .map_err(|e| eyre::eyre!("Failed to initialize simple logger: {}", e))?;
    }

    info!("Logging is successfully configured (mode: {})", log_mode);
    Ok(())
}
