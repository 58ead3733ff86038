//! File logging setup.
//!
//! The global logger can be installed once per process, so this binary holds a
//! single test that calls `setup_logging`.
use chrono::Utc;
use modal_relayer::logging::setup_logging;
use serial_test::serial;
use std::{env, fs, path::Path};

#[test]
#[serial]
fn test_setup_logging_file_mode_creates_dated_log_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let base = temp_dir.path().join("nested").join("relayer.log");

    env::set_var("LOG_MODE", "file");
    env::set_var("LOG_LEVEL", "debug");
    env::set_var("LOG_FILE_PATH", base.display().to_string());

    setup_logging().unwrap();
    log::info!("file logging initialized");

    let date_str = Utc::now().format("%Y-%m-%d").to_string();
    let expected = temp_dir
        .path()
        .join("nested")
        .join(format!("relayer-{}.log", date_str));
    assert!(
        Path::new(&expected).exists(),
        "expected log file {} does not exist",
        expected.display()
    );

    env::remove_var("LOG_MODE");
    env::remove_var("LOG_LEVEL");
    env::remove_var("LOG_FILE_PATH");
    let _ = fs::remove_dir_all(temp_dir.path());
}
