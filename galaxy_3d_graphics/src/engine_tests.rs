//! Unit tests for the Engine logging front-end
//!
//! IMPORTANT: the logger is a process-wide OnceLock shared across all tests.
//! All tests are marked with #[serial] to run sequentially.

use crate::galaxy3d::{Engine, Error};
use crate::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl TestLogger {
    fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" @{}:{}", file, line),
            _ => String::new(),
        };
        entries.push(format!("{:?} [{}]: {}{}", entry.severity, entry.source, entry.message, location));
    }
}

// ============================================================================
// LOGGING API TESTS
// ============================================================================

#[test]
#[serial]
fn test_default_logger_logs_without_panic() {
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "test", "Test message".to_string());
    Engine::log(LogSeverity::Error, "test", "Error message".to_string());
    Engine::log(LogSeverity::Trace, "test", "Filtered out".to_string());
}

#[test]
#[serial]
fn test_set_custom_logger() {
    let test_logger = TestLogger::new();
    let entries_ref = test_logger.entries.clone();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());
    Engine::log(LogSeverity::Warn, "test", "Message 2".to_string());

    let entries = entries_ref.lock().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].contains("Info"));
    assert!(entries[0].contains("Message 1"));
    assert!(entries[1].contains("Warn"));
    drop(entries);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_to_default() {
    let test_logger = TestLogger::new();
    let entries_ref = test_logger.entries.clone();
    Engine::set_logger(test_logger);

    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "After reset".to_string());

    assert_eq!(entries_ref.lock().unwrap().len(), 0);
}

#[test]
#[serial]
fn test_log_detailed_with_file_line() {
    let test_logger = TestLogger::new();
    let entries_ref = test_logger.entries.clone();
    Engine::set_logger(test_logger);

    Engine::log_detailed(
        LogSeverity::Error,
        "galaxy3d::test",
        "Detailed error".to_string(),
        "test.rs",
        42,
    );

    let entries = entries_ref.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].contains("Detailed error"));
    assert!(entries[0].contains("@test.rs:42"));
    drop(entries);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_is_logged_and_returned() {
    let test_logger = TestLogger::new();
    let entries_ref = test_logger.entries.clone();
    Engine::set_logger(test_logger);

    let err = crate::engine_err!(Configuration, "galaxy3d::BlurFilter", "samples must be odd");
    assert_eq!(err, Error::Configuration("samples must be odd".to_string()));

    let entries = entries_ref.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("Error [galaxy3d::BlurFilter]"));
    drop(entries);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_custom_logger_receives_all_severities() {
    let test_logger = TestLogger::new();
    let entries_ref = test_logger.entries.clone();
    Engine::set_logger(test_logger);

    crate::engine_trace!("test", "Trace");
    crate::engine_debug!("test", "Debug {}", 1);
    crate::engine_info!("test", "Info");
    crate::engine_warn!("test", "Warn");
    crate::engine_error!("test", "Error");

    assert_eq!(entries_ref.lock().unwrap().len(), 5);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_set_min_severity_installs_default_logger() {
    let test_logger = TestLogger::new();
    let entries_ref = test_logger.entries.clone();
    Engine::set_logger(test_logger);

    Engine::set_min_severity(LogSeverity::Warn);
    Engine::log(LogSeverity::Error, "test", "to console".to_string());

    assert!(entries_ref.lock().unwrap().is_empty());

    Engine::reset_logger();
}
