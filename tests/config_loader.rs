use std::io::Write;

use tempfile::NamedTempFile;
use uiflow::config::{Config, ConfigError};
use uiflow::event::EventAdapter;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp config");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn full_config_round_trips_into_components() {
    let file = write_config(
        r#"
[events]
buffer_capacity = 16

[scheduler]
thread_name = "browser-ui"

[fetch]
timeout_seconds = 5
user_agent = "uiflow-test"

[logging]
level = "debug"
"#,
    );

    let config = Config::load_from(file.path()).unwrap();
    let adapter = EventAdapter::from_config(&config.events);

    assert_eq!(adapter.capacity(), 16);
    assert_eq!(config.scheduler.thread_name, "browser-ui");
    assert_eq!(config.fetch.timeout_seconds, 5);
    assert_eq!(config.fetch.user_agent, "uiflow-test");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn blank_thread_name_fails_validation() {
    let file = write_config("[scheduler]\nthread_name = \"  \"\n");

    let err = Config::load_from(file.path()).unwrap_err();
    match err {
        ConfigError::ValidationError { message } => assert!(message.contains("thread_name")),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn unreadable_path_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();

    // A directory exists but cannot be read as a file.
    let err = Config::load_from(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let file = write_config("[events]\nbuffer_capacity = \"many\"\n");

    let err = Config::load_from(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("Failed to parse config file"));
}
