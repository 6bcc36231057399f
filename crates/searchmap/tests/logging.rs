//! Logging tests
//!
//! Operations are exercised under a test subscriber at trace level so every
//! event and its fields are formatted at least once.

use searchmap::core::logging::{init_logging, LogFormat, LogLevel, LogSettings};
use searchmap::prelude::*;
use std::str::FromStr;
use tracing_subscriber::util::SubscriberInitExt;

#[test]
fn test_operations_under_trace_subscriber() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let mut map = SearchMap::new(HeadlessRenderer::new());
    map.display();
    let root = map.add_node(NodeKind::title("Root"), None, None).unwrap();
    let a = map.add_node(NodeKind::text("a"), Some(root), None).unwrap();
    let b = map.add_node(NodeKind::text("b"), Some(root), None).unwrap();
    map.add_sibling(a, b).unwrap();
    map.delete_node(a).unwrap();
    assert!(map.undo());
    assert!(map.redo());
    // empty redo stack logs a warning and does nothing
    assert!(!map.redo());
    assert!(map.graph().validate().is_empty());
}

#[test]
fn test_second_global_subscriber_is_refused() {
    let settings = LogSettings::new(LogLevel::Debug, LogFormat::Compact);
    let _ = init_logging(&settings);
    let again = LogSettings::new(LogLevel::Debug, LogFormat::Json);
    assert!(init_logging(&again).is_err());
}

#[test]
fn test_malformed_filter_is_rejected() {
    let settings = LogSettings {
        filter: "searchmap=loud".to_string(),
        format: LogFormat::Pretty,
    };
    let err = init_logging(&settings).unwrap_err();
    assert!(err.to_string().contains("invalid log filter"));
}

#[test]
fn test_level_and_format_names() {
    assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
    assert_eq!(LogFormat::from_str("pretty"), Ok(LogFormat::Pretty));
    assert!(LogFormat::from_str("xml").unwrap_err().contains("unknown log format"));
    assert!(LogLevel::Trace > LogLevel::Info);
}
