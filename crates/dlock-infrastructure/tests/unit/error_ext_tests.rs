//! Error Extension Tests

use dlock_domain::error::{Error, Result};
use dlock_infrastructure::error_ext::ErrorContext;
use std::io;

fn not_found() -> std::result::Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, "file not found"))
}

#[test]
fn test_context_maps_to_internal() {
    let result: Result<()> = not_found().context("failed to read lease table");

    match result {
        Err(Error::Internal { message }) => {
            assert!(message.contains("failed to read lease table"));
            assert!(message.contains("file not found"));
        }
        other => panic!("Expected Internal error, got {other:?}"),
    }
}

#[test]
fn test_with_context_is_lazy() {
    let ok: std::result::Result<u8, io::Error> = Ok(7);
    let value = ok
        .with_context(|| -> String { panic!("context must not be built on success") })
        .unwrap();
    assert_eq!(value, 7);

    let err = not_found()
        .with_context(|| format!("attempt {}", 3))
        .unwrap_err();
    assert!(err.to_string().contains("attempt 3"));
}

#[test]
fn test_config_context_keeps_source() {
    let result: Result<()> = not_found().config_context("failed to open dlock.toml");

    match result {
        Err(Error::Configuration { message, source }) => {
            assert!(message.contains("dlock.toml"));
            assert!(source.is_some());
        }
        other => panic!("Expected Configuration error, got {other:?}"),
    }
}

#[test]
fn test_store_context_is_a_store_error() {
    let error = not_found().store_context("lock store unreachable").unwrap_err();

    assert!(error.is_store());
    assert!(std::error::Error::source(&error).is_some());
}
