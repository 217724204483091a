//! Unit tests for domain error types

use std::collections::BTreeMap;
use std::time::Duration;
use whh_domain::{Error, ReadinessError, ReadinessFailure, ReadinessFailureReason, ResourceState};

#[test]
fn test_not_found_error() {
    let error = Error::not_found("weather data");
    match error {
        Error::NotFound { resource } => assert_eq!(resource, "weather data"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_resource_not_found_carries_name() {
    let error = Error::resource_not_found("cache");
    assert_eq!(error.resource_name(), Some("cache"));
    assert!(error.to_string().contains("cache"));
    assert!(error.is_fatal_to_suite());
}

#[test]
fn test_readiness_timeout_display() {
    let error = Error::ReadinessTimeout {
        resource: "webfrontend".to_string(),
        target: ResourceState::Running,
        waited: Duration::from_millis(1500),
        last_state: ResourceState::Starting,
    };
    let text = error.to_string();
    assert!(text.contains("webfrontend"));
    assert!(text.contains("1500 ms"));
    assert!(text.contains("Starting"));
    assert_eq!(error.resource_name(), Some("webfrontend"));
}

#[test]
fn test_value_resolution_keeps_cause() {
    let cause = Error::database("connection refused");
    let error = Error::value_resolution("CONNECTION_STRINGS:APPLICATIONDB", cause);
    match &error {
        Error::ValueResolution { key, message, source } => {
            assert_eq!(key, "CONNECTION_STRINGS:APPLICATIONDB");
            assert!(message.contains("connection refused"));
            assert!(source.is_some());
        }
        _ => panic!("Expected ValueResolution error"),
    }
    assert!(error.is_fatal_to_suite());
}

#[test]
fn test_readiness_error_is_transparent() {
    let readiness = ReadinessError {
        failures: vec![ReadinessFailure {
            resource: "apiservice".to_string(),
            target: ResourceState::Running,
            reason: ReadinessFailureReason::Failed {
                state: ResourceState::FailedToStart,
            },
        }],
        ready: BTreeMap::new(),
        elapsed: Duration::from_millis(10),
    };
    let expected = readiness.to_string();
    let error: Error = readiness.into();
    assert_eq!(error.to_string(), expected);
    assert!(error.is_fatal_to_suite());
}

#[test]
fn test_subject_initialization_from_does_not_double_wrap() {
    let first = Error::subject_initialization("missing connection string");
    let wrapped = Error::subject_initialization_from(first);
    match wrapped {
        Error::SubjectInitialization { message, source } => {
            assert_eq!(message, "missing connection string");
            assert!(source.is_none());
        }
        _ => panic!("Expected SubjectInitialization error"),
    }
}

#[test]
fn test_scope_and_state_errors_are_not_fatal() {
    assert!(!Error::scope_creation("subject stopped").is_fatal_to_suite());
    assert!(!Error::invalid_state("subject", "begin scope", "Disposed").is_fatal_to_suite());
    assert!(!Error::validation("too long").is_fatal_to_suite());
}

#[test]
fn test_invalid_state_display() {
    let error = Error::invalid_state("runtime", "start", ResourceState::Stopped);
    assert_eq!(
        error.to_string(),
        "Invalid state for runtime: cannot start while Stopped"
    );
}

#[test]
fn test_string_conversions() {
    let from_str: Error = "boom".into();
    let from_string: Error = String::from("boom").into();
    assert!(matches!(from_str, Error::String(ref s) if s == "boom"));
    assert!(matches!(from_string, Error::String(ref s) if s == "boom"));
}
