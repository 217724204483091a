//! Tests for the history store registry
//!
//! Uses `extern crate whh_providers` to force linkme registration of the
//! real store providers.

extern crate whh_providers;

use whh_application::ports::registry::{
    HistoryStoreProviderConfig, list_history_stores, resolve_history_store,
};

#[test]
fn test_memory_store_is_registered() {
    let providers = list_history_stores();
    assert!(
        providers.iter().any(|(name, _)| *name == "memory"),
        "Memory store should be registered. Available: {providers:?}"
    );
}

#[test]
fn test_resolve_by_scheme() {
    let store = resolve_history_store(&HistoryStoreProviderConfig::new(
        "memory://unknown-engine/applicationDb",
    ))
    .expect("memory scheme resolves");
    assert_eq!(store.provider_name(), "memory");
}

#[test]
fn test_unknown_scheme_lists_available_providers() {
    let error = match resolve_history_store(&HistoryStoreProviderConfig::new("redis://localhost")) {
        Ok(_) => panic!("redis is not a history store"),
        Err(e) => e,
    };
    assert!(error.contains("redis"));
    assert!(error.contains("memory"));
}

#[test]
fn test_missing_scheme_is_rejected() {
    assert!(resolve_history_store(&HistoryStoreProviderConfig::new("applicationDb")).is_err());
}
