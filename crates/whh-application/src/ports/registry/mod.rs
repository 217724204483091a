//! Provider Registry System
//!
//! Uses the `linkme` crate for compile-time registration of providers that
//! are discovered and instantiated at runtime.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Provider Registration Flow                    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  1. Provider defines:  #[linkme::distributed_slice(PROVIDERS)]  │
//! │                        static ENTRY: ProviderEntry = ...        │
//! │                              ↓                                  │
//! │  2. Registry declares: #[linkme::distributed_slice]             │
//! │                        pub static PROVIDERS: [Entry] = [..]     │
//! │                              ↓                                  │
//! │  3. Resolver queries:  PROVIDERS.iter()                         │
//! │                              ↓                                  │
//! │  4. Scheme selects:    "memory://…" → InMemoryHistoryStore      │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod history_store;

pub use history_store::{
    HISTORY_STORE_PROVIDERS, HistoryStoreProviderConfig, HistoryStoreProviderEntry,
    connection_scheme, list_history_stores, resolve_history_store,
};
