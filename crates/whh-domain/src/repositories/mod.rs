//! Repository contracts

pub mod history;

pub use history::{HistoryRepository, HistoryStoreProvider};
