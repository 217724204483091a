//! Subject composition root
//!
//! The weather front-end's service graph is held in dill catalogs:
//!
//! | Catalog | Contents |
//! |---------|----------|
//! | root (one per subject start) | `AppConfig`, `Arc<dyn HistoryStoreProvider>` |
//! | scope (chained to root, one per test) | `Arc<dyn HistoryRepository>`, `HistoryService` |

pub mod bootstrap;

pub use bootstrap::WeatherFrontend;
