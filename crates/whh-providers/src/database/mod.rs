//! History Store Implementations
//!
//! | Provider | Scheme | Description |
//! |----------|--------|-------------|
//! | [`InMemoryHistoryStore`] | `memory://` | Rows kept by an in-process engine |
//! | [`PostgresHistoryStore`] | `postgres://` | r2d2 pool against a real server |

pub mod engine;
#[cfg(feature = "database-memory")]
pub mod memory;
#[cfg(feature = "database-postgres")]
pub mod postgres;

pub use engine::{MemoryDatabase, MemoryEngine};
#[cfg(feature = "database-memory")]
pub use memory::InMemoryHistoryStore;
#[cfg(feature = "database-postgres")]
pub use postgres::PostgresHistoryStore;
