//! Domain Services
//!
//! Business services of the subject under test.
//!
//! | Service | Description |
//! |---------|-------------|
//! | [`HistoryService`] | Appends and reads back weather data points |

/// Weather history business service
pub mod history;

pub use history::HistoryService;
