//! In-process orchestrated runtime

pub mod local;

pub use local::{LocalRuntime, LocalRuntimeOptions};
