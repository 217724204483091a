//! Domain value objects
//!
//! | Module | Types |
//! |--------|-------|
//! | [`resource`] | `ResourceState`, `ResourceKind`, `ResourceDeclaration`, `DeclarationSet`, `ResourceOutputs` |
//! | [`config`] | `ConfigValue`, `ConfigEntry`, `ConfigSnapshot`, key normalization |
//! | [`readiness`] | `ReadinessReport`, `ReadinessFailure`, `ReadinessError` |

pub mod config;
pub mod readiness;
pub mod resource;

pub use config::{ConfigEntry, ConfigSnapshot, ConfigValue, normalize_key};
pub use readiness::{ReadinessError, ReadinessFailure, ReadinessFailureReason, ReadinessReport};
pub use resource::{
    DatabaseEngine, DeclarationSet, ResourceDeclaration, ResourceKind, ResourceOutputs,
    ResourceState,
};
