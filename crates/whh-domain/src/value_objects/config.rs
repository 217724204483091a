//! Configuration values handed from the harness to the subject

use crate::constants::{NESTED_KEY_SEPARATOR, STRUCTURED_KEY_SEPARATOR};
use crate::ports::environment::ValueProvider;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Rewrite an environment-style key (`A__B`) into the structured form (`A:B`)
///
/// Applying it twice gives the same result as applying it once.
pub fn normalize_key(key: &str) -> String {
    key.replace(NESTED_KEY_SEPARATOR, STRUCTURED_KEY_SEPARATOR)
}

/// Value of one environment entry as produced by a resource callback
#[derive(Clone)]
pub enum ConfigValue {
    /// Known at declaration time
    Literal(String),
    /// Known only once the runtime has provisioned something
    Deferred(Arc<dyn ValueProvider>),
    /// Explicitly absent; skipped by the harvester
    Null,
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Deferred(provider) => write!(f, "Deferred({})", provider.describe()),
            Self::Null => f.write_str("Null"),
        }
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<Option<String>> for ConfigValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Literal)
    }
}

impl From<Arc<dyn ValueProvider>> for ConfigValue {
    fn from(provider: Arc<dyn ValueProvider>) -> Self {
        Self::Deferred(provider)
    }
}

/// A harvested key with its resolved value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Normalized key
    pub key: String,
    /// Resolved value (`None` when the callback produced a null)
    pub value: Option<String>,
}

/// Immutable, fully resolved configuration for one subject
///
/// Keys are normalized and unique. When built from an iterator the last
/// occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    entries: BTreeMap<String, String>,
}

impl ConfigSnapshot {
    /// Snapshot with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Value for a key; both `A__B` and `A:B` spellings are accepted
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (normalize_key(&k.into()), v.into()))
            .collect();
        Self { entries }
    }
}

impl IntoIterator for ConfigSnapshot {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
