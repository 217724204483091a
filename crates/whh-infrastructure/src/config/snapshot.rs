//! Harvested snapshot as a figment provider
//!
//! Keys are split on `:` and each segment is lower-cased, so
//! `CONNECTION_STRINGS:applicationDb` lands at `connection_strings.applicationdb`,
//! the same place a `WEATHER__CONNECTION_STRINGS__APPLICATIONDB` variable would.
//! Keys that only differ by case are rejected rather than merged.

use figment::value::{Dict, Map, Tag, Value};
use figment::{Error, Metadata, Profile, Provider};
use whh_domain::constants::STRUCTURED_KEY_SEPARATOR;
use whh_domain::value_objects::ConfigSnapshot;

/// Figment provider serving a [`ConfigSnapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: ConfigSnapshot,
}

impl SnapshotSource {
    /// Wrap a snapshot
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Provider for SnapshotSource {
    fn metadata(&self) -> Metadata {
        Metadata::named("harvested configuration snapshot")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        for (key, value) in self.snapshot.iter() {
            let path: Vec<String> = key
                .split(STRUCTURED_KEY_SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_lowercase)
                .collect();
            insert_nested(&mut dict, &path, value, key)?;
        }
        Ok(Profile::Default.collect(dict))
    }
}

fn insert_nested(dict: &mut Dict, path: &[String], value: &str, key: &str) -> Result<(), Error> {
    match path {
        [] => Ok(()),
        [leaf] => {
            if dict.contains_key(leaf) {
                return Err(Error::from(format!(
                    "snapshot key '{key}' collides with another key once case is folded"
                )));
            }
            dict.insert(leaf.clone(), Value::String(Tag::Default, value.to_string()));
            Ok(())
        }
        [head, rest @ ..] => {
            let entry = dict
                .entry(head.clone())
                .or_insert_with(|| Value::Dict(Tag::Default, Dict::new()));
            match entry {
                Value::Dict(_, inner) => insert_nested(inner, rest, value, key),
                _ => Err(Error::from(format!(
                    "snapshot key '{key}' nests under '{head}', which already holds a value"
                ))),
            }
        }
    }
}
