//! Case folding of configuration keys
//!
//! `Env` providers lower-case every key they serve. File keys are folded the
//! same way, so `applicationDb` in `weather.toml`,
//! `WEATHER__CONNECTION_STRINGS__APPLICATIONDB` and the harvested
//! `CONNECTION_STRINGS:applicationDb` all name one entry and merge by layer
//! priority instead of sitting side by side.

use figment::value::{Dict, Map, Value};
use figment::{Error, Metadata, Profile, Provider};

/// Serves the data of another provider with every key lower-cased
///
/// Two keys of one table that differ only in case are an error.
#[derive(Debug, Clone)]
pub struct LowercaseKeys<P> {
    inner: P,
}

impl<P: Provider> LowercaseKeys<P> {
    /// Wrap a provider
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: Provider> Provider for LowercaseKeys<P> {
    fn metadata(&self) -> Metadata {
        self.inner.metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        self.inner
            .data()?
            .into_iter()
            .map(|(profile, dict)| fold_dict(dict).map(|folded| (profile, folded)))
            .collect()
    }

    fn profile(&self) -> Option<Profile> {
        self.inner.profile()
    }
}

fn fold_dict(dict: Dict) -> Result<Dict, Error> {
    let mut folded = Dict::new();
    for (key, value) in dict {
        let lower = key.to_lowercase();
        if folded.contains_key(&lower) {
            return Err(Error::from(format!(
                "configuration key '{key}' differs from another key only by case"
            )));
        }
        folded.insert(lower, fold_value(value)?);
    }
    Ok(folded)
}

fn fold_value(value: Value) -> Result<Value, Error> {
    match value {
        Value::Dict(tag, dict) => Ok(Value::Dict(tag, fold_dict(dict)?)),
        Value::Array(tag, items) => Ok(Value::Array(
            tag,
            items
                .into_iter()
                .map(fold_value)
                .collect::<Result<Vec<_>, Error>>()?,
        )),
        other => Ok(other),
    }
}
