// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Settings persistence for lexi tools.
//!
//! Settings are serde values kept as pretty JSON under a logical key such as
//! `"render"`. Keys double as file stems in filesystem stores, so they are
//! restricted to ASCII letters, digits, `-` and `_`. The dictionary
//! configuration tree is not stored here; callers persist it however they
//! like.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Blob storage for settings, addressed by key.
pub trait ConfigStore {
    /// Bytes stored under `key`; [`ConfigError::NotFound`] when absent.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replaces whatever is stored under `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Settings failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing is stored under the key.
    #[error("no settings stored")]
    NotFound,
    /// The key is empty or has characters outside `[A-Za-z0-9_-]`.
    #[error("invalid settings key `{0}`")]
    InvalidKey(String),
    /// The store could not be read or written.
    #[error("settings i/o: {0}")]
    Io(#[from] std::io::Error),
    /// The stored blob, or the value being saved, is not valid JSON for the
    /// requested type.
    #[error("settings `{key}` malformed: {source}")]
    Malformed {
        /// Key of the offending blob.
        key: String,
        /// Parser or encoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Store-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Checks that `key` is usable by every store.
pub fn check_key(key: &str) -> Result<(), ConfigError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidKey(key.to_owned()))
    }
}

/// Typed access to a [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gives the store back.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Value stored under `key`. A missing key or an empty blob is `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        check_key(key)?;
        let bytes = match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => return Ok(None),
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound) => return Ok(None),
            Err(err) => return Err(err),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ConfigError::Malformed {
                key: key.to_owned(),
                source,
            })
    }

    /// Like [`Self::load`], with `T::default()` for missing settings.
    pub fn load_or_default<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Stores `value` under `key` as pretty JSON.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        check_key(key)?;
        let data = serde_json::to_vec_pretty(value).map_err(|source| ConfigError::Malformed {
            key: key.to_owned(),
            source,
        })?;
        self.store.save_raw(key, &data)
    }
}
