// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Settings store fake that keeps blobs in memory.

use lexi_config::config::{ConfigError, ConfigStore};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory [`ConfigStore`] that counts calls and can be told to fail.
///
/// Clones share everything, so a test can keep one handle while a
/// `ConfigService` owns another.
///
/// ```
/// use lexi_config::config::ConfigService;
/// use lexi_dry_tests::InMemoryConfigStore;
/// use lexi_render::RenderOptions;
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
/// RenderOptions::default().save(&service).unwrap();
/// assert!(store.contains_key("render"));
/// assert_eq!(store.save_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
    fail_loads: AtomicBool,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `json` under `key`, as if saved by an earlier run.
    pub fn with_json(key: &str, json: &str) -> Self {
        let store = Self::new();
        store.blobs().insert(key.to_owned(), json.as_bytes().to_vec());
        store
    }

    /// Makes every later `load_raw` fail with [`ConfigError::Other`].
    pub fn set_fail_on_load(&self, fail: bool) {
        self.shared.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// `load_raw` calls so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.shared.loads.load(Ordering::SeqCst)
    }

    /// `save_raw` calls so far.
    pub fn save_count(&self) -> usize {
        self.shared.saves.load(Ordering::SeqCst)
    }

    /// Whether anything is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.blobs().contains_key(key)
    }

    /// Stored blob for `key` as text.
    pub fn json(&self, key: &str) -> Option<String> {
        self.blobs()
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn blobs(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.shared
            .blobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        self.shared.loads.fetch_add(1, Ordering::SeqCst);
        if self.shared.fail_loads.load(Ordering::SeqCst) {
            return Err(ConfigError::Other(format!("simulated failure loading `{key}`")));
        }
        self.blobs().get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        self.shared.saves.fetch_add(1, Ordering::SeqCst);
        self.blobs().insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn clones_share_blobs_and_counters() {
        let store = InMemoryConfigStore::new();
        let other = store.clone();
        other.save_raw("render", b"{}").unwrap();
        assert_eq!(store.load_raw("render").unwrap(), b"{}");
        assert_eq!((store.save_count(), store.load_count()), (1, 1));
        assert_eq!(store.json("render").as_deref(), Some("{}"));
    }

    #[test]
    fn missing_keys_and_simulated_failures() {
        let store = InMemoryConfigStore::with_json("render", "{}");
        assert!(matches!(store.load_raw("paging"), Err(ConfigError::NotFound)));
        store.set_fail_on_load(true);
        assert!(matches!(store.load_raw("render"), Err(ConfigError::Other(_))));
        assert_eq!(store.load_count(), 2);
    }
}
