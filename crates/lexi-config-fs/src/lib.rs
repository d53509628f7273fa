// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem [`ConfigStore`] for lexi tools: one `<key>.json` file per
//! settings key, under the platform config directory or an explicit root.
//!
//! Writes go to a sibling temporary file that is then renamed over the
//! target, so a crash mid-save leaves the previous settings intact.

use directories::ProjectDirs;
use lexi_config::config::{check_key, ConfigError, ConfigStore};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings files under a base directory.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Store under the user config directory (`~/.config/lexi` on Linux).
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "flyingrobots", "lexi")
            .ok_or_else(|| ConfigError::Other("no home directory to hold lexi settings".into()))?;
        Self::at(dirs.config_dir())
    }

    /// Store under `base`, created when missing.
    pub fn at(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Directory holding the settings files.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, ConfigError> {
        check_key(key)?;
        Ok(self.base.join(format!("{key}.json")))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        match fs::read(self.path_for(key)?) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key)?;
        let staging = self.base.join(format!(".{key}.json.tmp"));
        let mut file = fs::File::create(&staging)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&staging, &path)?;
        debug!(path = %path.display(), bytes = data.len(), "settings saved");
        Ok(())
    }
}
