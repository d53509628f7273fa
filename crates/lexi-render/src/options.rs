// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Render settings, persisted through [`lexi_config::config::ConfigService`].
use lexi_config::config::{ConfigError, ConfigService, ConfigStore};
use serde::{Deserialize, Serialize};

use crate::dispatch::MAX_WORKERS;

/// Settings key under which [`RenderOptions`] are stored.
pub const SETTINGS_KEY: &str = "render";

/// Knobs for one render run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Document title.
    pub title: String,
    /// Stylesheet linked from the document head.
    pub stylesheet_href: Option<String>,
    /// Zero-based page rendered by [`crate::render_document`].
    pub current_page: usize,
    /// Emit a letter heading whenever the first letter of the headword
    /// changes. Only meaningful when entries are sorted by headword.
    pub letter_headings: bool,
    /// Write `before`/`between`/`after` literals into the markup instead of
    /// leaving them to the stylesheet.
    pub inline_separators: bool,
    /// Upper bound on render workers.
    pub max_workers: usize,
    /// Attempts at a unique output file name per directory.
    pub output_attempts: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Dictionary".into(),
            stylesheet_href: Some("configured.css".into()),
            current_page: 0,
            letter_headings: true,
            inline_separators: false,
            max_workers: MAX_WORKERS,
            output_attempts: 5,
        }
    }
}

impl RenderOptions {
    /// Loads the stored options, or the defaults when none are stored.
    pub fn load<S: ConfigStore>(service: &ConfigService<S>) -> Result<Self, ConfigError> {
        service.load_or_default(SETTINGS_KEY)
    }

    /// Stores these options.
    pub fn save<S: ConfigStore>(&self, service: &ConfigService<S>) -> Result<(), ConfigError> {
        service.save(SETTINGS_KEY, self)
    }
}
