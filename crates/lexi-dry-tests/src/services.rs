// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Publication filter, media and style fakes.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use lexi_render::{
    FileRef, FileService, FileServiceError, MediaKind, ObjectId, PublicationFilter, StyleResolver,
};

/// Excludes a fixed set of objects.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet(HashSet<ObjectId>);

impl ExcludeSet {
    /// Filter excluding `objects`.
    pub fn new(objects: impl IntoIterator<Item = ObjectId>) -> Self {
        Self(objects.into_iter().collect())
    }
}

impl PublicationFilter for ExcludeSet {
    fn is_excluded(&self, obj: ObjectId) -> bool {
        self.0.contains(&obj)
    }
}

/// Places media under `media/` and records every request.
#[derive(Debug, Default)]
pub struct RecordingFiles {
    requests: Mutex<Vec<(String, MediaKind)>>,
    missing: HashSet<String>,
}

impl RecordingFiles {
    /// Service that finds every file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `path` as missing.
    pub fn with_missing(mut self, path: &str) -> Self {
        self.missing.insert(path.to_owned());
        self
    }

    /// Paths and kinds requested so far, in request order.
    pub fn requests(&self) -> Vec<(String, MediaKind)> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl FileService for RecordingFiles {
    fn resolve_media(&self, file: &FileRef, kind: MediaKind) -> Result<String, FileServiceError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((file.path.clone(), kind));
        if self.missing.contains(&file.path) {
            return Err(FileServiceError::Missing(file.path.clone()));
        }
        let name = file.path.rsplit(['/', '\\']).next().unwrap_or_default();
        Ok(format!("media/{name}"))
    }
}

/// Fixed style-name to CSS map.
#[derive(Debug, Clone, Default)]
pub struct FixedStyles(HashMap<String, String>);

impl FixedStyles {
    /// Resolver for `(style, css)` pairs.
    pub fn new(styles: &[(&str, &str)]) -> Self {
        Self(
            styles
                .iter()
                .map(|(s, c)| ((*s).to_owned(), (*c).to_owned()))
                .collect(),
        )
    }
}

impl StyleResolver for FixedStyles {
    fn css_for(&self, style: &str) -> Option<String> {
        self.0.get(style).cloned()
    }
}
