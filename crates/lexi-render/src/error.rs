// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Errors surfaced by a render run.
//!
//! Only fatal conditions appear here. Missing fields, malformed data and
//! media failures are logged and render as nothing.
use lexi_config::TreeError;
use thiserror::Error;

/// Fatal render failure.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The configuration cannot drive a render.
    #[error("configuration error at {path}: {reason}")]
    Configuration {
        /// Ancestry path of the offending node.
        path: String,
        /// What is wrong.
        reason: String,
    },
    /// Page size or page index unusable for the entry list.
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),
    /// An entry failed in a render worker; the first failing entry wins.
    #[error("render worker failed on entry {index}: {source}")]
    Worker {
        /// Index of the entry in the rendered list.
        index: usize,
        /// The underlying failure.
        #[source]
        source: Box<RenderError>,
    },
    /// The run was cancelled through its progress handle.
    #[error("render cancelled")]
    Cancelled,
    /// Writing the output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// `true` for configuration errors, including those raised inside a
    /// worker.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration { .. } => true,
            Self::Worker { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

impl From<TreeError> for RenderError {
    fn from(err: TreeError) -> Self {
        let path = match &err {
            TreeError::UnresolvedReference { path, .. }
            | TreeError::MissingFieldPath { path }
            | TreeError::MalformedOptions { path, .. }
            | TreeError::DuplicateLabel { path }
            | TreeError::Detached { path } => path.clone(),
        };
        Self::Configuration {
            path,
            reason: err.to_string(),
        }
    }
}
